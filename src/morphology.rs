//! Mask cleaning: blur followed by a dilate, erode, erode, dilate sequence.
//!
//! The blurred mask is thresholded back to 0/255, so every stage works on a
//! binary mask. The first dilate/erode pair fills small holes inside cone
//! regions, the trailing erode/dilate pair removes small speckles and thin
//! streaks. The order is fixed.

use crate::{Error, Result};
use opencv::core::{self, Mat, Point, Size};
use opencv::imgproc;
use opencv::prelude::*;

/// Blurred values above this become foreground again
const BINARY_THRESHOLD: f64 = 127.0;

/// One stage of the cleaning sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStep {
    /// Gaussian blur with the cleaner's kernel size, re-binarized
    Blur,
    /// Dilation with the structuring element
    Dilate,
    /// Erosion with the structuring element
    Erode,
}

/// The sequence applied to every mask
pub const CLEANING_SEQUENCE: [CleaningStep; 5] = [
    CleaningStep::Blur,
    CleaningStep::Dilate,
    CleaningStep::Erode,
    CleaningStep::Erode,
    CleaningStep::Dilate,
];

/// Removes sensor noise from binary masks
pub struct MaskCleaner {
    blur_size: Size,
    kernel: Mat,
}

impl MaskCleaner {
    /// Create a cleaner with a square blur kernel and a rectangular structuring element
    ///
    /// # Errors
    ///
    /// Returns an error if the blur kernel size is not a positive odd number,
    /// the structuring element size is not positive, or `OpenCV` fails to build
    /// the element
    pub fn new(blur_kernel_size: i32, structuring_element_size: i32) -> Result<Self> {
        if blur_kernel_size <= 0 || blur_kernel_size % 2 == 0 {
            return Err(Error::ConfigError(format!(
                "Blur kernel size must be odd and positive, got {blur_kernel_size}"
            )));
        }
        if structuring_element_size <= 0 {
            return Err(Error::ConfigError(format!(
                "Structuring element size must be positive, got {structuring_element_size}"
            )));
        }

        let kernel = imgproc::get_structuring_element(
            imgproc::MORPH_RECT,
            Size::new(structuring_element_size, structuring_element_size),
            Point::new(-1, -1),
        )?;

        Ok(Self {
            blur_size: Size::new(blur_kernel_size, blur_kernel_size),
            kernel,
        })
    }

    /// Run the fixed cleaning sequence on a mask
    ///
    /// # Errors
    ///
    /// Returns an error if any `OpenCV` operation fails
    pub fn clean(&self, mask: &Mat) -> Result<Mat> {
        self.clean_with(mask, &CLEANING_SEQUENCE)
    }

    /// Run an arbitrary sequence of steps; `clean` is this with [`CLEANING_SEQUENCE`]
    ///
    /// # Errors
    ///
    /// Returns an error if any `OpenCV` operation fails
    pub fn clean_with(&self, mask: &Mat, steps: &[CleaningStep]) -> Result<Mat> {
        let mut current = mask.try_clone()?;
        for step in steps {
            current = self.apply(&current, *step)?;
        }
        Ok(current)
    }

    fn apply(&self, src: &Mat, step: CleaningStep) -> Result<Mat> {
        let mut dst = Mat::default();
        match step {
            CleaningStep::Blur => {
                let mut blurred = Mat::default();
                imgproc::gaussian_blur(src, &mut blurred, self.blur_size, 0.0, 0.0, core::BORDER_DEFAULT)?;
                imgproc::threshold(&blurred, &mut dst, BINARY_THRESHOLD, 255.0, imgproc::THRESH_BINARY)?;
            }
            CleaningStep::Dilate => {
                imgproc::dilate(
                    src,
                    &mut dst,
                    &self.kernel,
                    Point::new(-1, -1),
                    1,
                    core::BORDER_CONSTANT,
                    imgproc::morphology_default_border_value()?,
                )?;
            }
            CleaningStep::Erode => {
                imgproc::erode(
                    src,
                    &mut dst,
                    &self.kernel,
                    Point::new(-1, -1),
                    1,
                    core::BORDER_CONSTANT,
                    imgproc::morphology_default_border_value()?,
                )?;
            }
        }
        Ok(dst)
    }
}
