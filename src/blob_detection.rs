//! Blob extraction: contours in a cleaned mask, filtered by area.

use crate::{Error, Result};
use opencv::core::{Mat, Point, Rect, Vector};
use opencv::imgproc;
use opencv::prelude::*;

/// Connected region of cone-colored pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Contour area in pixels²
    pub area: f64,
    /// Bounding box in mask coordinates
    pub bounding_box: Rect,
}

/// Finds cone blobs whose area exceeds a tunable threshold
#[derive(Debug, Clone, Copy)]
pub struct BlobExtractor {
    min_area: f64,
}

impl BlobExtractor {
    /// Create an extractor; blobs must have an area strictly greater than `min_area`
    ///
    /// # Errors
    ///
    /// Returns an error if `min_area` is negative or not finite
    pub fn new(min_area: f64) -> Result<Self> {
        if !min_area.is_finite() || min_area < 0.0 {
            return Err(Error::ConfigError(format!(
                "Minimum blob area must be a non-negative number, got {min_area}"
            )));
        }
        Ok(Self { min_area })
    }

    /// Area threshold in pixels²
    #[must_use]
    pub fn min_area(&self) -> f64 {
        self.min_area
    }

    /// Collect every blob above the area threshold, in no particular order
    ///
    /// # Errors
    ///
    /// Returns an error if the mask is not single-channel 8-bit or contour
    /// extraction fails
    pub fn extract(&self, mask: &Mat) -> Result<Vec<Blob>> {
        if mask.empty() {
            return Ok(Vec::new());
        }
        if mask.channels() != 1 {
            return Err(Error::InvalidInput(format!(
                "Blob extraction needs a single-channel mask, got {} channels",
                mask.channels()
            )));
        }

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            mask,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )?;

        let mut blobs = Vec::new();
        for contour in contours.iter() {
            let area = imgproc::contour_area(&contour, false)?;
            if area > self.min_area {
                blobs.push(Blob {
                    area,
                    bounding_box: imgproc::bounding_rect(&contour)?,
                });
            }
        }
        Ok(blobs)
    }

    /// Whether the mask contains at least one qualifying blob
    ///
    /// # Errors
    ///
    /// Returns an error if contour extraction fails
    pub fn is_present(&self, mask: &Mat) -> Result<bool> {
        Ok(!self.extract(mask)?.is_empty())
    }
}
