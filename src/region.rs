//! Region selection: cropping the fixed side and center windows out of a frame.

use crate::{Error, Result};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl RegionOfInterest {
    /// Create a new region
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a region from an `(x, y, width, height)` tuple
    #[must_use]
    pub const fn from_tuple(rect: (u32, u32, u32, u32)) -> Self {
        Self::new(rect.0, rect.1, rect.2, rect.3)
    }

    /// Number of pixels covered by the region
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the region is non-empty and lies fully inside a `width` x `height` frame
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    /// Convert to an `OpenCV` rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate does not fit in `i32`
    pub fn to_rect(&self) -> Result<Rect> {
        use crate::utils::safe_cast::u32_to_i32;

        Ok(Rect::new(
            u32_to_i32(self.x)?,
            u32_to_i32(self.y)?,
            u32_to_i32(self.width)?,
            u32_to_i32(self.height)?,
        ))
    }
}

/// Copy the part of `frame` covered by `roi` into its own matrix.
///
/// The source frame is left untouched.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the frame is empty or smaller than the region.
/// Configuration validation rules this out for frames of the configured size, so
/// hitting it means the transport delivered a frame of the wrong size.
pub fn select(frame: &Mat, roi: &RegionOfInterest) -> Result<Mat> {
    let (cols, rows) = (frame.cols(), frame.rows());
    if cols <= 0 || rows <= 0 {
        return Err(Error::InvalidInput("Cannot select a region of an empty frame".to_string()));
    }

    #[allow(clippy::cast_sign_loss)] // Checked positive above
    let (width, height) = (cols as u32, rows as u32);
    if !roi.fits_within(width, height) {
        return Err(Error::InvalidInput(format!(
            "Region {roi:?} does not fit inside a {width}x{height} frame"
        )));
    }

    let view = Mat::roi(frame, roi.to_rect()?)?;
    Ok(view.try_clone()?)
}
