//! Color segmentation of a region into per-class binary masks.
//!
//! Regions are converted to HSV once and then thresholded separately for each
//! cone color. Masks of different colors are never combined.

use crate::constants::{
    DEFAULT_BLUE_HUE, DEFAULT_BLUE_SATURATION, DEFAULT_BLUE_VALUE, DEFAULT_YELLOW_HUE, DEFAULT_YELLOW_SATURATION,
    DEFAULT_YELLOW_VALUE, HSV_HUE_MAX,
};
use crate::{Error, Result};
use opencv::core::{self, Mat, Scalar};
use opencv::imgproc;
use opencv::prelude::*;
use serde::{Deserialize, Serialize};

/// Inclusive HSV bounds identifying one cone color.
///
/// Hue uses the 8-bit `OpenCV` scale (0..=180).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    /// Minimum hue
    pub hue_min: u8,
    /// Maximum hue
    pub hue_max: u8,
    /// Minimum saturation
    pub sat_min: u8,
    /// Maximum saturation
    pub sat_max: u8,
    /// Minimum value
    pub val_min: u8,
    /// Maximum value
    pub val_max: u8,
}

impl ColorRange {
    /// Build a range from `(min, max)` pairs for hue, saturation and value
    #[must_use]
    pub const fn new(hue: (u8, u8), saturation: (u8, u8), value: (u8, u8)) -> Self {
        Self {
            hue_min: hue.0,
            hue_max: hue.1,
            sat_min: saturation.0,
            sat_max: saturation.1,
            val_min: value.0,
            val_max: value.1,
        }
    }

    /// Default range for blue (left) cones
    #[must_use]
    pub const fn blue() -> Self {
        Self::new(DEFAULT_BLUE_HUE, DEFAULT_BLUE_SATURATION, DEFAULT_BLUE_VALUE)
    }

    /// Default range for yellow (right) cones
    #[must_use]
    pub const fn yellow() -> Self {
        Self::new(DEFAULT_YELLOW_HUE, DEFAULT_YELLOW_SATURATION, DEFAULT_YELLOW_VALUE)
    }

    /// Whether an HSV triple falls inside all three bounds
    #[must_use]
    pub fn contains(&self, hue: u8, saturation: u8, value: u8) -> bool {
        (self.hue_min..=self.hue_max).contains(&hue)
            && (self.sat_min..=self.sat_max).contains(&saturation)
            && (self.val_min..=self.val_max).contains(&value)
    }

    /// Lower bound as an `OpenCV` scalar
    #[must_use]
    pub fn lower(&self) -> Scalar {
        Scalar::new(
            f64::from(self.hue_min),
            f64::from(self.sat_min),
            f64::from(self.val_min),
            0.0,
        )
    }

    /// Upper bound as an `OpenCV` scalar
    #[must_use]
    pub fn upper(&self) -> Scalar {
        Scalar::new(
            f64::from(self.hue_max),
            f64::from(self.sat_max),
            f64::from(self.val_max),
            0.0,
        )
    }

    /// Validate the bounds
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if a minimum exceeds its maximum or the hue
    /// bound lies outside the 8-bit HSV hue scale
    pub fn validate(&self, name: &str) -> Result<()> {
        let pairs = [
            ("hue", self.hue_min, self.hue_max),
            ("saturation", self.sat_min, self.sat_max),
            ("value", self.val_min, self.val_max),
        ];
        for (channel, min, max) in pairs {
            if min > max {
                return Err(Error::ConfigError(format!(
                    "{name} {channel} range is inverted: min {min} > max {max}"
                )));
            }
        }
        if self.hue_max > HSV_HUE_MAX {
            return Err(Error::ConfigError(format!(
                "{name} hue maximum {} exceeds {HSV_HUE_MAX}",
                self.hue_max
            )));
        }
        Ok(())
    }
}

/// Convert a BGR or BGRA region to HSV
///
/// # Errors
///
/// Returns an error if the region is empty, has an unsupported channel count,
/// or the color conversion fails
pub fn to_hsv(region: &Mat) -> Result<Mat> {
    if region.empty() {
        return Err(Error::InvalidInput("Cannot convert an empty region to HSV".to_string()));
    }

    let mut hsv = Mat::default();
    match region.channels() {
        4 => {
            let mut bgr = Mat::default();
            imgproc::cvt_color(region, &mut bgr, imgproc::COLOR_BGRA2BGR, 0)?;
            imgproc::cvt_color(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?;
        }
        3 => imgproc::cvt_color(region, &mut hsv, imgproc::COLOR_BGR2HSV, 0)?,
        channels => {
            return Err(Error::InvalidInput(format!(
                "Unsupported channel count for HSV conversion: {channels}"
            )))
        }
    }
    Ok(hsv)
}

/// Threshold an HSV image into a single-channel mask (255 = cone color)
///
/// # Errors
///
/// Returns an error if `OpenCV` rejects the input
pub fn segment(hsv: &Mat, range: &ColorRange) -> Result<Mat> {
    let mut mask = Mat::default();
    core::in_range(hsv, &range.lower(), &range.upper(), &mut mask)?;
    Ok(mask)
}
