//! Configuration management for the cone steering pipeline
//!
//! All values are fixed at startup; nothing is reconfigured while running.

use crate::constants::{
    DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_CALIBRATION_SAMPLE_SIZE, DEFAULT_CENTER_ROI, DEFAULT_FRAME_HEIGHT,
    DEFAULT_FRAME_WIDTH, DEFAULT_LABEL, DEFAULT_MIN_BLOB_AREA, DEFAULT_SIDE_ROI, DEFAULT_STRUCTURING_ELEMENT_SIZE,
};
use crate::region::RegionOfInterest;
use crate::segmentation::ColorRange;
use crate::steering::SteeringParams;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Expected frame geometry
    pub frame: FrameConfig,

    /// Side and center windows
    pub regions: RegionConfig,

    /// Cone color thresholds
    pub colors: ColorConfig,

    /// Mask cleaning and blob filtering
    pub detection: DetectionConfig,

    /// Direction calibration
    pub calibration: CalibrationConfig,

    /// Steering increment, bounds and dual-detection policy
    pub steering: SteeringParams,

    /// Diagnostic output
    pub display: DisplayConfig,
}

/// Frame geometry delivered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

/// Regions of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Window searched for blue cones during calibration
    pub side: RegionOfInterest,

    /// Window used for steering once calibrated
    pub center: RegionOfInterest,
}

/// Per-color HSV thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Blue (left) cones
    pub blue: ColorRange,

    /// Yellow (right) cones
    pub yellow: ColorRange,
}

/// Mask cleaning and blob filtering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// A blob counts as a cone if its contour area is strictly greater than this
    pub min_blob_area: f64,

    /// Gaussian blur kernel size (odd)
    pub blur_kernel_size: i32,

    /// Side length of the rectangular structuring element
    pub structuring_element_size: i32,
}

/// Direction calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Frame counter value at which calibration ends
    pub sample_size: u64,
}

/// Diagnostic output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the annotated frame
    pub enabled: bool,

    /// Also show the cleaned masks
    pub verbose: bool,

    /// Label written into log lines and the overlay
    pub label: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            side: RegionOfInterest::from_tuple(DEFAULT_SIDE_ROI),
            center: RegionOfInterest::from_tuple(DEFAULT_CENTER_ROI),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            blue: ColorRange::blue(),
            yellow: ColorRange::yellow(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_blob_area: DEFAULT_MIN_BLOB_AREA,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            structuring_element_size: DEFAULT_STRUCTURING_ELEMENT_SIZE,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_CALIBRATION_SAMPLE_SIZE,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration; any error here must stop the run before the first frame
    pub fn validate(&self) -> Result<()> {
        // Validate frame geometry
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(Error::ConfigError(format!(
                "Frame size must be non-zero, got {}x{}",
                self.frame.width, self.frame.height
            )));
        }

        // Validate regions
        for (name, roi) in [("side", &self.regions.side), ("center", &self.regions.center)] {
            if !roi.fits_within(self.frame.width, self.frame.height) {
                return Err(Error::ConfigError(format!(
                    "The {} region {:?} does not fit inside a {}x{} frame",
                    name, roi, self.frame.width, self.frame.height
                )));
            }
        }

        // Validate thresholds
        self.colors.blue.validate("blue")?;
        self.colors.yellow.validate("yellow")?;

        // Validate detection parameters
        if !self.detection.min_blob_area.is_finite() || self.detection.min_blob_area < 0.0 {
            return Err(Error::ConfigError(
                "Minimum blob area must be a non-negative number".to_string(),
            ));
        }
        if self.detection.blur_kernel_size <= 0 || self.detection.blur_kernel_size % 2 == 0 {
            return Err(Error::ConfigError(
                "Blur kernel size must be odd and greater than 0".to_string(),
            ));
        }
        if self.detection.structuring_element_size <= 0 {
            return Err(Error::ConfigError(
                "Structuring element size must be greater than 0".to_string(),
            ));
        }

        // Validate calibration
        if self.calibration.sample_size == 0 {
            return Err(Error::ConfigError(
                "Calibration sample size must be greater than 0".to_string(),
            ));
        }

        // Validate steering
        self.steering.validate()?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Cone Steering Configuration

# Frame geometry delivered by the camera
frame:
  width: 640
  height: 480

# Regions of interest (pixels)
regions:
  side:
    x: 410
    y: 255
    width: 230
    height: 100
  center:
    x: 170
    y: 255
    width: 300
    height: 100

# HSV thresholds (hue 0-180, saturation and value 0-255)
colors:
  blue:
    hue_min: 36
    hue_max: 147
    sat_min: 85
    sat_max: 202
    val_min: 46
    val_max: 222
  yellow:
    hue_min: 0
    hue_max: 46
    sat_min: 101
    sat_max: 221
    val_min: 177
    val_max: 255

# Mask cleaning and blob filtering
detection:
  min_blob_area: 100.0
  blur_kernel_size: 5
  structuring_element_size: 3

# Direction calibration
calibration:
  sample_size: 5

# Steering
steering:
  step: 0.025
  min: -0.3
  max: 0.3
  dual_detection: prefer_blue

# Diagnostic output
display:
  enabled: true
  verbose: false
  label: "cone-steering"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = Config::from_yaml("calibration:\n  sample_size: 8\n").unwrap();
        assert_eq!(parsed.calibration.sample_size, 8);
        assert_eq!(parsed.steering, SteeringParams::default());
    }

    #[test]
    fn test_region_outside_frame_is_rejected() {
        let mut config = Config::default();
        config.frame.width = 600;
        assert!(matches!(config.validate(), Err(Error::ConfigError(msg)) if msg.contains("side")));
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        assert!(matches!(Config::from_yaml("frame: [1, 2"), Err(Error::ConfigError(_))));
    }
}
