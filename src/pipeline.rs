//! Per-frame analysis: region selection, segmentation, cleaning, blob
//! extraction, then either direction calibration or steering estimation.
//!
//! The pipeline is synchronous and single-threaded. A failure while analysing
//! one color on one frame degrades to "not detected" and is never retried.

use crate::blob_detection::BlobExtractor;
use crate::calibration::{Direction, DirectionCalibrator};
use crate::config::{ColorConfig, Config, RegionConfig};
use crate::morphology::MaskCleaner;
use crate::region::{self, RegionOfInterest};
use crate::segmentation::{self, ColorRange};
use crate::steering::{DualDetectionPolicy, MarkerObservation, SteeringEstimator};
use crate::Result;
use log::{debug, warn};
use opencv::core::Mat;

/// Phase a frame was processed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Side window searched for blue cones; angle untouched
    Calibrating,
    /// Center window analysed and angle updated
    Steering,
}

/// Cleaned masks kept for the diagnostic window
#[derive(Debug)]
pub struct DiagnosticMasks {
    /// Blue mask of the analysed window
    pub blue: Option<Mat>,
    /// Yellow mask, absent when yellow was not evaluated
    pub yellow: Option<Mat>,
}

/// Outcome of processing one frame
#[derive(Debug)]
pub struct FrameReport {
    /// Counter value of this frame (first frame is 1)
    pub frame_counter: u64,
    /// Phase the frame was processed in
    pub phase: Phase,
    /// Cones seen in the analysed window. During calibration only blue is searched.
    pub observation: MarkerObservation,
    /// Direction after this frame
    pub direction: Direction,
    /// Steering angle after this frame
    pub angle: f64,
    /// Cleaned masks, only when mask retention is enabled
    pub masks: Option<DiagnosticMasks>,
}

/// Result of analysing one color in one window
struct ColorDetection {
    present: bool,
    mask: Option<Mat>,
}

impl ColorDetection {
    const fn absent() -> Self {
        Self {
            present: false,
            mask: None,
        }
    }
}

/// Frame analysis and steering estimation pipeline
pub struct SteeringPipeline {
    regions: RegionConfig,
    colors: ColorConfig,
    dual_detection: DualDetectionPolicy,
    cleaner: MaskCleaner,
    extractor: BlobExtractor,
    calibrator: DirectionCalibrator,
    estimator: SteeringEstimator,
    frame_counter: u64,
    keep_masks: bool,
}

impl SteeringPipeline {
    /// Build a pipeline from a configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            regions: config.regions,
            colors: config.colors,
            dual_detection: config.steering.dual_detection,
            cleaner: MaskCleaner::new(
                config.detection.blur_kernel_size,
                config.detection.structuring_element_size,
            )?,
            extractor: BlobExtractor::new(config.detection.min_blob_area)?,
            calibrator: DirectionCalibrator::new(config.calibration.sample_size),
            estimator: SteeringEstimator::new(config.steering)?,
            frame_counter: 0,
            keep_masks: false,
        })
    }

    /// Keep cleaned masks in each [`FrameReport`] for display
    #[must_use]
    pub fn with_masks(mut self, keep_masks: bool) -> Self {
        self.keep_masks = keep_masks;
        self
    }

    /// Number of frames processed so far
    #[must_use]
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Current direction
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.calibrator.direction()
    }

    /// Current steering angle
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.estimator.angle()
    }

    /// Whether the next frame will still be a calibration frame
    #[must_use]
    pub fn is_calibrating(&self) -> bool {
        self.calibrator.is_calibrating(self.frame_counter + 1)
    }

    /// Process one frame
    ///
    /// # Errors
    ///
    /// Returns an error only if a window cannot be cut out of the frame, which
    /// means the frame does not have the configured size. Analysis failures
    /// inside the window count as "no cone".
    pub fn process(&mut self, frame: &Mat) -> Result<FrameReport> {
        self.frame_counter += 1;

        if self.calibrator.is_calibrating(self.frame_counter) {
            self.calibrate(frame)
        } else {
            self.calibrator.finish();
            self.steer(frame)
        }
    }

    fn calibrate(&mut self, frame: &Mat) -> Result<FrameReport> {
        let side = self.regions.side;
        let blue = match self.window_hsv(frame, &side)? {
            Some(hsv) => self.detect(&hsv, &self.colors.blue, "blue"),
            None => ColorDetection::absent(),
        };
        let direction = self.calibrator.observe(self.frame_counter, blue.present);

        debug!(
            "Frame {}: calibrating, blue on side window: {}",
            self.frame_counter, blue.present
        );

        Ok(FrameReport {
            frame_counter: self.frame_counter,
            phase: Phase::Calibrating,
            observation: MarkerObservation::from_flags(blue.present, false),
            direction,
            angle: self.estimator.angle(),
            masks: self.keep_masks.then(|| DiagnosticMasks {
                blue: blue.mask,
                yellow: None,
            }),
        })
    }

    fn steer(&mut self, frame: &Mat) -> Result<FrameReport> {
        let center = self.regions.center;
        let hsv = self.window_hsv(frame, &center)?;

        let blue = match &hsv {
            Some(hsv) => self.detect(hsv, &self.colors.blue, "blue"),
            None => ColorDetection::absent(),
        };
        let yellow = match &hsv {
            Some(hsv) if !blue.present || self.dual_detection.evaluates_yellow_with_blue() => {
                self.detect(hsv, &self.colors.yellow, "yellow")
            }
            _ => ColorDetection::absent(),
        };

        let observation = MarkerObservation::from_flags(blue.present, yellow.present);
        let direction = self.calibrator.direction();
        let angle = self.estimator.update(observation, direction);

        debug!(
            "Frame {}: {:?} with direction {} -> angle {:.4}",
            self.frame_counter, observation, direction, angle
        );

        Ok(FrameReport {
            frame_counter: self.frame_counter,
            phase: Phase::Steering,
            observation,
            direction,
            angle,
            masks: self.keep_masks.then(|| DiagnosticMasks {
                blue: blue.mask,
                yellow: yellow.mask,
            }),
        })
    }

    /// Window in HSV; `None` if the conversion failed
    fn window_hsv(&self, frame: &Mat, roi: &RegionOfInterest) -> Result<Option<Mat>> {
        let window = region::select(frame, roi)?;
        match segmentation::to_hsv(&window) {
            Ok(hsv) => Ok(Some(hsv)),
            Err(e) => {
                warn!("Frame {}: HSV conversion failed, treating as no cone: {}", self.frame_counter, e);
                Ok(None)
            }
        }
    }

    fn detect(&self, hsv: &Mat, range: &ColorRange, name: &str) -> ColorDetection {
        let result = segmentation::segment(hsv, range)
            .and_then(|mask| self.cleaner.clean(&mask))
            .and_then(|cleaned| {
                let present = self.extractor.is_present(&cleaned)?;
                Ok((present, cleaned))
            });

        match result {
            Ok((present, cleaned)) => ColorDetection {
                present,
                mask: self.keep_masks.then_some(cleaned),
            },
            Err(e) => {
                warn!(
                    "Frame {}: {} analysis failed, treating as no cone: {}",
                    self.frame_counter, name, e
                );
                ColorDetection::absent()
            }
        }
    }
}
