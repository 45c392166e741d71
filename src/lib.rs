//! Vision-based steering for a small autonomous vehicle on a cone-marked track.
//!
//! The track is bounded by blue cones on one side and yellow cones on the
//! other. The library:
//! - Calibrates the driving direction from the first frames by looking for
//!   blue markers in a side window of the image
//! - Segments each frame in HSV space and cleans the masks with morphology
//! - Nudges a bounded steering angle away from whichever cone color appears
//!   in the center window
//!
//! The per-frame pipeline consists of:
//! 1. Region selection (side window while calibrating, center window afterwards)
//! 2. Color segmentation against the blue and yellow HSV ranges
//! 3. Mask cleaning (blur, dilate, erode, erode, dilate)
//! 4. Blob extraction with a minimum area
//! 5. Direction calibration or steering update
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use cone_steering::{config::Config, pipeline::SteeringPipeline};
//! use opencv::{imgcodecs, prelude::*};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut pipeline = SteeringPipeline::new(&config)?;
//!
//! for path in ["frame0.png", "frame1.png", "frame2.png"] {
//!     let frame = imgcodecs::imread(path, imgcodecs::IMREAD_COLOR)?;
//!     let report = pipeline.process(&frame)?;
//!     println!("{:?}: direction {}, angle {:+.3}", report.phase, report.direction, report.angle);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the estimator directly
//!
//! ```
//! use cone_steering::calibration::Direction;
//! use cone_steering::steering::{MarkerObservation, SteeringEstimator, SteeringParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut estimator = SteeringEstimator::new(SteeringParams::default())?;
//!
//! let angle = estimator.update(MarkerObservation::Blue, Direction::Clockwise);
//! assert!((angle + 0.025).abs() < 1e-12);
//!
//! let angle = estimator.update(MarkerObservation::Yellow, Direction::Clockwise);
//! assert!(angle.abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod blob_detection;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame_source;
pub mod morphology;
pub mod pipeline;
pub mod region;
pub mod segmentation;
pub mod steering;
pub mod utils;
pub mod vehicle_bus;

pub use error::{Error, Result};
