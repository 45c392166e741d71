//! Direction calibration over the first frames of a run.
//!
//! While calibrating, the side window is searched for blue cones. Seeing one on
//! any calibration frame means the track turns clockwise. If none is seen the
//! direction stays counter-clockwise; that default is the policy for tracks
//! where the side window never shows blue, not a failure.

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Turning sense of the track, fixed once calibration is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Blue cones seen on the side window during calibration
    Clockwise,
    /// Default when no blue cone is seen
    #[default]
    CounterClockwise,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "clockwise"),
            Self::CounterClockwise => write!(f, "counter-clockwise"),
        }
    }
}

/// Calibration phase for a given frame counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// `frame_counter < sample_size`
    Calibrating,
    /// `frame_counter >= sample_size`; terminal for the run
    Calibrated,
}

/// Decides the track direction from the first `sample_size` frames
#[derive(Debug, Clone)]
pub struct DirectionCalibrator {
    sample_size: u64,
    direction: Direction,
    direction_set: bool,
    finished: bool,
}

impl DirectionCalibrator {
    /// Create a calibrator
    #[must_use]
    pub fn new(sample_size: u64) -> Self {
        Self {
            sample_size,
            direction: Direction::default(),
            direction_set: false,
            finished: false,
        }
    }

    /// Number of the first frame that is no longer a calibration frame
    #[must_use]
    pub fn sample_size(&self) -> u64 {
        self.sample_size
    }

    /// Phase for the given frame counter
    #[must_use]
    pub fn state(&self, frame_counter: u64) -> CalibrationState {
        if frame_counter < self.sample_size {
            CalibrationState::Calibrating
        } else {
            CalibrationState::Calibrated
        }
    }

    /// Whether the given frame belongs to the calibration phase
    #[must_use]
    pub fn is_calibrating(&self, frame_counter: u64) -> bool {
        self.state(frame_counter) == CalibrationState::Calibrating
    }

    /// Current direction; frozen once calibration has ended
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Record whether a blue cone was seen on the side window for this frame.
    ///
    /// Observations for frames at or past `sample_size` are ignored. The
    /// direction changes at most once per run.
    pub fn observe(&mut self, frame_counter: u64, blue_present: bool) -> Direction {
        if !self.is_calibrating(frame_counter) {
            self.finish();
            return self.direction;
        }

        if blue_present && !self.direction_set {
            self.direction = Direction::Clockwise;
            self.direction_set = true;
            info!("Blue cone on side window at frame {frame_counter}: direction set to {}", self.direction);
        }
        self.direction
    }

    /// Mark calibration as over; logs the final direction once
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            info!(
                "Calibration finished after {} frames, direction {}{}",
                self.sample_size.saturating_sub(1),
                self.direction,
                if self.direction_set { "" } else { " (default, no blue cone seen)" }
            );
        }
    }
}
