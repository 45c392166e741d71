//! Steering estimation from per-frame cone presence.
//!
//! This is an incremental nudge controller: every frame with a cone in the
//! center window moves the angle by a fixed step, every frame without one
//! resets it to straight ahead. Cone position inside the window is not used.

use crate::calibration::Direction;
use crate::constants::{DEFAULT_STEERING_MAX, DEFAULT_STEERING_MIN, DEFAULT_STEERING_STEP};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Cones detected in the center window on one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerObservation {
    /// Neither color
    None,
    /// Blue only, or blue with yellow left unevaluated
    Blue,
    /// Yellow with blue absent
    Yellow,
    /// Both colors; only produced under [`DualDetectionPolicy::Average`]
    Both,
}

impl MarkerObservation {
    /// Combine per-color presence flags
    #[must_use]
    pub fn from_flags(blue: bool, yellow: bool) -> Self {
        match (blue, yellow) {
            (false, false) => Self::None,
            (true, false) => Self::Blue,
            (false, true) => Self::Yellow,
            (true, true) => Self::Both,
        }
    }

    /// Whether any cone was seen
    #[must_use]
    pub fn any(&self) -> bool {
        *self != Self::None
    }
}

/// What to do when blue and yellow cones share the center window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualDetectionPolicy {
    /// Yellow is only evaluated when blue is absent
    #[default]
    PreferBlue,
    /// Both colors are evaluated and their adjustments averaged
    Average,
}

impl DualDetectionPolicy {
    /// Whether yellow has to be segmented on a frame where blue was found
    #[must_use]
    pub fn evaluates_yellow_with_blue(&self) -> bool {
        matches!(self, Self::Average)
    }
}

/// Fixed increment and bounds of the steering angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Per-frame increment
    pub step: f64,
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
    /// Handling of frames with both cone colors
    pub dual_detection: DualDetectionPolicy,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEERING_STEP,
            min: DEFAULT_STEERING_MIN,
            max: DEFAULT_STEERING_MAX,
            dual_detection: DualDetectionPolicy::default(),
        }
    }
}

impl SteeringParams {
    /// Validate the parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the step is not positive, the bounds are
    /// not finite, or zero (straight ahead) lies outside the bounds
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Steering step must be positive, got {}",
                self.step
            )));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(Error::ConfigError(format!(
                "Steering bounds must satisfy min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > 0.0 || self.max < 0.0 {
            return Err(Error::ConfigError(format!(
                "Steering bounds [{}, {}] must contain 0.0",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Whether an angle lies inside the bounds
    #[must_use]
    pub fn in_bounds(&self, angle: f64) -> bool {
        (self.min..=self.max).contains(&angle)
    }
}

/// Stateful steering angle estimator
#[derive(Debug, Clone)]
pub struct SteeringEstimator {
    params: SteeringParams,
    angle: f64,
}

impl SteeringEstimator {
    /// Create an estimator starting straight ahead
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid
    pub fn new(params: SteeringParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, angle: 0.0 })
    }

    /// Current angle
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Parameters in use
    #[must_use]
    pub fn params(&self) -> &SteeringParams {
        &self.params
    }

    /// Overwrite the carried angle; the next update resets it if out of bounds
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    /// Apply one frame's observation and return the new angle.
    ///
    /// Rules, first match wins:
    /// 1. no cone: reset to 0.0
    /// 2. carried angle outside the bounds (or NaN): reset to 0.0
    /// 3. blue: `-step` when clockwise, `+step` otherwise
    /// 4. yellow: the mirror image of rule 3
    ///
    /// The nudged angle is clamped to the bounds.
    pub fn update(&mut self, observation: MarkerObservation, direction: Direction) -> f64 {
        self.angle = if !observation.any() || !self.params.in_bounds(self.angle) {
            0.0
        } else {
            let nudged = self.angle + self.adjustment(observation, direction);
            nudged.clamp(self.params.min, self.params.max)
        };
        self.angle
    }

    fn adjustment(&self, observation: MarkerObservation, direction: Direction) -> f64 {
        let blue = match direction {
            Direction::Clockwise => -self.params.step,
            Direction::CounterClockwise => self.params.step,
        };
        let yellow = -blue;
        match observation {
            MarkerObservation::None => 0.0,
            MarkerObservation::Blue => blue,
            MarkerObservation::Yellow => yellow,
            MarkerObservation::Both => match self.params.dual_detection {
                DualDetectionPolicy::PreferBlue => blue,
                DualDetectionPolicy::Average => (blue + yellow) / 2.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EPSILON;

    fn estimator() -> SteeringEstimator {
        SteeringEstimator::new(SteeringParams::default()).unwrap()
    }

    #[test]
    fn test_starts_straight() {
        assert_eq!(estimator().angle(), 0.0);
    }

    #[test]
    fn test_blue_clockwise_subtracts_step() {
        let mut estimator = estimator();
        estimator.set_angle(0.1);
        let angle = estimator.update(MarkerObservation::Blue, Direction::Clockwise);
        assert!((angle - 0.075).abs() < EPSILON);
    }

    #[test]
    fn test_blue_counter_clockwise_adds_step() {
        let mut estimator = estimator();
        let angle = estimator.update(MarkerObservation::Blue, Direction::CounterClockwise);
        assert!((angle - 0.025).abs() < EPSILON);
    }

    #[test]
    fn test_yellow_mirrors_blue() {
        let mut estimator = estimator();
        estimator.set_angle(0.1);
        assert!((estimator.update(MarkerObservation::Yellow, Direction::Clockwise) - 0.125).abs() < EPSILON);

        estimator.set_angle(0.1);
        assert!((estimator.update(MarkerObservation::Yellow, Direction::CounterClockwise) - 0.075).abs() < EPSILON);
    }

    #[test]
    fn test_no_marker_resets() {
        let mut estimator = estimator();
        estimator.set_angle(0.2);
        assert_eq!(estimator.update(MarkerObservation::None, Direction::Clockwise), 0.0);
    }

    #[test]
    fn test_out_of_range_resets() {
        let mut estimator = estimator();
        estimator.set_angle(0.5);
        assert_eq!(estimator.update(MarkerObservation::Blue, Direction::Clockwise), 0.0);

        estimator.set_angle(f64::NAN);
        assert_eq!(estimator.update(MarkerObservation::Yellow, Direction::Clockwise), 0.0);
    }

    #[test]
    fn test_nudge_saturates_at_bounds() {
        let mut estimator = estimator();
        for _ in 0..100 {
            estimator.update(MarkerObservation::Blue, Direction::CounterClockwise);
        }
        assert!((estimator.angle() - DEFAULT_STEERING_MAX).abs() < EPSILON);

        for _ in 0..100 {
            estimator.update(MarkerObservation::Blue, Direction::Clockwise);
        }
        assert!((estimator.angle() - DEFAULT_STEERING_MIN).abs() < EPSILON);
    }

    #[test]
    fn test_both_colors_by_policy() {
        let mut prefer_blue = estimator();
        prefer_blue.set_angle(0.1);
        let angle = prefer_blue.update(MarkerObservation::Both, Direction::Clockwise);
        assert!((angle - 0.075).abs() < EPSILON);

        let mut average = SteeringEstimator::new(SteeringParams {
            dual_detection: DualDetectionPolicy::Average,
            ..SteeringParams::default()
        })
        .unwrap();
        average.set_angle(0.1);
        let angle = average.update(MarkerObservation::Both, Direction::Clockwise);
        assert!((angle - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_params() {
        let bad = |step, min, max| SteeringParams {
            step,
            min,
            max,
            dual_detection: DualDetectionPolicy::PreferBlue,
        };
        assert!(SteeringEstimator::new(bad(0.0, -0.3, 0.3)).is_err());
        assert!(SteeringEstimator::new(bad(0.025, 0.3, -0.3)).is_err());
        assert!(SteeringEstimator::new(bad(0.025, 0.1, 0.3)).is_err());
        assert!(SteeringEstimator::new(bad(0.025, f64::NEG_INFINITY, 0.3)).is_err());
        assert!(SteeringEstimator::new(bad(0.025, -0.29, 0.29)).is_ok());
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(MarkerObservation::from_flags(false, false), MarkerObservation::None);
        assert_eq!(MarkerObservation::from_flags(true, false), MarkerObservation::Blue);
        assert_eq!(MarkerObservation::from_flags(false, true), MarkerObservation::Yellow);
        assert_eq!(MarkerObservation::from_flags(true, true), MarkerObservation::Both);
    }
}
