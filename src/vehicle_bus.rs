//! Vehicle bus: session liveness and the externally computed reference angle.
//!
//! The reference angle is observational only. It is written by a bus thread
//! and read by the processing loop for logging; it never reaches the
//! steering estimator.

use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Latest reference steering value received from the bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSteering {
    /// Steering angle computed by the vehicle
    pub angle: f64,
    /// When the value was received
    pub received_at: Instant,
}

/// Single-writer, multi-reader cell holding the latest reference value
#[derive(Debug, Clone, Default)]
pub struct ReferenceCell {
    inner: Arc<RwLock<Option<ReferenceSteering>>>,
}

impl ReferenceCell {
    /// Create an empty cell
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored value
    pub fn publish(&self, angle: f64) {
        let sample = ReferenceSteering {
            angle,
            received_at: Instant::now(),
        };
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(sample),
            Err(poisoned) => *poisoned.into_inner() = Some(sample),
        }
    }

    /// Snapshot of the latest value
    #[must_use]
    pub fn latest(&self) -> Option<ReferenceSteering> {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn!("Reference steering lock poisoned, using last written value");
                *poisoned.into_inner()
            }
        }
    }
}

/// Control-session collaborator consulted between frames
pub trait VehicleBus {
    /// Whether the control session is still active; the loop stops when this is false
    fn is_running(&self) -> bool;

    /// Latest reference steering value, if any has been received
    fn reference_steering(&self) -> Option<ReferenceSteering>;
}

/// In-process bus; other threads drive it through [`BusHandle`]s
#[derive(Debug, Clone)]
pub struct LocalBus {
    running: Arc<AtomicBool>,
    reference: ReferenceCell,
}

/// Cloneable handle for publishing reference values and ending the session
#[derive(Debug, Clone)]
pub struct BusHandle {
    running: Arc<AtomicBool>,
    reference: ReferenceCell,
}

impl LocalBus {
    /// Create a running session without a reference value
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            reference: ReferenceCell::new(),
        }
    }

    /// Handle for another thread
    #[must_use]
    pub fn handle(&self) -> BusHandle {
        BusHandle {
            running: Arc::clone(&self.running),
            reference: self.reference.clone(),
        }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleBus for LocalBus {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn reference_steering(&self) -> Option<ReferenceSteering> {
        self.reference.latest()
    }
}

impl BusHandle {
    /// Publish a new reference steering angle
    pub fn publish_reference(&self, angle: f64) {
        self.reference.publish(angle);
    }

    /// End the session; the loop stops before its next frame
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Whether the session is still active
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_reference_cell_latest_wins() {
        let cell = ReferenceCell::new();
        assert!(cell.latest().is_none());

        cell.publish(0.1);
        cell.publish(-0.2);
        assert_eq!(cell.latest().map(|r| r.angle), Some(-0.2));
    }

    #[test]
    fn test_unattached_bus_runs_without_reference() {
        let bus = LocalBus::default();
        for _ in 0..10 {
            assert!(bus.is_running());
            assert!(bus.reference_steering().is_none());
        }
    }

    #[test]
    fn test_handle_stops_bus() {
        let bus = LocalBus::new();
        let handle = bus.handle();
        assert!(bus.is_running());

        handle.stop();
        assert!(!bus.is_running());
        assert!(!handle.is_running());
    }

    #[test]
    fn test_publish_from_other_thread() {
        let bus = LocalBus::new();
        let handle = bus.handle();

        thread::spawn(move || {
            for i in 0..100 {
                handle.publish_reference(f64::from(i) * 0.001);
            }
        })
        .join()
        .unwrap();

        let latest = bus.reference_steering().unwrap();
        assert!((latest.angle - 0.099).abs() < 1e-12);
    }
}
