//! One controllable joint axis.
//!
//! `Axis` pairs the lifecycle state machine with a backend. This is the
//! single authority on transition legality: every lifecycle operation
//! elsewhere in the crate delegates here and trusts the returned verdict.
//! An illegal request returns `false`, leaves the state unchanged, and
//! causes no backend side effect.

use crate::backend::AxisBackend;
use nvc_common::state::AxisState;
use std::fmt;
use std::time::Duration;

/// A single axis: lifecycle state plus its sensor/actuator backend.
///
/// The state machine is linear, `Locked ⇄ Stopped ⇄ Driven`, with no
/// shortcut transitions.
pub struct Axis {
    index: usize,
    state: AxisState,
    backend: Box<dyn AxisBackend>,
}

impl Axis {
    /// Wrap a backend. Axes start Locked: brake engaged, drive disabled
    /// (the factory puts the backend into that state before wrapping).
    pub fn new(index: usize, backend: Box<dyn AxisBackend>) -> Self {
        Self {
            index,
            state: AxisState::Locked,
            backend,
        }
    }

    /// Index of this axis within the controller's set.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> AxisState {
        self.state
    }

    /// Advance backend-internal state by one tick.
    #[inline]
    pub fn tick(&mut self, dt: Duration) {
        self.backend.tick(dt);
    }

    /// Read the scaled joint position [rad].
    #[inline]
    pub fn position(&mut self) -> f64 {
        self.backend.read_position()
    }

    /// Forward a commanded velocity [rad/s].
    ///
    /// Legal while Driven (pass-through) or Stopped (enables the drive
    /// output and transitions to Driven; this is how an axis starts).
    pub fn drive(&mut self, velocity: f64) -> bool {
        match self.state {
            AxisState::Driven => {
                self.backend.apply_drive(velocity);
                true
            }
            AxisState::Stopped => {
                self.backend.set_drive_enabled(true);
                self.backend.apply_drive(velocity);
                self.state = AxisState::Driven;
                true
            }
            AxisState::Locked => false,
        }
    }

    /// Zero the command and disable the drive output. Driven → Stopped.
    pub fn stop(&mut self) -> bool {
        if self.state != AxisState::Driven {
            return false;
        }
        self.backend.apply_drive(0.0);
        self.backend.set_drive_enabled(false);
        self.state = AxisState::Stopped;
        true
    }

    /// Engage the brake. Stopped → Locked.
    pub fn lock(&mut self) -> bool {
        if self.state != AxisState::Stopped {
            return false;
        }
        self.backend.set_brake(true);
        self.state = AxisState::Locked;
        true
    }

    /// Release the brake. Locked → Stopped.
    pub fn unlock(&mut self) -> bool {
        if self.state != AxisState::Locked {
            return false;
        }
        self.backend.set_brake(false);
        self.state = AxisState::Stopped;
        true
    }

    /// Returns true if the axis is driven.
    #[inline]
    pub fn is_driven(&self) -> bool {
        self.state.is_driven()
    }

    /// Returns true if the axis is stopped.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    /// Returns true if the axis is locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Accumulate an adjustment onto the persistent drive offset.
    #[inline]
    pub fn add_drive_offset(&mut self, offset: f64) {
        self.backend.add_drive_offset(offset);
    }

    /// Current persistent drive offset [rad/s].
    #[inline]
    pub fn drive_offset(&self) -> f64 {
        self.backend.drive_offset()
    }
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("index", &self.index)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every backend call so tests can assert side effects, and
    /// their absence on rejected transitions.
    #[derive(Debug, Clone, Default)]
    struct Probe {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Probe {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }

        fn push(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    struct ProbeBackend {
        probe: Probe,
    }

    impl AxisBackend for ProbeBackend {
        fn read_position(&mut self) -> f64 {
            0.0
        }
        fn apply_drive(&mut self, velocity: f64) {
            self.probe.push(format!("drive({velocity})"));
        }
        fn set_drive_enabled(&mut self, enabled: bool) {
            self.probe.push(format!("enable({enabled})"));
        }
        fn set_brake(&mut self, engaged: bool) {
            self.probe.push(format!("brake({engaged})"));
        }
    }

    fn probed_axis() -> (Axis, Probe) {
        let probe = Probe::default();
        let backend = ProbeBackend {
            probe: probe.clone(),
        };
        (Axis::new(0, Box::new(backend)), probe)
    }

    #[test]
    fn initial_state_is_locked() {
        let (axis, _probe) = probed_axis();
        assert!(axis.is_locked());
        assert!(!axis.is_stopped());
        assert!(!axis.is_driven());
    }

    #[test]
    fn full_lifecycle_walk() {
        let (mut axis, _probe) = probed_axis();

        assert!(axis.unlock());
        assert!(axis.is_stopped());

        assert!(axis.drive(0.0));
        assert!(axis.is_driven());

        assert!(axis.stop());
        assert!(axis.is_stopped());

        assert!(axis.lock());
        assert!(axis.is_locked());
    }

    #[test]
    fn drive_from_locked_is_rejected_without_side_effects() {
        let (mut axis, probe) = probed_axis();
        assert!(!axis.drive(0.5));
        assert!(axis.is_locked());
        assert!(probe.take().is_empty());
    }

    #[test]
    fn lock_from_driven_is_rejected() {
        let (mut axis, probe) = probed_axis();
        axis.unlock();
        axis.drive(0.0);
        probe.take();

        assert!(!axis.lock());
        assert!(axis.is_driven());
        assert!(probe.take().is_empty());
    }

    #[test]
    fn stop_is_only_legal_from_driven() {
        let (mut axis, _probe) = probed_axis();
        assert!(!axis.stop());
        axis.unlock();
        assert!(!axis.stop());
        axis.drive(0.0);
        assert!(axis.stop());
        assert!(!axis.stop());
    }

    #[test]
    fn unlock_is_only_legal_from_locked() {
        let (mut axis, _probe) = probed_axis();
        assert!(axis.unlock());
        assert!(!axis.unlock());
    }

    #[test]
    fn start_transition_enables_then_drives() {
        let (mut axis, probe) = probed_axis();
        axis.unlock();
        probe.take();

        assert!(axis.drive(0.0));
        assert_eq!(probe.take(), vec!["enable(true)", "drive(0)"]);

        // Already driven: pass-through only.
        assert!(axis.drive(0.75));
        assert_eq!(probe.take(), vec!["drive(0.75)"]);
    }

    #[test]
    fn stop_zeroes_command_then_disables() {
        let (mut axis, probe) = probed_axis();
        axis.unlock();
        axis.drive(0.5);
        probe.take();

        assert!(axis.stop());
        assert_eq!(probe.take(), vec!["drive(0)", "enable(false)"]);
    }

    #[test]
    fn brake_follows_lock_and_unlock() {
        let (mut axis, probe) = probed_axis();

        assert!(axis.unlock());
        assert_eq!(probe.take(), vec!["brake(false)"]);

        assert!(axis.lock());
        assert_eq!(probe.take(), vec!["brake(true)"]);
    }
}
