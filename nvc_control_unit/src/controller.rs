//! The axis-set controller.
//!
//! Owns the fixed set of axes for its whole lifetime, runs the per-tick
//! update, and exposes the lifecycle operations of the command surface.
//! Lifecycle operations and the update tick both take `&mut self`;
//! single ownership is what serializes them (a cross-thread embedding
//! wraps the controller in a mutex).
//!
//! The update tick is allocation-free and never fails: out-of-range
//! values become notifications, not errors.

use crate::axis::Axis;
use crate::backend::PermissiveCircuit;
use crate::factory::AxisSet;
use crate::notify::NotificationSink;
use crate::ports::AxisPorts;
use nvc_common::config::ControllerConfig;
use nvc_common::consts::NUM_AXES;
use nvc_common::limits::{self, LimitViolation};
use nvc_common::state::AxisState;
use std::time::Duration;
use tracing::{info, warn};

/// Controller for the fixed set of joint axes.
pub struct AxisSetController {
    config: ControllerConfig,
    axes: AxisSet,
    ports: [AxisPorts; NUM_AXES],
    permissive: Box<dyn PermissiveCircuit>,
    sink: Box<dyn NotificationSink>,
    activated: bool,
    last_position_violation: Option<LimitViolation>,
    last_drive_violation: Option<LimitViolation>,
}

impl AxisSetController {
    /// Assemble a controller from its parts (see `factory::build_axes`
    /// and `ports::axis_ports`). Starts deactivated, all axes Locked.
    pub fn new(
        mut config: ControllerConfig,
        axes: AxisSet,
        permissive: Box<dyn PermissiveCircuit>,
        ports: [AxisPorts; NUM_AXES],
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        config.normalize();
        Self {
            config,
            axes,
            ports,
            permissive,
            sink,
            activated: false,
            last_position_violation: None,
            last_drive_violation: None,
        }
    }

    /// Number of axes in the set.
    #[inline]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// True once `arm_for_use` has run and until `disarm_for_shutdown`.
    #[inline]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// The configuration the controller was built with.
    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Lifecycle state of an axis, if the index is in range.
    pub fn axis_state(&self, axis: usize) -> Option<AxisState> {
        self.axes.get(axis).map(|a| a.state())
    }

    /// Most recent position violation, if any occurred yet.
    #[inline]
    pub fn last_position_violation(&self) -> Option<LimitViolation> {
        self.last_position_violation
    }

    /// Most recent drive violation, if any occurred yet.
    #[inline]
    pub fn last_drive_violation(&self) -> Option<LimitViolation> {
        self.last_drive_violation
    }

    // ─── Per-tick update ────────────────────────────────────────────

    /// One control tick over all axes, in index order.
    ///
    /// Per axis: publish the measured position (limit-checked, advisory);
    /// for a Driven axis, read the commanded velocity and forward it if
    /// legal, otherwise drop it and notify. Axes that are not Driven
    /// read and write no command.
    pub fn update_tick(&mut self, dt: Duration) {
        for i in 0..self.axes.len() {
            let axis = &mut self.axes[i];
            axis.tick(dt);

            let position = axis.position();
            self.ports[i].position_out.write(position);
            if let Some(violation) = limits::check_position(i, position, &self.config.axes[i]) {
                self.last_position_violation = Some(violation);
                self.sink.position_out_of_range(i, position);
            }

            if axis.is_driven() {
                let velocity = self.ports[i].velocity_in.read();
                if let Some(violation) = limits::check_drive(i, velocity, &self.config.axes[i]) {
                    self.last_drive_violation = Some(violation);
                    self.sink.drive_out_of_range(i, velocity);
                } else {
                    axis.drive(velocity);
                }
            }
        }
    }

    // ─── Single-axis lifecycle operations ───────────────────────────

    /// Start an axis: zero initial command, Stopped → Driven. The axis
    /// state machine is the only precondition check.
    pub fn start_axis(&mut self, axis: usize) -> bool {
        if !self.valid_axis(axis) {
            return false;
        }
        self.axes[axis].drive(0.0)
    }

    /// Stop an axis: Driven → Stopped.
    pub fn stop_axis(&mut self, axis: usize) -> bool {
        if !self.valid_axis(axis) {
            return false;
        }
        self.axes[axis].stop()
    }

    /// Lock an axis: Stopped → Locked.
    pub fn lock_axis(&mut self, axis: usize) -> bool {
        if !self.valid_axis(axis) {
            return false;
        }
        self.axes[axis].lock()
    }

    /// Unlock an axis: Locked → Stopped. Requires the controller to be
    /// activated; otherwise fails without touching the axis.
    pub fn unlock_axis(&mut self, axis: usize) -> bool {
        if !self.activated {
            return false;
        }
        if !self.valid_axis(axis) {
            return false;
        }
        self.axes[axis].unlock()
    }

    /// Completion predicate for `start_axis`.
    pub fn start_axis_completed(&self, axis: usize) -> bool {
        self.axes.get(axis).is_some_and(|a| a.is_driven())
    }

    /// Completion predicate for `stop_axis`.
    pub fn stop_axis_completed(&self, axis: usize) -> bool {
        self.axes.get(axis).is_some_and(|a| a.is_stopped())
    }

    /// Completion predicate for `lock_axis`.
    pub fn lock_axis_completed(&self, axis: usize) -> bool {
        self.axes.get(axis).is_some_and(|a| a.is_locked())
    }

    /// Completion predicate for `unlock_axis`.
    pub fn unlock_axis_completed(&self, axis: usize) -> bool {
        self.axes.get(axis).is_some_and(|a| !a.is_locked())
    }

    // ─── Broadcast lifecycle operations ─────────────────────────────
    //
    // Every axis is attempted in index order even after a failure; the
    // result is the AND over all attempts.

    /// Start all axes.
    pub fn start_all(&mut self) -> bool {
        let mut ok = true;
        for i in 0..self.axes.len() {
            ok &= self.start_axis(i);
        }
        ok
    }

    /// Stop all axes.
    pub fn stop_all(&mut self) -> bool {
        let mut ok = true;
        for i in 0..self.axes.len() {
            ok &= self.stop_axis(i);
        }
        ok
    }

    /// Lock all axes.
    pub fn lock_all(&mut self) -> bool {
        let mut ok = true;
        for i in 0..self.axes.len() {
            ok &= self.lock_axis(i);
        }
        ok
    }

    /// Unlock all axes.
    pub fn unlock_all(&mut self) -> bool {
        let mut ok = true;
        for i in 0..self.axes.len() {
            ok &= self.unlock_axis(i);
        }
        ok
    }

    /// Completion predicate for `start_all`.
    pub fn start_all_completed(&self) -> bool {
        (0..self.axes.len()).all(|i| self.start_axis_completed(i))
    }

    /// Completion predicate for `stop_all`.
    pub fn stop_all_completed(&self) -> bool {
        (0..self.axes.len()).all(|i| self.stop_axis_completed(i))
    }

    /// Completion predicate for `lock_all`.
    pub fn lock_all_completed(&self) -> bool {
        (0..self.axes.len()).all(|i| self.lock_axis_completed(i))
    }

    /// Completion predicate for `unlock_all`.
    pub fn unlock_all_completed(&self) -> bool {
        (0..self.axes.len()).all(|i| self.unlock_axis_completed(i))
    }

    // ─── Arm / disarm ───────────────────────────────────────────────

    /// Energize the permissive circuitry and activate the controller.
    pub fn arm_for_use(&mut self) -> bool {
        self.permissive.energize();
        self.activated = true;
        info!("controller armed");
        true
    }

    /// Force every axis back towards Locked, drop the permissive
    /// circuitry, deactivate.
    ///
    /// Best-effort: individual stop/lock failures are ignored so the
    /// remaining axes are still attempted. Runs on explicit request and
    /// on teardown.
    pub fn disarm_for_shutdown(&mut self) -> bool {
        self.stop_all();
        self.lock_all();
        self.permissive.deenergize();
        self.activated = false;
        info!("controller disarmed");
        true
    }

    // ─── Drive offset maintenance ───────────────────────────────────

    /// Accumulate an adjustment onto an axis' persistent drive offset.
    /// No effect on simulated axes.
    pub fn add_drive_offset(&mut self, axis: usize, offset: f64) -> bool {
        if !self.valid_axis(axis) {
            return false;
        }
        self.axes[axis].add_drive_offset(offset);
        true
    }

    /// Current persistent drive offset of an axis [rad/s].
    pub fn drive_offset(&self, axis: usize) -> Option<f64> {
        self.axes.get(axis).map(Axis::drive_offset)
    }

    /// Copy the accumulated offsets into a configuration for persistence.
    pub fn store_drive_offsets(&self, config: &mut ControllerConfig) {
        for (i, axis) in self.axes.iter().enumerate() {
            if let Some(entry) = config.axes.get_mut(i) {
                entry.drive_offset = axis.drive_offset();
            }
        }
    }

    fn valid_axis(&self, axis: usize) -> bool {
        if axis < self.axes.len() {
            true
        } else {
            warn!(axis, count = self.axes.len(), "axis index out of range");
            false
        }
    }
}

impl Drop for AxisSetController {
    fn drop(&mut self) {
        // Axes must not outlive the controller unlocked.
        self.disarm_for_shutdown();
    }
}
