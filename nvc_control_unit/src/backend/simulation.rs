//! Simulated axis backend.
//!
//! Models the joint as a pure velocity integrator: while the drive output
//! is enabled and the brake released, position advances by the commanded
//! velocity each tick, clamped to the configured position range. No
//! device I/O.

use super::AxisBackend;
use nvc_common::config::AxisConfig;
use std::time::Duration;
use tracing::trace;

/// Velocity-integrating stand-in for one hardware axis.
#[derive(Debug)]
pub struct SimulationBackend {
    position: f64,
    commanded_velocity: f64,
    drive_enabled: bool,
    brake_engaged: bool,
    drive_offset: f64,
    lower_limit: f64,
    upper_limit: f64,
}

impl SimulationBackend {
    /// Create a simulated axis from its configuration.
    ///
    /// Starts at `initial_position`, brake engaged, drive disabled.
    pub fn new(config: &AxisConfig) -> Self {
        Self {
            position: config.initial_position,
            commanded_velocity: 0.0,
            drive_enabled: false,
            brake_engaged: true,
            drive_offset: config.drive_offset,
            lower_limit: config.lower_position_limit,
            upper_limit: config.upper_position_limit,
        }
    }
}

impl AxisBackend for SimulationBackend {
    fn read_position(&mut self) -> f64 {
        self.position
    }

    fn apply_drive(&mut self, velocity: f64) {
        self.commanded_velocity = velocity;
    }

    fn set_drive_enabled(&mut self, enabled: bool) {
        self.drive_enabled = enabled;
        if !enabled {
            self.commanded_velocity = 0.0;
        }
    }

    fn set_brake(&mut self, engaged: bool) {
        self.brake_engaged = engaged;
    }

    fn tick(&mut self, dt: Duration) {
        if !self.drive_enabled || self.brake_engaged {
            return;
        }
        self.position += self.commanded_velocity * dt.as_secs_f64();
        self.position = self.position.clamp(self.lower_limit, self.upper_limit);
        trace!(
            position = self.position,
            velocity = self.commanded_velocity,
            "simulated axis tick"
        );
    }

    // Offset adjustments null out amplifier bias; a simulated axis has
    // none, so the configured value is reported back unchanged.
    fn drive_offset(&self) -> f64 {
        self.drive_offset
    }
}
