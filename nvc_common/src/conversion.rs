//! Sensor and actuator unit conversion.
//!
//! Static per-axis factors translating encoder ticks to joint radians and
//! commanded velocity [rad/s] to actuator drive voltage. The values match
//! the joint gearing and amplifier calibration of the six-axis arm this
//! controller was commissioned on.

use crate::consts::NUM_AXES;
use std::f64::consts::TAU;

/// Encoder resolution [counts per motor revolution].
pub const ENCODER_COUNTS: f64 = 4096.0;

/// Per-axis gear ratio between motor and joint. Sign encodes the joint's
/// positive rotation sense relative to the motor.
pub const GEAR_RATIOS: [f64; NUM_AXES] = [
    94.14706, -103.23529, 51.44118, 175.0, 150.0, 131.64395,
];

/// Per-axis absolute encoder offset [ticks] at the joint zero position.
pub const ENCODER_OFFSETS: [i32; NUM_AXES] =
    [1_000_004, 1_000_000, 1_000_002, 999_995, 999_048, 1_230_656];

/// Per-axis amplifier calibration [V per rad/s].
pub const VOLTS_PER_RAD_S: [f64; NUM_AXES] = [
    2.4621427, 2.6263797, 1.3345350, 2.3170010, 1.9720996, 1.7094233,
];

/// Per-axis conversion factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Joint radians per encoder tick.
    pub rad_per_tick: f64,
    /// Encoder reading [ticks] at the joint zero position.
    pub encoder_offset: i32,
    /// Drive voltage per commanded rad/s.
    pub volt_per_rad_s: f64,
}

impl Conversion {
    /// Scale a raw encoder reading to joint radians.
    #[inline]
    pub fn position_from_ticks(&self, ticks: i32) -> f64 {
        (ticks - self.encoder_offset) as f64 * self.rad_per_tick
    }

    /// Scale a commanded velocity [rad/s] to actuator voltage.
    #[inline]
    pub fn volts_from_velocity(&self, velocity: f64) -> f64 {
        velocity * self.volt_per_rad_s
    }
}

/// Build the full per-axis conversion table.
pub fn table() -> [Conversion; NUM_AXES] {
    std::array::from_fn(|i| Conversion {
        rad_per_tick: TAU / (GEAR_RATIOS[i] * ENCODER_COUNTS),
        encoder_offset: ENCODER_OFFSETS[i],
        volt_per_rad_s: VOLTS_PER_RAD_S[i],
    })
}
