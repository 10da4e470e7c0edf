//! Workspace-wide constants.

/// Number of controlled axes. Fixed at construction time; the controller
/// never grows or shrinks the axis set at runtime.
pub const NUM_AXES: usize = 6;

/// Default control cycle time in microseconds (1 kHz tick).
pub const DEFAULT_CYCLE_TIME_US: u32 = 1000;

/// Default per-axis velocity limit [rad/s].
pub const DEFAULT_VELOCITY_LIMIT: f64 = 1.0;

/// Default lower position limit [rad].
pub const DEFAULT_LOWER_POSITION_LIMIT: f64 = -std::f64::consts::PI;

/// Default upper position limit [rad].
pub const DEFAULT_UPPER_POSITION_LIMIT: f64 = std::f64::consts::PI;
