//! Per-axis lifecycle state.
//!
//! Uses `#[repr(u8)]` for a compact representation suitable for
//! diagnostic snapshots and channel transport.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single axis.
///
/// The state machine is linear: `Locked ⇄ Stopped ⇄ Driven`. There is no
/// shortcut transition; an axis cannot go from Locked to Driven without
/// passing through Stopped. Transition legality is enforced by
/// `Axis` in `nvc_control_unit`; this enum only names the states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AxisState {
    /// Brake engaged, drive output disabled.
    Locked = 0,
    /// Brake released, drive output disabled.
    Stopped = 1,
    /// Drive output enabled, commanded velocity forwarded each cycle.
    Driven = 2,
}

impl AxisState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Locked),
            1 => Some(Self::Stopped),
            2 => Some(Self::Driven),
            _ => None,
        }
    }

    /// Returns true if the axis is locked.
    #[inline]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Returns true if the axis is stopped (unlocked, not driven).
    #[inline]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the axis is driven.
    #[inline]
    pub const fn is_driven(&self) -> bool {
        matches!(self, Self::Driven)
    }
}

impl Default for AxisState {
    fn default() -> Self {
        Self::Locked
    }
}
