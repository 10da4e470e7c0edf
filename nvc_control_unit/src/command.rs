//! Named command surface.
//!
//! External transports deliver lifecycle requests by name; this module is
//! the typed boundary. Each command dispatches synchronously and has a
//! completion predicate the caller may poll.

use crate::controller::AxisSetController;

/// One lifecycle request against the axis set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start updating an axis' drive output (zero initial command).
    StartAxis { axis: usize },
    /// Zero the command and disable an axis' drive output.
    StopAxis { axis: usize },
    /// Engage an axis' brake.
    LockAxis { axis: usize },
    /// Release an axis' brake (controller must be armed).
    UnlockAxis { axis: usize },
    /// Start all axes.
    StartAll,
    /// Stop all axes.
    StopAll,
    /// Lock all axes.
    LockAll,
    /// Unlock all axes.
    UnlockAll,
    /// Energize the permissive circuitry and activate the controller.
    ArmForUse,
    /// Stop and lock everything, drop the permissive circuitry.
    DisarmForShutdown,
    /// Adjust an axis' persistent drive offset [rad/s].
    AddDriveOffset { axis: usize, offset: f64 },
}

/// Execute a command. Returns the operation's success verdict.
pub fn dispatch(command: &Command, controller: &mut AxisSetController) -> bool {
    match *command {
        Command::StartAxis { axis } => controller.start_axis(axis),
        Command::StopAxis { axis } => controller.stop_axis(axis),
        Command::LockAxis { axis } => controller.lock_axis(axis),
        Command::UnlockAxis { axis } => controller.unlock_axis(axis),
        Command::StartAll => controller.start_all(),
        Command::StopAll => controller.stop_all(),
        Command::LockAll => controller.lock_all(),
        Command::UnlockAll => controller.unlock_all(),
        Command::ArmForUse => controller.arm_for_use(),
        Command::DisarmForShutdown => controller.disarm_for_shutdown(),
        Command::AddDriveOffset { axis, offset } => controller.add_drive_offset(axis, offset),
    }
}

/// Poll whether a command's effect is in place.
pub fn completed(command: &Command, controller: &AxisSetController) -> bool {
    match *command {
        Command::StartAxis { axis } => controller.start_axis_completed(axis),
        Command::StopAxis { axis } => controller.stop_axis_completed(axis),
        Command::LockAxis { axis } => controller.lock_axis_completed(axis),
        Command::UnlockAxis { axis } => controller.unlock_axis_completed(axis),
        Command::StartAll => controller.start_all_completed(),
        Command::StopAll => controller.stop_all_completed(),
        Command::LockAll => controller.lock_all_completed(),
        Command::UnlockAll => controller.unlock_all_completed(),
        // Arm, disarm, and offset adjustment complete synchronously.
        Command::ArmForUse | Command::DisarmForShutdown | Command::AddDriveOffset { .. } => true,
    }
}
