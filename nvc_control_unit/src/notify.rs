//! Outward limit-violation notifications.
//!
//! Delivery is fire-and-forget: the sink must not block or fail, since it
//! is invoked from the update tick.

use tracing::warn;

/// Receiver of limit-violation notifications.
pub trait NotificationSink: Send {
    /// A measured position left the configured range. The value was still
    /// published.
    fn position_out_of_range(&mut self, axis: usize, value: f64);

    /// A commanded velocity exceeded the configured limit. The command
    /// was dropped for this cycle.
    fn drive_out_of_range(&mut self, axis: usize, value: f64);
}

/// Sink reporting violations as structured warn events.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn position_out_of_range(&mut self, axis: usize, value: f64) {
        warn!(axis, value, "position out of range");
    }

    fn drive_out_of_range(&mut self, axis: usize, value: f64) {
        warn!(axis, value, "drive out of range");
    }
}
