//! Control unit error types.

use nvc_common::config::ConfigError;
use thiserror::Error;

/// Errors raised during controller construction.
///
/// The running update tick never fails: out-of-range values are reported
/// as notifications so the tick always completes.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A hardware device binding could not be constructed. Fatal: the
    /// controller must not run with a partially bound axis set.
    #[error("hardware binding failed: {0}")]
    HardwareBinding(String),
}
