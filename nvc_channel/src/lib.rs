//! Latest-value data channels.
//!
//! A channel carries the most recent value of a periodically produced
//! scalar between a single writer and any number of readers. Writes
//! overwrite; reads never block and return the construction default until
//! the first write. Suitable for exchange between a real-time cycle and
//! lower-frequency collaborators: both ends are lock-free and
//! allocation-free after construction.

pub mod scalar;

pub use scalar::{channel, ScalarReader, ScalarWriter};
