//! Single-writer scalar channel.
//!
//! The cell stores the value as raw bits in an `AtomicU64` and counts
//! writes in a second atomic. A whole `f64` is exchanged in one atomic
//! store, so readers never observe a torn value. The write counter lets a
//! reader detect whether anything new arrived since it last looked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// The value travels as raw bits through a single 64-bit atomic.
static_assertions::assert_eq_size!(f64, u64);

#[derive(Debug)]
struct Cell {
    bits: AtomicU64,
    writes: AtomicU64,
}

/// Writing end of a scalar channel. Exclusive: not cloneable.
#[derive(Debug)]
pub struct ScalarWriter {
    cell: Arc<Cell>,
}

/// Reading end of a scalar channel. Cloneable; each clone tracks its own
/// change cursor.
#[derive(Debug)]
pub struct ScalarReader {
    cell: Arc<Cell>,
    seen: u64,
}

/// Create a channel pre-loaded with `default`.
///
/// `read()` returns `default` until the first `write()`.
pub fn channel(default: f64) -> (ScalarWriter, ScalarReader) {
    let cell = Arc::new(Cell {
        bits: AtomicU64::new(default.to_bits()),
        writes: AtomicU64::new(0),
    });
    (
        ScalarWriter { cell: cell.clone() },
        ScalarReader { cell, seen: 0 },
    )
}

impl ScalarWriter {
    /// Publish a new value, overwriting any unread prior value.
    #[inline]
    pub fn write(&mut self, value: f64) {
        self.cell.bits.store(value.to_bits(), Ordering::Release);
        self.cell.writes.fetch_add(1, Ordering::Release);
    }
}

impl ScalarReader {
    /// Read the latest value without blocking.
    #[inline]
    pub fn read(&self) -> f64 {
        f64::from_bits(self.cell.bits.load(Ordering::Acquire))
    }

    /// Returns true once per batch of writes since the last call.
    #[inline]
    pub fn has_changed(&mut self) -> bool {
        let writes = self.cell.writes.load(Ordering::Acquire);
        let changed = writes != self.seen;
        self.seen = writes;
        changed
    }

    /// Total number of writes observed on the channel.
    #[inline]
    pub fn write_count(&self) -> u64 {
        self.cell.writes.load(Ordering::Acquire)
    }
}

impl Clone for ScalarReader {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            seen: self.seen,
        }
    }
}
