//! # Scratch Memory Pools
//!
//! Bulk scans decode thousands of rows; every row needs a record buffer, and
//! character and memo fields need transcoding scratch. This module keeps those
//! allocations on freelists that are checked out for one decode and returned
//! afterwards.
//!
//! ```text
//! +----------------------------------------------------------+
//! |                         Pools                             |
//! +----------------------------------------------------------+
//! |  BufferPool (bytes)            |  RowPool (Vec<Value>)    |
//! |  +----+ +-----+ +-----+ ...    |  +--------+ +--------+   |
//! |  | 64 | | 128 | | 256 |        |  | row    | | row    |   |
//! |  +----+ +-----+ +-----+        |  +--------+ +--------+   |
//! +----------------------------------------------------------+
//! ```
//!
//! ## Ownership
//!
//! Pools are plain values, not process-wide statics. A table gets a fresh
//! `Pools` unless one is injected through the builder; cloning shares the
//! freelists, so several tables (also on different threads) can draw from the
//! same pools.
//!
//! ## Release Discipline
//!
//! Checkouts are RAII guards. A buffer goes back to its freelist when the guard
//! drops, including when the decode that held it returns an error.

mod buffer_pool;
mod row_pool;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use row_pool::{PooledRow, RowPool};

/// The byte and row pools used by one or more tables.
#[derive(Debug, Clone, Default)]
pub struct Pools {
    pub buffers: BufferPool,
    pub rows: RowPool,
}

impl Pools {
    pub fn new() -> Self {
        Self::default()
    }
}
