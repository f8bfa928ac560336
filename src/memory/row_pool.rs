//! # Row Value Pool
//!
//! Reusable `Vec<Value>` slices for decoding a whole row without allocating a
//! fresh vector per record. Used by [`Record::with_row`](crate::Record::with_row).
//!
//! Vectors are cleared before they go back to the freelist so no decoded text
//! outlives the row it belonged to.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{DEFAULT_ROW_CAPACITY, MAX_POOLED_ROWS};
use crate::records::Value;

#[derive(Clone, Default)]
pub struct RowPool {
    inner: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl std::fmt::Debug for RowPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowPool")
            .field("available", &self.available())
            .finish()
    }
}

impl RowPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a row of exactly `len` values, all `Value::Null`.
    pub fn acquire(&self, len: usize) -> PooledRow {
        let mut row = self
            .inner
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(len.max(DEFAULT_ROW_CAPACITY)));
        row.resize(len, Value::Null);

        PooledRow {
            row: ManuallyDrop::new(row),
            pool: Arc::clone(&self.inner),
        }
    }

    pub fn available(&self) -> usize {
        self.inner.lock().len()
    }
}

/// A value vector that returns to its pool when dropped.
pub struct PooledRow {
    row: ManuallyDrop<Vec<Value>>,
    pool: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl std::fmt::Debug for PooledRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.row.iter()).finish()
    }
}

impl Deref for PooledRow {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.row
    }
}

impl DerefMut for PooledRow {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.row
    }
}

impl Drop for PooledRow {
    fn drop(&mut self) {
        // SAFETY: drop() runs once and self.row is not touched afterwards.
        let mut row = unsafe { ManuallyDrop::take(&mut self.row) };
        row.clear();
        let mut freelist = self.pool.lock();
        if freelist.len() < MAX_POOLED_ROWS {
            freelist.push(row);
        }
    }
}
