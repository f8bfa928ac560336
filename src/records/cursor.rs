//! # Record Cursor
//!
//! Walks the record slots of a table front to back with a single reused
//! [`Record`] context. Each call to [`RecordCursor::advance`] hands out that
//! context for the next slot; the reference is only valid until the next
//! advance, which the borrow checker enforces.
//!
//! ```ignore
//! let mut cursor = table.cursor(0)?;
//! while let Some(record) = cursor.advance()? {
//!     if record.deleted()? {
//!         continue;
//!     }
//!     rows.push(record.snapshot()?);
//! }
//! ```
//!
//! Records the caller never touched are skipped with a relative seek instead
//! of being read.

use std::io::SeekFrom;

use eyre::{Result, WrapErr};

use crate::storage::BackingStorage;

use super::record::Record;

pub struct RecordCursor<'t> {
    record: Option<Record<'t>>,
    next: u32,
    end: u32,
    record_length: u64,
    started: bool,
}

impl<'t> RecordCursor<'t> {
    /// A cursor over `[from, end)`. When the range is non-empty the storage
    /// cursor must already be at slot `from`.
    pub(crate) fn new(record: Option<Record<'t>>, from: u32, end: u32, record_length: u64) -> Self {
        Self {
            record,
            next: from,
            end,
            record_length,
            started: false,
        }
    }

    /// Record number the next `advance` will produce.
    pub fn position(&self) -> u32 {
        self.next
    }

    pub fn remaining(&self) -> u32 {
        self.end.saturating_sub(self.next)
    }

    /// Moves to the next record. Returns `None` once every record was visited.
    pub fn advance(&mut self) -> Result<Option<&mut Record<'t>>> {
        if self.next >= self.end {
            return Ok(None);
        }
        let Some(record) = self.record.as_mut() else {
            return Ok(None);
        };

        if self.started && !record.is_read() {
            let skipped = record.recno();
            record
                .storage_mut()
                .seek(SeekFrom::Current(self.record_length as i64))
                .wrap_err_with(|| format!("failed to skip record {}", skipped))?;
        }

        self.started = true;
        record.reposition(self.next);
        self.next += 1;
        Ok(Some(record))
    }
}
