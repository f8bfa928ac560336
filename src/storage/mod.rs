//! # Storage Module
//!
//! This module provides the backing storage layer for foxdbf: a uniform
//! read/seek/stat/close surface over either a buffered file handle or a
//! read-only memory map. Everything above this layer is agnostic to which
//! mechanism is in use.
//!
//! ## Backends
//!
//! | Backend        | Mechanism            | Best for                    |
//! |----------------|----------------------|-----------------------------|
//! | `BufferedFile` | `BufReader<File>`    | Sequential scans, small RAM |
//! | `MmapFile`     | `memmap2::Mmap`      | Random access, hot files    |
//!
//! `BufferedFile` tracks its cursor so contiguous reads never issue a seek.
//! `MmapFile` copies out of the mapped region without a syscall per read.
//!
//! ## Cursor Semantics
//!
//! Both backends share one contract:
//!
//! ```text
//! read(buf)            reads at the cursor, advances it by the bytes read
//! read_at(buf, off)    reads at `off`, leaves the cursor at off + bytes read
//! seek(pos)            moves the cursor; the target must lie in [0, len)
//! ```
//!
//! Seeking before the start or at/after the end of the storage is reported as
//! [`DbfError::SeekOutOfBounds`](crate::DbfError::SeekOutOfBounds), never clamped.
//! Reads past the end return fewer bytes; the `read_exact*` variants turn that
//! into [`DbfError::ShortRead`](crate::DbfError::ShortRead).
//!
//! ## Thread Safety
//!
//! Storage handles are `Send` but mutate their cursor on every read, so one
//! handle serves one thread of control. Open one handle per thread instead.
//!
//! ## Module Organization
//!
//! - `file`: Buffered file backend (`BufferedFile`)
//! - `mmap`: Memory-mapped backend (`MmapFile`)
//! - `driver`: Backend selection (`StorageKind`) and dispatch (`AnyStorage`)

mod driver;
mod file;
mod mmap;

pub use driver::{AnyStorage, StorageKind};
pub use file::BufferedFile;
pub use mmap::MmapFile;

use std::io::SeekFrom;

use eyre::{bail, Result};

use crate::error::DbfError;

/// Read-only byte storage with a tracked cursor.
pub trait BackingStorage: Send {
    /// Reads into `buf` starting at `offset`, returning the bytes read.
    ///
    /// Returns fewer bytes than requested only at end of storage. The cursor
    /// is left at `offset + bytes_read`.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Reads into `buf` at the cursor and advances it.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Moves the cursor and returns the new position.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Current cursor position.
    fn position(&self) -> u64;

    /// Total size of the storage in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases the underlying handle.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Hints that the storage will be read front to back.
    fn advise_sequential(&self) {}

    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        let n = self.read_at(buf, offset)?;
        if n < buf.len() {
            bail!(DbfError::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.read(buf)?;
        if n < buf.len() {
            bail!(DbfError::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }
}

/// Resolves a seek request against the cursor and storage length.
pub(crate) fn resolve_seek(position: u64, len: u64, pos: SeekFrom) -> Result<u64> {
    let target: i128 = match pos {
        SeekFrom::Start(offset) => offset as i128,
        SeekFrom::Current(delta) => position as i128 + delta as i128,
        SeekFrom::End(delta) => len as i128 + delta as i128,
    };

    if target < 0 || target >= len as i128 {
        bail!(DbfError::SeekOutOfBounds {
            offset: target,
            len,
        });
    }

    Ok(target as u64)
}
