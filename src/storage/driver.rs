//! # Storage Backend Selection
//!
//! `StorageKind` configures which backend a table (and its memo file) is
//! opened with; `AnyStorage` is the type-erased wrapper that the rest of the
//! crate holds, so the record decoder never knows which backend it reads from.
//!
//! ```ignore
//! let table = Table::builder()
//!     .path("contacts.dbf")
//!     .codec(encoding_rs::WINDOWS_1252)
//!     .storage(StorageKind::Mmap)
//!     .open()?;
//! ```
//!
//! `AnyStorage` deliberately offers no accessor for the inner backend.

use std::io::SeekFrom;
use std::path::Path;

use eyre::Result;

use super::file::BufferedFile;
use super::mmap::MmapFile;
use super::BackingStorage;

/// Configuration for storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Buffered reads through a plain file handle.
    #[default]
    Buffered,
    /// Read-only memory map of the whole file.
    Mmap,
}

impl StorageKind {
    pub fn is_mmap(&self) -> bool {
        matches!(self, StorageKind::Mmap)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Buffered => "buffered",
            StorageKind::Mmap => "mmap",
        }
    }
}

/// Type-erased storage backend that implements `BackingStorage`.
#[derive(Debug)]
pub enum AnyStorage {
    Buffered(BufferedFile),
    Mmap(MmapFile),
}

impl AnyStorage {
    pub fn open<P: AsRef<Path>>(path: P, kind: StorageKind) -> Result<Self> {
        Ok(match kind {
            StorageKind::Buffered => AnyStorage::Buffered(BufferedFile::open(path)?),
            StorageKind::Mmap => AnyStorage::Mmap(MmapFile::open(path)?),
        })
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            AnyStorage::Buffered(_) => StorageKind::Buffered,
            AnyStorage::Mmap(_) => StorageKind::Mmap,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            AnyStorage::Buffered(s) => s.path(),
            AnyStorage::Mmap(s) => s.path(),
        }
    }
}

impl BackingStorage for AnyStorage {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        match self {
            AnyStorage::Buffered(s) => s.read_at(buf, offset),
            AnyStorage::Mmap(s) => s.read_at(buf, offset),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            AnyStorage::Buffered(s) => s.read(buf),
            AnyStorage::Mmap(s) => s.read(buf),
        }
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match self {
            AnyStorage::Buffered(s) => s.seek(pos),
            AnyStorage::Mmap(s) => s.seek(pos),
        }
    }

    fn position(&self) -> u64 {
        match self {
            AnyStorage::Buffered(s) => s.position(),
            AnyStorage::Mmap(s) => s.position(),
        }
    }

    fn len(&self) -> u64 {
        match self {
            AnyStorage::Buffered(s) => s.len(),
            AnyStorage::Mmap(s) => s.len(),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            AnyStorage::Buffered(s) => s.close(),
            AnyStorage::Mmap(s) => s.close(),
        }
    }

    fn advise_sequential(&self) {
        match self {
            AnyStorage::Buffered(s) => s.advise_sequential(),
            AnyStorage::Mmap(s) => s.advise_sequential(),
        }
    }
}
