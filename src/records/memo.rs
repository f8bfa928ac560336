//! # Memo Files
//!
//! `M` fields store a block number; the payload lives in the companion memo
//! file (`.FPT`, or `.DCT` for catalogs). All memo integers are big-endian.
//!
//! ```text
//! Memo file header                     Memo block at 4 + n * block_size
//! +--------+--------+------------+     +------------+-------------------+
//! | 0..4   | 4..6   | 6..8       |     | len (u32)  | payload (len)     |
//! | next   | unused | block size |     |            |                   |
//! +--------+--------+------------+     +------------+-------------------+
//! ```
//!
//! The four bytes at the start of each block hold the block type and are
//! skipped by the `4 +` in the block address.

use std::io::SeekFrom;
use std::path::Path;

use eyre::{bail, Result, WrapErr};
use tracing::debug;

use crate::config::{MEMO_BLOCK_SIZE_OFFSET, MEMO_BLOCK_TYPE_SIZE, MEMO_LENGTH_SIZE};
use crate::error::DbfError;
use crate::memory::{BufferPool, PooledBuffer};
use crate::storage::{AnyStorage, BackingStorage, StorageKind};

#[derive(Debug)]
pub struct MemoFile {
    storage: AnyStorage,
    block_size: u64,
}

impl MemoFile {
    /// Opens the memo file and reads its block size.
    pub fn open<P: AsRef<Path>>(path: P, kind: StorageKind) -> Result<Self> {
        let path = path.as_ref();
        let mut storage = AnyStorage::open(path, kind)?;

        let mut raw = [0u8; 2];
        storage
            .read_exact_at(&mut raw, MEMO_BLOCK_SIZE_OFFSET)
            .wrap_err_with(|| format!("failed to read block size of memo file '{}'", path.display()))?;
        let block_size = u16::from_be_bytes(raw) as u64;

        debug!(path = %path.display(), block_size, "opened memo file");

        Ok(Self {
            storage,
            block_size,
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Byte address of the length prefix of block `offset`.
    pub fn block_address(&self, offset: u32) -> u64 {
        MEMO_BLOCK_TYPE_SIZE + offset as u64 * self.block_size
    }

    /// Reads the payload of block `offset` into a pooled buffer.
    ///
    /// Returns the buffer together with the payload length, or `None` when the
    /// block is empty.
    pub fn read_block(
        &mut self,
        offset: u32,
        pool: &BufferPool,
    ) -> Result<Option<(PooledBuffer, usize)>> {
        let address = self.block_address(offset);
        self.storage
            .seek(SeekFrom::Start(address))
            .wrap_err_with(|| format!("memo block {} is outside the memo file", offset))?;

        let mut prefix = [0u8; MEMO_LENGTH_SIZE];
        self.storage.read_exact(&mut prefix)?;
        let len = u32::from_be_bytes(prefix) as usize;
        if len == 0 {
            return Ok(None);
        }

        // The prefix is untrusted; never size a buffer past the file end.
        let remaining = self.storage.len().saturating_sub(self.storage.position());
        if len as u64 > remaining {
            bail!(DbfError::ShortRead {
                expected: len,
                actual: remaining as usize,
            });
        }

        let mut payload = pool.acquire(len);
        self.storage
            .read_exact(&mut payload[..len])
            .wrap_err_with(|| format!("memo block {} is truncated", offset))?;

        Ok(Some((payload, len)))
    }

    pub fn close(self) -> Result<()> {
        self.storage.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn memo_file(block_size: u16, blocks: &[(u32, &[u8])]) -> NamedTempFile {
        let mut bytes = vec![0u8; 512];
        bytes[6..8].copy_from_slice(&block_size.to_be_bytes());
        for (offset, payload) in blocks {
            let start = 4 + *offset as usize * block_size as usize;
            let end = start + 4 + payload.len();
            if bytes.len() < end {
                bytes.resize(end, 0);
            }
            bytes[start..start + 4].copy_from_slice(&(payload.len() as u32).to_be_bytes());
            bytes[start + 4..end].copy_from_slice(payload);
        }
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_block_size_big_endian() {
        let file = memo_file(64, &[]);
        let memo = MemoFile::open(file.path(), StorageKind::Buffered).unwrap();
        assert_eq!(memo.block_size(), 64);
        assert_eq!(memo.block_address(8), 4 + 8 * 64);
    }

    #[test]
    fn reads_payload_of_block() {
        let file = memo_file(64, &[(8, b"hello memo")]);
        let pool = BufferPool::new();

        for kind in [StorageKind::Buffered, StorageKind::Mmap] {
            let mut memo = MemoFile::open(file.path(), kind).unwrap();
            let (payload, len) = memo.read_block(8, &pool).unwrap().unwrap();
            assert_eq!(&payload[..len], b"hello memo");
        }
    }

    #[test]
    fn zero_length_block_is_empty() {
        let file = memo_file(64, &[(8, b"")]);
        let mut memo = MemoFile::open(file.path(), StorageKind::Buffered).unwrap();
        assert!(memo.read_block(8, &BufferPool::new()).unwrap().is_none());
    }

    #[test]
    fn block_past_end_is_seek_error() {
        let file = memo_file(64, &[]);
        let mut memo = MemoFile::open(file.path(), StorageKind::Mmap).unwrap();
        let err = memo.read_block(1000, &BufferPool::new()).unwrap_err();
        assert!(matches!(
            DbfError::of(&err),
            Some(DbfError::SeekOutOfBounds { .. })
        ));
    }

    #[test]
    fn truncated_payload_is_short_read() {
        let mut file = memo_file(64, &[]);
        let mut tail = vec![0u8; 4];
        tail.extend_from_slice(&100u32.to_be_bytes());
        tail.extend_from_slice(b"abc");
        file.write_all(&tail).unwrap();
        file.flush().unwrap();

        let mut memo = MemoFile::open(file.path(), StorageKind::Buffered).unwrap();
        let err = memo.read_block(8, &BufferPool::new()).unwrap_err();
        assert!(matches!(DbfError::of(&err), Some(DbfError::ShortRead { .. })));
    }

    #[test]
    fn oversized_length_prefix_fails_before_allocating() {
        let mut file = memo_file(64, &[]);
        let mut tail = vec![0u8; 4];
        tail.extend_from_slice(&0xFFFF_FFF0u32.to_be_bytes());
        tail.extend_from_slice(b"abc");
        file.write_all(&tail).unwrap();
        file.flush().unwrap();

        let pool = BufferPool::new();
        for kind in [StorageKind::Buffered, StorageKind::Mmap] {
            let mut memo = MemoFile::open(file.path(), kind).unwrap();
            let err = memo.read_block(8, &pool).unwrap_err();
            assert!(matches!(
                DbfError::of(&err),
                Some(DbfError::ShortRead {
                    expected: 0xFFFF_FFF0,
                    actual: 3,
                })
            ));
        }
    }
}
