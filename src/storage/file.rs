//! # Buffered File Storage
//!
//! `BufferedFile` reads through a `BufReader<File>` and tracks the cursor
//! itself. A `read_at` whose offset equals the tracked cursor is served without
//! a seek, so the record decoder's contiguous reads stay inside the read buffer.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

use super::{resolve_seek, BackingStorage};
use crate::config::READ_BUFFER_SIZE;

#[derive(Debug)]
pub struct BufferedFile {
    reader: BufReader<File>,
    path: PathBuf,
    position: u64,
    len: u64,
}

impl BufferedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open '{}'", path.display()))?;

        let len = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?
            .len();

        Ok(Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, file),
            path: path.to_path_buf(),
            position: 0,
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self
                .reader
                .read(&mut buf[total..])
                .wrap_err_with(|| format!("failed to read '{}'", self.path.display()))?;
            if n == 0 {
                break;
            }
            total += n;
        }
        self.position += total as u64;
        Ok(total)
    }
}

impl BackingStorage for BufferedFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        if offset != self.position {
            self.reader
                .seek(SeekFrom::Start(offset))
                .wrap_err_with(|| format!("failed to seek '{}' to {}", self.path.display(), offset))?;
            self.position = offset;
        }
        self.fill(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.fill(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(self.position, self.len, pos)?;
        if target != self.position {
            let delta = target as i64 - self.position as i64;
            self.reader
                .seek_relative(delta)
                .wrap_err_with(|| format!("failed to seek '{}' to {}", self.path.display(), target))?;
            self.position = target;
        }
        Ok(target)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn close(self) -> Result<()> {
        drop(self.reader);
        Ok(())
    }
}
