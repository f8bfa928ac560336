//! # Memory-Mapped File Storage
//!
//! `MmapFile` maps a table or memo file read-only and serves reads by copying
//! out of the mapped region. No syscall is issued per read; the OS pages the
//! file in on first touch.
//!
//! ## Safety Considerations
//!
//! A mapped file can change underneath the process if another writer truncates
//! or rewrites it. foxdbf is a reader for files that are not being written
//! concurrently, and every access is bounds-checked against the length captured
//! at map time.
//!
//! ## Empty Files
//!
//! Mapping a zero-length file is not portable, so an empty file is represented
//! without a mapping and behaves like an empty slice.

use std::fs::File;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use memmap2::Mmap;

use super::{resolve_seek, BackingStorage};

#[derive(Debug)]
pub struct MmapFile {
    map: Option<Mmap>,
    path: PathBuf,
    position: u64,
}

impl MmapFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open '{}'", path.display()))?;

        let file_size = file
            .metadata()
            .wrap_err_with(|| format!("failed to get metadata for '{}'", path.display()))?
            .len();

        let map = if file_size == 0 {
            None
        } else {
            // SAFETY: Mmap::map is unsafe because the file may be modified by
            // another process while mapped. This is acceptable because:
            // 1. The mapping is read-only; foxdbf never writes through it
            // 2. Tables are not expected to be written while being read
            // 3. All access goes through bytes() slices bounded by the map length
            let map = unsafe {
                Mmap::map(&file)
                    .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
            };
            Some(map)
        };

        Ok(Self {
            map,
            path: path.to_path_buf(),
            position: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    fn copy_from(&mut self, buf: &mut [u8], offset: u64) -> usize {
        let bytes = self.map.as_deref().unwrap_or(&[]);
        let start = (offset as usize).min(bytes.len());
        let end = start.saturating_add(buf.len()).min(bytes.len());
        let n = end - start;
        buf[..n].copy_from_slice(&bytes[start..end]);
        self.position = offset + n as u64;
        n
    }
}

impl BackingStorage for MmapFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(self.copy_from(buf, offset))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.copy_from(buf, self.position))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.position = resolve_seek(self.position, self.len(), pos)?;
        Ok(self.position)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    fn close(self) -> Result<()> {
        drop(self.map);
        Ok(())
    }

    fn advise_sequential(&self) {
        // Advice is a hint; failure leaves access correct, only slower.
        #[cfg(unix)]
        let _ = self
            .map
            .as_ref()
            .map(|map| map.advise(memmap2::Advice::Sequential));
    }
}
