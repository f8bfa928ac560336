//! # Byte Buffer Pool
//!
//! Reusable byte buffers for record rows, memo payloads and transcoding
//! scratch space, so that bulk scans allocate once and then recycle.
//!
//! ## Usage
//!
//! ```ignore
//! let pool = BufferPool::new();
//!
//! // At least 300 bytes, rounded up to the 512-byte size class
//! let mut buffer = pool.acquire(300);
//! storage.read_exact(&mut buffer[..300])?;
//!
//! // Buffer automatically returns to its size class when dropped
//! drop(buffer);
//! ```
//!
//! ## Design
//!
//! Buffers are kept in one freelist per power-of-two size class. A request is
//! served from the class that covers it; a miss allocates a fresh buffer of the
//! class size, so correctness never depends on what the pool holds. Requests
//! larger than the biggest class are allocated exactly and not retained.
//!
//! `PooledBuffer` uses `ManuallyDrop` so the buffer is always valid until
//! `Drop` hands it back, on every exit path including `?` returns.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{
    MAX_BUFFERS_PER_CLASS, MAX_SIZE_CLASS_SHIFT, MIN_SIZE_CLASS_SHIFT, SIZE_CLASS_COUNT,
};

/// A pool of reusable byte buffers keyed by size class.
///
/// Cloning shares the underlying freelists.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<BufferPoolInner>,
}

struct BufferPoolInner {
    classes: [Mutex<Vec<Vec<u8>>>; SIZE_CLASS_COUNT],
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("available", &self.available())
            .finish()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the size class serving `min_size`, or `None` if it is too large to pool.
fn size_class(min_size: usize) -> Option<usize> {
    let shift = min_size
        .max(1)
        .next_power_of_two()
        .trailing_zeros()
        .max(MIN_SIZE_CLASS_SHIFT);
    if shift > MAX_SIZE_CLASS_SHIFT {
        return None;
    }
    Some((shift - MIN_SIZE_CLASS_SHIFT) as usize)
}

fn class_size(class: usize) -> usize {
    1usize << (class as u32 + MIN_SIZE_CLASS_SHIFT)
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BufferPoolInner {
                classes: std::array::from_fn(|_| Mutex::new(Vec::new())),
            }),
        }
    }

    /// Acquire a buffer of at least `min_size` bytes.
    ///
    /// The buffer may be larger than requested and may hold stale bytes from a
    /// previous user; callers slice it to the length they fill.
    pub fn acquire(&self, min_size: usize) -> PooledBuffer {
        let class = size_class(min_size);

        let recycled = class.and_then(|c| self.inner.classes[c].lock().pop());

        let buffer = match (recycled, class) {
            (Some(buf), _) => buf,
            (None, Some(c)) => vec![0u8; class_size(c)],
            (None, None) => vec![0u8; min_size],
        };

        PooledBuffer {
            buffer: ManuallyDrop::new(buffer),
            pool: Arc::clone(&self.inner),
            class,
        }
    }

    /// Number of idle buffers across all size classes.
    pub fn available(&self) -> usize {
        self.inner.classes.iter().map(|c| c.lock().len()).sum()
    }
}

/// A byte buffer that returns to its pool when dropped.
pub struct PooledBuffer {
    buffer: ManuallyDrop<Vec<u8>>,
    pool: Arc<BufferPoolInner>,
    class: Option<usize>,
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buffer.len())
            .field("class", &self.class)
            .finish()
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // SAFETY: drop() runs once and self.buffer is not touched afterwards.
        let buffer = unsafe { ManuallyDrop::take(&mut self.buffer) };
        if let Some(class) = self.class {
            let mut freelist = self.pool.classes[class].lock();
            if freelist.len() < MAX_BUFFERS_PER_CLASS {
                freelist.push(buffer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_classes_round_up_to_powers_of_two() {
        assert_eq!(size_class(0), Some(0));
        assert_eq!(size_class(64), Some(0));
        assert_eq!(size_class(65), Some(1));
        assert_eq!(size_class(4096), Some(6));
        assert_eq!(size_class(1 << 20), Some(SIZE_CLASS_COUNT - 1));
        assert_eq!(size_class((1 << 20) + 1), None);
    }

    #[test]
    fn acquired_buffer_covers_request() {
        let pool = BufferPool::new();
        let buf = pool.acquire(300);
        assert_eq!(buf.len(), 512);
    }

    #[test]
    fn buffers_return_on_drop_and_are_reused() {
        let pool = BufferPool::new();
        assert_eq!(pool.available(), 0);

        let mut buf = pool.acquire(100);
        buf[0] = 0xAB;
        let ptr = buf.as_ptr();
        drop(buf);
        assert_eq!(pool.available(), 1);

        let again = pool.acquire(120);
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn smaller_class_is_not_handed_out_for_larger_request() {
        let pool = BufferPool::new();
        drop(pool.acquire(10));

        let big = pool.acquire(1000);
        assert!(big.len() >= 1000);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn oversized_buffers_are_not_retained() {
        let pool = BufferPool::new();
        let huge = pool.acquire((1 << 20) + 5);
        assert_eq!(huge.len(), (1 << 20) + 5);
        drop(huge);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn buffer_returns_on_error_path() {
        fn fails(pool: &BufferPool) -> eyre::Result<()> {
            let _buf = pool.acquire(64);
            eyre::bail!("decode failed");
        }

        let pool = BufferPool::new();
        assert!(fails(&pool).is_err());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn clones_share_freelists() {
        let pool1 = BufferPool::new();
        let pool2 = pool1.clone();

        drop(pool1.acquire(64));
        assert_eq!(pool2.available(), 1);
    }
}
