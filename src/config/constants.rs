//! # foxdbf Configuration Constants
//!
//! This module centralizes all configuration constants, grouping interdependent
//! values together and documenting their relationships.
//!
//! ## Dependency Graph
//!
//! ```text
//! TABLE_HEADER_SIZE (32 bytes)
//!       │
//!       └─> FIELD_DESCRIPTOR_SIZE (32 bytes, must match)
//!             Descriptor N lives at (N + 1) * FIELD_DESCRIPTOR_SIZE, which only
//!             works while the fixed header and a descriptor have the same size.
//!
//! BACKLINK_SIZE (263 bytes)
//!       │
//!       └─> Read from [header_size - BACKLINK_SIZE, header_size)
//!
//! MIN_SIZE_CLASS_SHIFT (6) .. MAX_SIZE_CLASS_SHIFT (20)
//!       │
//!       └─> SIZE_CLASS_COUNT (derived)
//!             Byte buffers from 64 B to 1 MiB are pooled, larger ones are
//!             allocated and dropped.
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{FIELD_DESCRIPTOR_SIZE, DELETED_MARKER};
//! ```

// ============================================================================
// TABLE FILE LAYOUT
// Byte-exact constants of the on-disk DBF format
// ============================================================================

/// Size of the fixed table header. Bytes 30..32 are reserved.
pub const TABLE_HEADER_SIZE: usize = 32;

/// Size of one field descriptor slot.
pub const FIELD_DESCRIPTOR_SIZE: usize = 32;

/// Length of the NUL-terminated name slot at the start of a descriptor.
pub const FIELD_NAME_SIZE: usize = 11;

/// First byte of the slot that terminates the descriptor array.
pub const FIELD_DESCRIPTOR_TERMINATOR: u8 = 0x0D;

/// Size of the catalog backlink region that ends at `header_size`.
pub const BACKLINK_SIZE: usize = 263;

/// First byte of a deleted record slot.
pub const DELETED_MARKER: u8 = 0x2A;

/// Name of the system field holding the per-record null bitmap.
pub const NULL_FLAGS_FIELD: &str = "_NullFlags";

const _: () = assert!(
    TABLE_HEADER_SIZE == FIELD_DESCRIPTOR_SIZE,
    "descriptor offsets are computed as (index + 1) * FIELD_DESCRIPTOR_SIZE"
);

const _: () = assert!(
    FIELD_NAME_SIZE < FIELD_DESCRIPTOR_SIZE,
    "field name slot must fit in a descriptor"
);

// ============================================================================
// MEMO FILE LAYOUT
// ============================================================================

/// Offset of the big-endian u16 block size in the memo file header.
pub const MEMO_BLOCK_SIZE_OFFSET: u64 = 6;

/// Bytes skipped at the start of a memo block before the length prefix.
pub const MEMO_BLOCK_TYPE_SIZE: u64 = 4;

/// Size of the big-endian length prefix of a memo block payload.
pub const MEMO_LENGTH_SIZE: usize = 4;

/// Memo file extension for regular tables.
pub const MEMO_EXTENSION: &str = "FPT";

/// Memo file extension for catalog tables.
pub const CATALOG_MEMO_EXTENSION: &str = "DCT";

/// Extension of catalog tables.
pub const CATALOG_EXTENSION: &str = "DBC";

// ============================================================================
// DECODING
// ============================================================================

/// Number of bytes of the `_NullFlags` field folded into the null bitmap.
pub const MAX_NULL_FLAG_BYTES: usize = 8;

/// Julian day number offset of the Fliegel-Van Flandern conversion.
pub const JULIAN_DAY_OFFSET: f64 = 68569.0;

pub const MILLIS_PER_SECOND: u32 = 1_000;

/// Currency fields store a fixed-point value scaled by this factor.
pub const CURRENCY_SCALE: f64 = 10_000.0;

// ============================================================================
// BUFFER POOL CONFIGURATION
// These constants are tightly coupled - changing one may require changing others
// ============================================================================

/// Smallest pooled byte buffer is 2^MIN_SIZE_CLASS_SHIFT bytes.
pub const MIN_SIZE_CLASS_SHIFT: u32 = 6;

/// Largest pooled byte buffer is 2^MAX_SIZE_CLASS_SHIFT bytes.
pub const MAX_SIZE_CLASS_SHIFT: u32 = 20;

/// Number of byte buffer size classes.
pub const SIZE_CLASS_COUNT: usize = (MAX_SIZE_CLASS_SHIFT - MIN_SIZE_CLASS_SHIFT + 1) as usize;

/// Maximum buffers retained per size class. Extra returns are dropped.
pub const MAX_BUFFERS_PER_CLASS: usize = 64;

/// Maximum row value vectors retained by the value pool.
pub const MAX_POOLED_ROWS: usize = 64;

/// Initial length of a pooled row value vector.
pub const DEFAULT_ROW_CAPACITY: usize = 20;

const _: () = assert!(
    MIN_SIZE_CLASS_SHIFT <= MAX_SIZE_CLASS_SHIFT,
    "size class range is empty"
);

const _: () = assert!(
    SIZE_CLASS_COUNT == (MAX_SIZE_CLASS_SHIFT - MIN_SIZE_CLASS_SHIFT + 1) as usize,
    "SIZE_CLASS_COUNT derivation mismatch"
);

// ============================================================================
// STORAGE
// ============================================================================

/// Capacity of the read buffer used by buffered file storage.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;
