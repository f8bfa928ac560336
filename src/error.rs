//! # Error Kinds
//!
//! foxdbf returns `eyre::Result` everywhere. Failures that callers are expected
//! to react to are raised as a [`DbfError`] inside the report, so the kind can
//! be recovered without string matching:
//!
//! ```ignore
//! match table.record_at(n).and_then(|mut record| record.to_map()) {
//!     Err(e) if matches!(e.downcast_ref::<DbfError>(), Some(DbfError::InvalidRecordNumber { .. })) => {}
//!     other => { other?; }
//! }
//! ```
//!
//! I/O errors from the operating system are propagated as the underlying
//! `std::io::Error` with path context attached.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbfError {
    /// Header, descriptor or backlink bytes are missing or malformed.
    Format(String),
    InvalidRecordNumber {
        recno: u32,
        record_count: u32,
    },
    FieldNotFound(String),
    TableNotFound(String),
    /// The table carries no catalog backlink.
    NotCatalogLinked(PathBuf),
    UnsupportedFieldType {
        field: String,
        tag: char,
    },
    SeekOutOfBounds {
        offset: i128,
        len: u64,
    },
    ShortRead {
        expected: usize,
        actual: usize,
    },
}

impl DbfError {
    pub fn format(msg: impl Into<String>) -> Self {
        DbfError::Format(msg.into())
    }

    /// Returns the `DbfError` carried by a report, if any.
    pub fn of(report: &eyre::Report) -> Option<&DbfError> {
        report.downcast_ref::<DbfError>()
    }
}

impl std::fmt::Display for DbfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbfError::Format(msg) => write!(f, "invalid table format: {}", msg),
            DbfError::InvalidRecordNumber {
                recno,
                record_count,
            } => write!(
                f,
                "invalid record number {} (record_count={})",
                recno, record_count
            ),
            DbfError::FieldNotFound(name) => write!(f, "field '{}' not found", name),
            DbfError::TableNotFound(name) => write!(f, "table '{}' not found in catalog", name),
            DbfError::NotCatalogLinked(path) => {
                write!(f, "table '{}' does not belong to a catalog", path.display())
            }
            DbfError::UnsupportedFieldType { field, tag } => {
                write!(f, "field '{}' has unsupported type '{}'", field, tag)
            }
            DbfError::SeekOutOfBounds { offset, len } => {
                write!(f, "cannot seek to {} (storage length {})", offset, len)
            }
            DbfError::ShortRead { expected, actual } => {
                write!(f, "short read: expected {} bytes, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for DbfError {}
