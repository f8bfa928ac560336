//! # Table Module
//!
//! The public entry point of foxdbf. A [`Table`] combines the backing storage,
//! the parsed schema, the memo file and the decoding context.
//!
//! ## Open Sequence
//!
//! ```text
//! Table::open / TableBuilder::open
//!     │
//!     ├── AnyStorage::open(path, kind)
//!     ├── TableHeader::read          fixed 32-byte header
//!     ├── parse_fields               descriptors up to 0x0D
//!     ├── read_backlink              VFP dialects only
//!     └── MemoFile::open             when the memo flag is set
//! ```
//!
//! Any failure drops the handles opened so far, so a table that fails to open
//! leaves nothing behind.
//!
//! ## Access
//!
//! | Method          | Purpose                                        |
//! |-----------------|------------------------------------------------|
//! | `record_at`     | random access to one record                    |
//! | `cursor`        | sequential iteration with one reused context   |
//! | `scan`          | visitor over `cursor`, stops at the first error|
//! | `link_catalog`  | apply long field names from a `Catalog`        |
//! | `read_catalog`  | open the backlinked catalog and link it        |
//!
//! ## Thread Safety
//!
//! `Table` is `Send` but every read moves the storage cursor, so it needs
//! `&mut self`. Scan different tables (or separate opens of the same file) on
//! different threads; share only [`Pools`](crate::Pools).

mod builder;
#[allow(clippy::module_inception)]
mod table;

pub use builder::{ReadOptions, TableBuilder};
pub use table::{memo_path_for, Table};
