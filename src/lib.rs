//! # foxdbf - dBase / Visual FoxPro Table Reader
//!
//! foxdbf reads legacy `.DBF` tables, their `.FPT` memo files and the `.DBC`
//! database containers that carry long field names. The crate is read-only
//! and built for bulk scans:
//!
//! - **Storage-agnostic decoding**: buffered file I/O or a memory map behind one trait
//! - **Allocation-light scans**: record, memo and transcoding buffers come from pools
//! - **Closed value model**: every decoded field is a [`Value`] variant
//!
//! ## Quick Start
//!
//! ```ignore
//! use foxdbf::Table;
//!
//! let mut table = Table::open("data/contacts.dbf", encoding_rs::WINDOWS_1252)?;
//! table.read_catalog()?;
//!
//! table.scan(0, |record| {
//!     if !record.deleted()? {
//!         let name = record.field_value("LASTNAME")?;
//!         println!("{}: {:?}", record.recno(), name);
//!     }
//!     Ok(())
//! })?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Table (open / scan / seek)      │
//! ├──────────────────┬──────────────────┤
//! │  Record Decoder  │ Catalog Resolver │
//! ├──────────────────┴──────────────────┤
//! │   Header & Field Descriptor Parser   │
//! ├─────────────────────────────────────┤
//! │  Buffer Pools    │  Codec (external) │
//! ├─────────────────────────────────────┤
//! │  Backing Storage (buffered | mmap)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Layout
//!
//! ```text
//! data/
//! ├── contacts.dbf    # Header, field descriptors, backlink, fixed-length records
//! ├── contacts.fpt    # Memo blocks referenced from M fields
//! ├── contacts.dbc    # Catalog table (itself a DBF)
//! └── contacts.dct    # Catalog memo file
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: Backing storage trait with buffered and memory-mapped backends
//! - [`memory`]: Size-class byte buffer pool and row value pool
//! - [`schema`]: Table header, field descriptors, backlink, catalog
//! - [`records`]: Record context, cursor, typed value decoding
//! - [`table`]: Table handle and builder

#[macro_use]
mod macros;

pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
pub mod records;
pub mod schema;
pub mod storage;
pub mod table;

pub use codec::Codec;
pub use error::DbfError;
pub use memory::Pools;
pub use records::{Record, RecordCursor, Row, Value};
pub use schema::{Catalog, FieldDescriptor, FieldType, TableHeader, TableType};
pub use storage::StorageKind;
pub use table::{ReadOptions, Table, TableBuilder};
