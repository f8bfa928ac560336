//! # Table Schema
//!
//! Everything foxdbf knows about a table before reading its records: the fixed
//! header, the field descriptor array and the optional catalog backlink.
//!
//! ## Header Area Layout
//!
//! ```text
//! 0            32           32 + 32n      +1         header_size - 263   header_size
//! +------------+------------+-------------+----------+-------------------+
//! | header     | descriptor | descriptor  | 0x0D     | backlink (VFP)    | records...
//! | (32 bytes) | 0          | n-1         | (1 byte) | 263 bytes         |
//! +------------+------------+-------------+----------+-------------------+
//! ```
//!
//! The backlink area only exists for the Visual FoxPro dialects (0x30, 0x31,
//! 0x32). Other dialects place the first record right after the terminator.
//!
//! ## Long Field Names
//!
//! Descriptors hold names of at most 10 characters. Tables inside a database
//! container keep their long names in the container; see [`Catalog`] and
//! [`crate::Table::link_catalog`].
//!
//! ## Module Organization
//!
//! - `header`: `TableHeader`, `TableType`, `TableFlags`
//! - `field`: `FieldDescriptor`, `FieldType`, `FieldFlags`, descriptor parsing
//! - `backlink`: catalog backlink reader
//! - `catalog`: database container resolver

mod backlink;
mod catalog;
mod field;
mod header;

pub use backlink::read_backlink;
pub use catalog::Catalog;
pub use field::{parse_fields, FieldDescriptor, FieldFlags, FieldType};
pub use header::{TableFlags, TableHeader, TableType};

use eyre::{Result, WrapErr};

use crate::codec::Codec;
use crate::config::NULL_FLAGS_FIELD;
use crate::storage::BackingStorage;

/// Parsed header area of one table.
#[derive(Debug, Clone)]
pub struct TableSchema {
    header: TableHeader,
    fields: Vec<FieldDescriptor>,
    backlink: Option<String>,
    null_flags: Option<usize>,
}

impl TableSchema {
    pub fn read<S: BackingStorage + ?Sized>(storage: &mut S, codec: &dyn Codec) -> Result<Self> {
        let header = TableHeader::read(storage).wrap_err("failed to read table header")?;
        let fields =
            parse_fields(storage, &header, codec).wrap_err("failed to read field descriptors")?;

        let backlink = if header.table_type().has_backlink() {
            read_backlink(storage, header.header_size(), codec)
                .wrap_err("failed to read catalog backlink")?
        } else {
            None
        };

        let null_flags = fields
            .iter()
            .position(|f| f.is_system() && f.name.eq_ignore_ascii_case(NULL_FLAGS_FIELD));

        Ok(Self {
            header,
            fields,
            backlink,
            null_flags,
        })
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldDescriptor] {
        &mut self.fields
    }

    pub fn backlink(&self) -> Option<&str> {
        self.backlink.as_deref()
    }

    /// Case-insensitive lookup of a field's position.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    /// The `_NullFlags` system field, if the table has nullable columns.
    pub fn null_flags_field(&self) -> Option<&FieldDescriptor> {
        self.null_flags.map(|i| &self.fields[i])
    }

    /// Fields visible to callers, in descriptor order.
    pub fn user_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_system())
    }
}
