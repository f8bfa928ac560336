//! # Table Header
//!
//! The first 32 bytes of every table file. Multi-byte integers are
//! little-endian and read through zerocopy wrappers so the struct can be
//! taken directly from the raw bytes.
//!
//! ```text
//! Offset  Size  Field
//! 0       1     table type (dialect tag)
//! 1       3     last modified: year - 1900, month, day
//! 4       4     record count (u32)
//! 8       2     header size (u16), offset of the first record
//! 10      2     record length (u16), including the deletion marker
//! 12      16    reserved
//! 28      1     flags (0x01 CDX, 0x02 memo, 0x04 catalog)
//! 29      1     code page mark
//! 30      2     reserved
//! ```
//!
//! `header_size` and `record_length` are authoritative. The file may be larger
//! than `header_size + record_count * record_length` (a trailing 0x1A end
//! marker is common); [`crate::Table::calculated_record_count`] offers the
//! size-derived count as a cross-check only.

use chrono::NaiveDate;
use eyre::{bail, Result};
use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::config::TABLE_HEADER_SIZE;
use crate::error::DbfError;
use crate::storage::BackingStorage;

/// Table dialect identified by the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    None,
    FoxBase,
    FoxBasePlusDBaseIII,
    VisualFoxPro,
    VisualFoxProAutoInc,
    VisualFoxProVar,
    DBaseIVTable,
    DBaseIVSystem,
    FoxBasePlusDBaseIIIMemo,
    DBaseIVMemo,
    DBaseIVTableMemo,
    FoxPro2Memo,
    FoxBase2,
    Unknown(u8),
}

impl TableType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => TableType::None,
            0x02 => TableType::FoxBase,
            0x03 => TableType::FoxBasePlusDBaseIII,
            0x30 => TableType::VisualFoxPro,
            0x31 => TableType::VisualFoxProAutoInc,
            0x32 => TableType::VisualFoxProVar,
            0x43 => TableType::DBaseIVTable,
            0x63 => TableType::DBaseIVSystem,
            0x83 => TableType::FoxBasePlusDBaseIIIMemo,
            0x8B => TableType::DBaseIVMemo,
            0xCB => TableType::DBaseIVTableMemo,
            0xF5 => TableType::FoxPro2Memo,
            0xFB => TableType::FoxBase2,
            other => TableType::Unknown(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TableType::None => 0x00,
            TableType::FoxBase => 0x02,
            TableType::FoxBasePlusDBaseIII => 0x03,
            TableType::VisualFoxPro => 0x30,
            TableType::VisualFoxProAutoInc => 0x31,
            TableType::VisualFoxProVar => 0x32,
            TableType::DBaseIVTable => 0x43,
            TableType::DBaseIVSystem => 0x63,
            TableType::FoxBasePlusDBaseIIIMemo => 0x83,
            TableType::DBaseIVMemo => 0x8B,
            TableType::DBaseIVTableMemo => 0xCB,
            TableType::FoxPro2Memo => 0xF5,
            TableType::FoxBase2 => 0xFB,
            TableType::Unknown(b) => *b,
        }
    }

    /// Visual FoxPro tables reserve the 263-byte catalog backlink after the
    /// descriptor terminator.
    pub fn has_backlink(&self) -> bool {
        matches!(
            self,
            TableType::VisualFoxPro | TableType::VisualFoxProAutoInc | TableType::VisualFoxProVar
        )
    }
}

/// Header flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableFlags(pub u8);

impl TableFlags {
    pub const NONE: u8 = 0x00;
    pub const STRUCTURAL_INDEX: u8 = 0x01;
    pub const MEMO: u8 = 0x02;
    pub const CATALOG: u8 = 0x04;

    pub fn has_structural_index(&self) -> bool {
        self.0 & Self::STRUCTURAL_INDEX != 0
    }

    pub fn has_memo(&self) -> bool {
        self.0 & Self::MEMO != 0
    }

    /// The table is itself a database container.
    pub fn is_catalog(&self) -> bool {
        self.0 & Self::CATALOG != 0
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct TableHeader {
    table_type: u8,
    mod_year: u8,
    mod_month: u8,
    mod_day: u8,
    record_count: U32,
    header_size: U16,
    record_length: U16,
    reserved: [u8; 16],
    flags: u8,
    code_page: u8,
    reserved_tail: [u8; 2],
}

const _: () = assert!(std::mem::size_of::<TableHeader>() == TABLE_HEADER_SIZE);

impl TableHeader {
    zerocopy_getters! {
        record_count: u32,
        header_size: u16,
        record_length: u16,
    }

    byte_getters! {
        mod_year,
        mod_month,
        mod_day,
        code_page,
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TABLE_HEADER_SIZE {
            bail!(DbfError::format(format!(
                "table header truncated: {} < {} bytes",
                bytes.len(),
                TABLE_HEADER_SIZE
            )));
        }

        let header = Self::read_from_bytes(&bytes[..TABLE_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse TableHeader: {:?}", e))?;

        if header.record_length() == 0 {
            bail!(DbfError::format("record length is zero"));
        }

        if (header.header_size() as usize) <= TABLE_HEADER_SIZE {
            bail!(DbfError::format(format!(
                "header size {} leaves no room for field descriptors",
                header.header_size()
            )));
        }

        Ok(header)
    }

    /// Reads the header from offset 0 of `storage`.
    pub fn read<S: BackingStorage + ?Sized>(storage: &mut S) -> Result<Self> {
        let mut buf = [0u8; TABLE_HEADER_SIZE];
        let n = storage.read_at(&mut buf, 0)?;
        Self::from_bytes(&buf[..n])
    }

    pub fn table_type(&self) -> TableType {
        TableType::from_byte(self.table_type)
    }

    pub fn flags(&self) -> TableFlags {
        TableFlags(self.flags)
    }

    /// Date of the last update, or `None` if the stored bytes are not a date.
    pub fn last_modified(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            1900 + self.mod_year as i32,
            self.mod_month as u32,
            self.mod_day as u32,
        )
    }

    /// Byte offset of record `recno`.
    pub fn record_offset(&self, recno: u32) -> u64 {
        self.header_size() as u64 + recno as u64 * self.record_length() as u64
    }
}
