//! # Field Descriptors
//!
//! Field descriptors follow the fixed header in 32-byte slots. The array ends
//! at the first slot whose first byte is 0x0D.
//!
//! ```text
//! Offset  Size  Field
//! 0       11    name, NUL padded, in the table's code page
//! 11      1     type tag (ASCII)
//! 12      4     displacement of the field inside the record (u32)
//! 16      1     length in bytes
//! 17      1     decimal count
//! 18      1     flags (0x01 system, 0x02 nullable, 0x04 binary, 0x0C autoinc)
//! 19      4     next auto-increment value (u32)
//! 23      1     auto-increment step
//! 24      8     reserved
//! ```
//!
//! ## Type Tags
//!
//! | Tag | Type      | Decoded as                             |
//! |-----|-----------|----------------------------------------|
//! | I   | Integer   | `Value::U32`, 4 bytes little-endian    |
//! | C   | Character | `Value::Text`                          |
//! | D   | Date      | `Value::Date`, ASCII `YYYYMMDD`        |
//! | T   | DateTime  | `Value::DateTime`, julian day + millis |
//! | N   | Numeric   | `Value::Int` or `Value::Float`         |
//! | F   | Float     | same as N                              |
//! | B   | Double    | `Value::Float`, 8 bytes little-endian  |
//! | Y   | Currency  | `Value::Float`, i64 / 10000            |
//! | L   | Logical   | `Value::Bool`                          |
//! | M   | Memo      | `Value::Text` or `Value::Binary`       |
//! | V   | Varchar   | rejected when accessed                 |
//! | Q   | Varbinary | rejected when accessed                 |
//!
//! ## Null and Varlength Bits
//!
//! V, Q and nullable fields draw bit indices into the `_NullFlags` bitmap
//! from one running counter in descriptor order. A nullable varlength field
//! takes two consecutive bits: the varlength bit first, then the null bit.

use eyre::{bail, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::codec::Codec;
use crate::config::{FIELD_DESCRIPTOR_SIZE, FIELD_DESCRIPTOR_TERMINATOR, FIELD_NAME_SIZE};
use crate::error::DbfError;
use crate::storage::BackingStorage;

use super::header::TableHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Character,
    Date,
    DateTime,
    Numeric,
    Float,
    Double,
    Currency,
    Logical,
    Memo,
    Varchar,
    Varbinary,
    Other(char),
}

impl FieldType {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            b'I' => FieldType::Integer,
            b'C' => FieldType::Character,
            b'D' => FieldType::Date,
            b'T' => FieldType::DateTime,
            b'N' => FieldType::Numeric,
            b'F' => FieldType::Float,
            b'B' => FieldType::Double,
            b'Y' => FieldType::Currency,
            b'L' => FieldType::Logical,
            b'M' => FieldType::Memo,
            b'V' => FieldType::Varchar,
            b'Q' => FieldType::Varbinary,
            other => FieldType::Other(other as char),
        }
    }

    pub fn tag(&self) -> char {
        match self {
            FieldType::Integer => 'I',
            FieldType::Character => 'C',
            FieldType::Date => 'D',
            FieldType::DateTime => 'T',
            FieldType::Numeric => 'N',
            FieldType::Float => 'F',
            FieldType::Double => 'B',
            FieldType::Currency => 'Y',
            FieldType::Logical => 'L',
            FieldType::Memo => 'M',
            FieldType::Varchar => 'V',
            FieldType::Varbinary => 'Q',
            FieldType::Other(c) => *c,
        }
    }

    /// Variable-length types own a bit in the varlength part of `_NullFlags`.
    pub fn is_var_length(&self) -> bool {
        matches!(self, FieldType::Varchar | FieldType::Varbinary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags(pub u8);

impl FieldFlags {
    pub const SYSTEM: u8 = 0x01;
    pub const NULLABLE: u8 = 0x02;
    pub const BINARY: u8 = 0x04;
    pub const BINARY_NULLABLE: u8 = 0x06;
    pub const AUTO_INCREMENT: u8 = 0x0C;

    /// Hidden system column such as `_NullFlags`.
    pub fn is_system(&self) -> bool {
        self.0 & Self::SYSTEM != 0
    }

    pub fn is_nullable(&self) -> bool {
        self.0 & Self::NULLABLE != 0
    }

    /// Stored without code page translation.
    pub fn is_binary(&self) -> bool {
        self.0 & Self::BINARY != 0
    }

    pub fn is_auto_increment(&self) -> bool {
        self.0 & Self::AUTO_INCREMENT == Self::AUTO_INCREMENT
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
struct RawFieldDescriptor {
    name: [u8; FIELD_NAME_SIZE],
    field_type: u8,
    displacement: U32,
    length: u8,
    decimal_count: u8,
    flags: u8,
    next_auto_increment: U32,
    auto_increment_step: u8,
    reserved: [u8; 8],
}

const _: () = assert!(std::mem::size_of::<RawFieldDescriptor>() == FIELD_DESCRIPTOR_SIZE);

/// One column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Short name from the descriptor, or the long name once a catalog is linked.
    pub name: String,
    pub field_type: FieldType,
    /// Byte offset inside the record, counting the deletion marker at 0.
    pub displacement: u32,
    pub length: u8,
    pub decimal_count: u8,
    pub flags: FieldFlags,
    pub next_auto_increment: u32,
    pub auto_increment_step: u8,
    /// Position in the table's field list.
    pub index: usize,
    pub var_length_bit: Option<u32>,
    pub null_bit: Option<u32>,
}

impl FieldDescriptor {
    pub fn is_system(&self) -> bool {
        self.flags.is_system()
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.is_nullable()
    }

    pub fn is_binary(&self) -> bool {
        self.flags.is_binary()
    }

    /// Byte range of this field inside a record buffer.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.displacement as usize;
        start..start + self.length as usize
    }

    fn from_raw(raw: &RawFieldDescriptor, index: usize, codec: &dyn Codec) -> Self {
        let name_len = raw
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FIELD_NAME_SIZE);

        Self {
            name: codec.decode_string(&raw.name[..name_len]),
            field_type: FieldType::from_tag(raw.field_type),
            displacement: raw.displacement.get(),
            length: raw.length,
            decimal_count: raw.decimal_count,
            flags: FieldFlags(raw.flags),
            next_auto_increment: raw.next_auto_increment.get(),
            auto_increment_step: raw.auto_increment_step,
            index,
            var_length_bit: None,
            null_bit: None,
        }
    }
}

/// Reads the descriptor array that follows the fixed header.
///
/// Assigns null and varlength bit indices, fills in displacements for tables
/// that leave them zero, and checks that every field fits in a record.
pub fn parse_fields<S: BackingStorage + ?Sized>(
    storage: &mut S,
    header: &TableHeader,
    codec: &dyn Codec,
) -> Result<Vec<FieldDescriptor>> {
    let header_size = header.header_size() as u64;
    let mut fields = Vec::new();
    let mut flag_bits = 0u32;
    let mut slot = [0u8; FIELD_DESCRIPTOR_SIZE];

    loop {
        let index = fields.len();
        let offset = ((index + 1) * FIELD_DESCRIPTOR_SIZE) as u64;

        if offset >= header_size {
            bail!(DbfError::format(format!(
                "no descriptor terminator before header end ({} bytes)",
                header_size
            )));
        }

        let n = storage.read_at(&mut slot, offset)?;
        if n >= 1 && slot[0] == FIELD_DESCRIPTOR_TERMINATOR {
            break;
        }
        if n < FIELD_DESCRIPTOR_SIZE {
            bail!(DbfError::format(format!(
                "field descriptor {} truncated: {} < {} bytes",
                index, n, FIELD_DESCRIPTOR_SIZE
            )));
        }

        let raw = RawFieldDescriptor::read_from_bytes(&slot[..])
            .map_err(|e| eyre::eyre!("failed to parse RawFieldDescriptor: {:?}", e))?;
        let mut field = FieldDescriptor::from_raw(&raw, index, codec);

        if field.field_type.is_var_length() {
            field.var_length_bit = Some(flag_bits);
            flag_bits += 1;
        }
        if field.is_nullable() {
            field.null_bit = Some(flag_bits);
            flag_bits += 1;
        }

        fields.push(field);
    }

    assign_missing_displacements(&mut fields);
    check_record_bounds(&fields, header.record_length())?;

    Ok(fields)
}

/// dBase III writers leave displacements at zero; fields then follow each
/// other after the deletion marker.
fn assign_missing_displacements(fields: &mut [FieldDescriptor]) {
    if fields.is_empty() || fields.iter().any(|f| f.displacement != 0) {
        return;
    }

    let mut next = 1u32;
    for field in fields.iter_mut() {
        field.displacement = next;
        next += field.length as u32;
    }
}

fn check_record_bounds(fields: &[FieldDescriptor], record_length: u16) -> Result<()> {
    for field in fields {
        let end = field.displacement as u64 + field.length as u64;
        if field.displacement == 0 || end > record_length as u64 {
            bail!(DbfError::format(format!(
                "field '{}' spans bytes {}..{} outside record of {} bytes",
                field.name, field.displacement, end, record_length
            )));
        }
    }
    Ok(())
}
