//! Byte-exact writers for DBF, FPT and DBC fixtures.
//!
//! Layouts follow the on-disk format read by foxdbf: a 32-byte header,
//! 32-byte descriptors terminated by 0x0D, the 263-byte backlink for Visual
//! FoxPro dialects, then fixed-length records.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const VFP: u8 = 0x30;
pub const DBASE3: u8 = 0x03;

pub const FLAG_MEMO: u8 = 0x02;
pub const FLAG_CATALOG: u8 = 0x04;

pub const NULLABLE: u8 = 0x02;
pub const BINARY: u8 = 0x04;
pub const NULL_FLAGS_SYSTEM: u8 = 0x05;

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub tag: u8,
    pub length: u8,
    pub decimals: u8,
    pub flags: u8,
}

pub fn field(name: &str, tag: u8, length: u8) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        tag,
        length,
        decimals: 0,
        flags: 0,
    }
}

impl FieldSpec {
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }
}

/// The hidden `_NullFlags` column Visual FoxPro appends to tables with
/// nullable fields.
pub fn null_flags_field() -> FieldSpec {
    field("_NullFlags", b'0', 1).flags(NULL_FLAGS_SYSTEM)
}

#[derive(Debug, Clone)]
pub struct TableFixture {
    table_type: u8,
    flags: u8,
    fields: Vec<FieldSpec>,
    records: Vec<(bool, Vec<Vec<u8>>)>,
    backlink: Option<String>,
    declared_count: Option<u32>,
    zero_displacements: bool,
    end_marker: bool,
}

impl TableFixture {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            table_type: VFP,
            flags: 0,
            fields,
            records: Vec::new(),
            backlink: None,
            declared_count: None,
            zero_displacements: false,
            end_marker: true,
        }
    }

    pub fn table_type(mut self, table_type: u8) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn backlink(mut self, dbc: &str) -> Self {
        self.backlink = Some(dbc.to_string());
        self
    }

    /// Overrides the record count written to the header.
    pub fn declared_count(mut self, count: u32) -> Self {
        self.declared_count = Some(count);
        self
    }

    pub fn zero_displacements(mut self) -> Self {
        self.zero_displacements = true;
        self
    }

    pub fn without_end_marker(mut self) -> Self {
        self.end_marker = false;
        self
    }

    pub fn record(mut self, values: Vec<Vec<u8>>) -> Self {
        self.records.push((false, values));
        self
    }

    pub fn deleted_record(mut self, values: Vec<Vec<u8>>) -> Self {
        self.records.push((true, values));
        self
    }

    pub fn record_length(&self) -> u16 {
        1 + self.fields.iter().map(|f| f.length as u16).sum::<u16>()
    }

    pub fn has_backlink_area(&self) -> bool {
        matches!(self.table_type, 0x30 | 0x31 | 0x32)
    }

    pub fn header_size(&self) -> u16 {
        let mut size = 32 + 32 * self.fields.len() + 1;
        if self.has_backlink_area() {
            size += 263;
        }
        size as u16
    }

    pub fn bytes(&self) -> Vec<u8> {
        let record_length = self.record_length();
        let count = self
            .declared_count
            .unwrap_or(self.records.len() as u32);

        let mut out = vec![0u8; 32];
        out[0] = self.table_type;
        out[1] = 124;
        out[2] = 6;
        out[3] = 15;
        out[4..8].copy_from_slice(&count.to_le_bytes());
        out[8..10].copy_from_slice(&self.header_size().to_le_bytes());
        out[10..12].copy_from_slice(&record_length.to_le_bytes());
        out[28] = self.flags;
        out[29] = 0x03;

        let mut displacement = 1u32;
        for f in &self.fields {
            let mut d = [0u8; 32];
            let name = f.name.as_bytes();
            let n = name.len().min(11);
            d[..n].copy_from_slice(&name[..n]);
            d[11] = f.tag;
            if !self.zero_displacements {
                d[12..16].copy_from_slice(&displacement.to_le_bytes());
            }
            d[16] = f.length;
            d[17] = f.decimals;
            d[18] = f.flags;
            out.extend_from_slice(&d);
            displacement += f.length as u32;
        }
        out.push(0x0D);

        if self.has_backlink_area() {
            let mut link = [0u8; 263];
            if let Some(dbc) = &self.backlink {
                link[..dbc.len()].copy_from_slice(dbc.as_bytes());
            }
            out.extend_from_slice(&link);
        }

        for (deleted, values) in &self.records {
            out.push(if *deleted { 0x2A } else { b' ' });
            for (f, value) in self.fields.iter().zip(values) {
                let mut cell = value.clone();
                cell.resize(f.length as usize, b' ');
                out.extend_from_slice(&cell);
            }
        }

        if self.end_marker {
            out.push(0x1A);
        }
        out
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        std::fs::write(path, self.bytes()).unwrap();
        path.to_path_buf()
    }
}

/// FoxPro memo file with 64-byte blocks. The first block follows the
/// 512-byte header.
#[derive(Debug, Clone)]
pub struct MemoFixture {
    block_size: u16,
    bytes: Vec<u8>,
}

impl Default for MemoFixture {
    fn default() -> Self {
        Self::new(64)
    }
}

impl MemoFixture {
    pub fn new(block_size: u16) -> Self {
        let mut bytes = vec![0u8; 512];
        bytes[6..8].copy_from_slice(&block_size.to_be_bytes());
        Self { block_size, bytes }
    }

    /// Appends a block and returns its block number.
    pub fn push(&mut self, payload: &[u8]) -> u32 {
        let bs = self.block_size as usize;
        let start = self.bytes.len().div_ceil(bs) * bs;
        self.bytes.resize(start, 0);

        self.bytes.extend_from_slice(&1u32.to_be_bytes());
        self.bytes
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(payload);

        let next_free = self.bytes.len().div_ceil(bs) as u32;
        self.bytes[0..4].copy_from_slice(&next_free.to_be_bytes());

        (start / bs) as u32
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, &self.bytes).unwrap();
    }
}

pub fn int(v: u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

pub fn text(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

/// Right-aligned numeric text.
pub fn num(s: &str, width: usize) -> Vec<u8> {
    format!("{:>width$}", s, width = width).into_bytes()
}

pub fn date(yyyymmdd: &str) -> Vec<u8> {
    yyyymmdd.as_bytes().to_vec()
}

pub fn blank(len: usize) -> Vec<u8> {
    vec![b' '; len]
}

pub fn logical(b: bool) -> Vec<u8> {
    vec![if b { b'T' } else { b' ' }]
}

pub fn datetime(julian_day: u32, millis: u32) -> Vec<u8> {
    let raw = ((millis as u64) << 32) | julian_day as u64;
    raw.to_le_bytes().to_vec()
}

pub fn memo_ref(block: u32) -> Vec<u8> {
    block.to_le_bytes().to_vec()
}

/// Catalog rows are (object id, parent id, object type, object name).
pub fn catalog_fixture(rows: &[(u32, u32, &str, &str)]) -> TableFixture {
    let mut fixture = TableFixture::new(vec![
        field("OBJECTID", b'I', 4),
        field("PARENTID", b'I', 4),
        field("OBJECTTYPE", b'C', 10),
        field("OBJECTNAME", b'C', 128),
    ])
    .flags(FLAG_CATALOG);

    for (id, parent, kind, name) in rows {
        fixture = fixture.record(vec![int(*id), int(*parent), text(kind), text(name)]);
    }
    fixture
}

/// Writes `contacts.dbc` and `contacts.dbf` into `dir` and returns the table path.
///
/// The table stores truncated names; the catalog holds the long ones.
pub fn write_contacts_database(dir: &Path) -> PathBuf {
    catalog_fixture(&[
        (1, 1, "Database", "Database"),
        (5, 1, "Table", "contacts"),
        (6, 5, "Field", "contact_id"),
        (7, 5, "Field", "first_name_of_contact"),
        (8, 5, "Field", "last_name_of_contact"),
        (9, 1, "Table", "orders"),
        (10, 9, "Field", "order_id"),
    ])
    .write(&dir.join("contacts.dbc"));

    TableFixture::new(vec![
        field("CONTACT_ID", b'I', 4),
        field("FIRST_NAME", b'C', 20),
        field("LAST_NAME_", b'C', 20),
    ])
    .backlink("contacts.dbc")
    .record(vec![int(1), text("Ada"), text("Lovelace")])
    .record(vec![int(2), text("Alan"), text("Turing")])
    .write(&dir.join("contacts.dbf"))
}
