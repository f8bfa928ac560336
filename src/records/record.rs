//! # Record Context
//!
//! A `Record` is a window onto one record slot. It starts **unread**: the
//! storage cursor sits at the slot but nothing has been loaded. The first call
//! that needs data loads the slot and extracts the deletion marker and null
//! bitmap, which makes the record **read**.
//!
//! ```text
//!          reposition(recno)
//!     +-------------------------+
//!     v                         |
//! +--------+   any access   +--------+
//! | Unread | -------------> |  Read  |
//! +--------+                +--------+
//! ```
//!
//! The state matters for scanning: loading a slot advances the storage
//! cursor past it, while a record that was never read leaves the cursor in
//! place and the cursor must skip the slot itself.
//!
//! ## Null Handling
//!
//! Nullable fields own a bit in the `_NullFlags` system field. A set bit makes
//! the field decode to [`Value::Null`] without looking at its bytes.

use std::collections::HashMap;

use eyre::{bail, Result, WrapErr};

use crate::config::{DELETED_MARKER, MAX_NULL_FLAG_BYTES};
use crate::error::DbfError;
use crate::memory::PooledBuffer;
use crate::schema::{FieldDescriptor, TableSchema};
use crate::storage::{AnyStorage, BackingStorage};

use super::decode::FieldDecoder;
use super::memo::MemoFile;
use super::row::Row;
use super::value::Value;

pub struct Record<'t> {
    storage: &'t mut AnyStorage,
    memo: Option<&'t mut MemoFile>,
    schema: &'t TableSchema,
    decoder: FieldDecoder<'t>,
    buffer: PooledBuffer,
    recno: u32,
    read: bool,
    null_flags: u64,
}

impl std::fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("recno", &self.recno)
            .field("read", &self.read)
            .finish()
    }
}

impl<'t> Record<'t> {
    /// Creates a context for `recno`. The storage cursor must already be at
    /// the record's slot.
    pub(crate) fn new(
        storage: &'t mut AnyStorage,
        memo: Option<&'t mut MemoFile>,
        schema: &'t TableSchema,
        decoder: FieldDecoder<'t>,
        recno: u32,
    ) -> Self {
        let buffer = decoder
            .pools
            .buffers
            .acquire(schema.header().record_length() as usize);

        Self {
            storage,
            memo,
            schema,
            decoder,
            buffer,
            recno,
            read: false,
            null_flags: 0,
        }
    }

    /// Zero-based record number.
    pub fn recno(&self) -> u32 {
        self.recno
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn fields(&self) -> &'t [FieldDescriptor] {
        self.schema.fields()
    }

    /// Moves the context to the next slot without touching storage.
    pub(crate) fn reposition(&mut self, recno: u32) {
        self.recno = recno;
        self.read = false;
        self.null_flags = 0;
    }

    pub(crate) fn storage_mut(&mut self) -> &mut AnyStorage {
        self.storage
    }

    fn ensure_read(&mut self) -> Result<()> {
        if self.read {
            return Ok(());
        }

        let len = self.schema.header().record_length() as usize;
        let recno = self.recno;
        self.storage
            .read_exact(&mut self.buffer[..len])
            .wrap_err_with(|| format!("failed to read record {}", recno))?;

        self.null_flags = match self.schema.null_flags_field() {
            Some(field) => {
                let bytes = &self.buffer[field.range()];
                let mut flags = [0u8; 8];
                let n = bytes.len().min(MAX_NULL_FLAG_BYTES);
                flags[..n].copy_from_slice(&bytes[..n]);
                u64::from_le_bytes(flags)
            }
            None => 0,
        };

        self.read = true;
        Ok(())
    }

    /// Whether the slot carries the deletion marker.
    pub fn deleted(&mut self) -> Result<bool> {
        self.ensure_read()?;
        Ok(self.buffer[0] == DELETED_MARKER)
    }

    fn is_null(&self, field: &FieldDescriptor) -> bool {
        field
            .null_bit
            .is_some_and(|bit| bit < 64 && self.null_flags & (1u64 << bit) != 0)
    }

    /// Decodes `field`, applying the null bitmap. `None` for undecodable tags.
    fn decode(&mut self, field: &FieldDescriptor) -> Result<Option<Value>> {
        if self.is_null(field) {
            return Ok(Some(Value::Null));
        }
        let len = self.schema.header().record_length() as usize;
        self.decoder
            .decode(field, &self.buffer[..len], self.memo.as_deref_mut())
            .wrap_err_with(|| format!("failed to decode field '{}' of record {}", field.name, self.recno))
    }

    /// Value of the field at position `index` in the descriptor list.
    pub fn field_at(&mut self, index: usize) -> Result<Value> {
        self.ensure_read()?;
        let schema = self.schema;
        let Some(field) = schema.fields().get(index) else {
            bail!(DbfError::FieldNotFound(format!("#{}", index)));
        };
        self.value_of(field)
    }

    /// Value of the field named `name`, compared case-insensitively.
    pub fn field_value(&mut self, name: &str) -> Result<Value> {
        let schema = self.schema;
        let Some(field) = schema.field(name) else {
            bail!(DbfError::FieldNotFound(name.to_string()));
        };
        self.value_of(field)
    }

    /// Value of a descriptor taken from this record's table.
    pub fn value_of(&mut self, field: &FieldDescriptor) -> Result<Value> {
        self.ensure_read()?;
        match self.decode(field)? {
            Some(value) => Ok(value),
            None => bail!(DbfError::UnsupportedFieldType {
                field: field.name.clone(),
                tag: field.field_type.tag(),
            }),
        }
    }

    /// All non-system fields keyed by name. Fields without a decoder are left out.
    pub fn to_map(&mut self) -> Result<HashMap<String, Value>> {
        self.ensure_read()?;
        let schema = self.schema;
        let mut map = HashMap::with_capacity(schema.fields().len());

        for field in schema.user_fields() {
            if let Some(value) = self.decode(field)? {
                map.insert(field.name.clone(), value);
            }
        }

        Ok(map)
    }

    /// One value per descriptor, in descriptor order. System fields and fields
    /// without a decoder are `Value::Null`.
    pub fn to_row(&mut self) -> Result<Vec<Value>> {
        self.ensure_read()?;
        let mut row = vec![Value::Null; self.schema.fields().len()];
        self.fill_row(&mut row)?;
        Ok(row)
    }

    /// Decodes the row into a pooled slice and hands it to `f`.
    ///
    /// The slice goes back to the pool when `f` returns; use [`Record::snapshot`]
    /// or [`Record::to_row`] to keep values.
    pub fn with_row<R>(&mut self, f: impl FnOnce(&[Value]) -> R) -> Result<R> {
        self.ensure_read()?;
        let mut row = self.decoder.pools.rows.acquire(self.schema.fields().len());
        self.fill_row(&mut row)?;
        Ok(f(&row))
    }

    fn fill_row(&mut self, row: &mut [Value]) -> Result<()> {
        let schema = self.schema;
        for (slot, field) in row.iter_mut().zip(schema.fields()) {
            *slot = if field.is_system() {
                Value::Null
            } else {
                self.decode(field)?.unwrap_or(Value::Null)
            };
        }
        Ok(())
    }

    /// Owned copy of the record that outlives the cursor.
    pub fn snapshot(&mut self) -> Result<Row> {
        let deleted = self.deleted()?;
        let schema = self.schema;
        let mut names = Vec::with_capacity(schema.fields().len());
        let mut values = Vec::with_capacity(schema.fields().len());

        for field in schema.user_fields() {
            names.push(field.name.clone());
            values.push(self.decode(field)?.unwrap_or(Value::Null));
        }

        Ok(Row::new(self.recno, deleted, names, values))
    }
}
