//! # Table Handle
//!
//! `Table` owns the table's storage handle, its memo file (if any) and the
//! parsed schema. Records are read through a [`Record`] context that borrows
//! the table mutably, so at most one context is alive per table.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{bail, Result, WrapErr};
use tracing::{debug, warn};

use crate::codec::{Codec, IntoCodec};
use crate::config::{CATALOG_EXTENSION, CATALOG_MEMO_EXTENSION, MEMO_EXTENSION};
use crate::error::DbfError;
use crate::memory::Pools;
use crate::records::{FieldDecoder, MemoFile, Record, RecordCursor};
use crate::schema::{Catalog, FieldDescriptor, TableHeader, TableSchema};
use crate::storage::{AnyStorage, BackingStorage, StorageKind};

use super::builder::{ReadOptions, TableBuilder};

pub struct Table {
    path: PathBuf,
    storage: AnyStorage,
    memo: Option<MemoFile>,
    schema: TableSchema,
    codec: Arc<dyn Codec>,
    options: ReadOptions,
    pools: Pools,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("path", &self.path)
            .field("storage", &self.storage.kind())
            .field("record_count", &self.record_count())
            .field("fields", &self.schema.fields().len())
            .field("memo", &self.memo.is_some())
            .finish()
    }
}

impl Table {
    /// Opens `path` with buffered storage and default options.
    pub fn open<P: Into<PathBuf>>(path: P, codec: impl IntoCodec) -> Result<Self> {
        Self::builder().path(path).codec(codec).open()
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    pub(crate) fn open_with(
        path: PathBuf,
        codec: Arc<dyn Codec>,
        kind: StorageKind,
        options: ReadOptions,
        pools: Pools,
    ) -> Result<Self> {
        let mut storage = AnyStorage::open(&path, kind)
            .wrap_err_with(|| format!("failed to open table '{}'", path.display()))?;

        let schema = TableSchema::read(&mut storage, codec.as_ref())
            .wrap_err_with(|| format!("failed to parse table '{}'", path.display()))?;

        let memo = if schema.header().flags().has_memo() {
            let memo_path = memo_path_for(&path);
            let memo = MemoFile::open(&memo_path, kind).wrap_err_with(|| {
                format!(
                    "failed to open memo file '{}' of table '{}'",
                    memo_path.display(),
                    path.display()
                )
            })?;
            Some(memo)
        } else {
            None
        };

        let table = Self {
            path,
            storage,
            memo,
            schema,
            codec,
            options,
            pools,
        };

        let header = table.header();
        debug!(
            path = %table.path.display(),
            table_type = ?header.table_type(),
            records = header.record_count(),
            fields = table.schema.fields().len(),
            storage = kind.name(),
            "opened table"
        );

        let calculated = table.calculated_record_count();
        if calculated < header.record_count() as u64 {
            warn!(
                path = %table.path.display(),
                declared = header.record_count(),
                calculated,
                "file is shorter than the declared record count"
            );
        }

        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table name as used by catalogs: the file stem, upper-cased.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default()
    }

    pub fn header(&self) -> &TableHeader {
        self.schema.header()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.schema.fields()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.schema.field(name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.schema.field_index(name)
    }

    pub fn record_count(&self) -> u32 {
        self.header().record_count()
    }

    /// Record count implied by the file size. A cross-check for
    /// [`record_count`](Self::record_count), which stays authoritative.
    pub fn calculated_record_count(&self) -> u64 {
        let header = self.header();
        self.storage.len().saturating_sub(header.header_size() as u64)
            / header.record_length() as u64
    }

    /// Catalog path stored in the header, including for catalog tables.
    pub fn backlink(&self) -> Option<&str> {
        self.schema.backlink()
    }

    /// Catalog this table belongs to. `None` for free tables and for catalogs.
    pub fn dbc(&self) -> Option<&str> {
        if self.header().flags().is_catalog() {
            return None;
        }
        self.schema.backlink()
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn memo_block_size(&self) -> Option<u64> {
        self.memo.as_ref().map(MemoFile::block_size)
    }

    fn context(&mut self, recno: u32) -> Record<'_> {
        let Table {
            ref mut storage,
            ref mut memo,
            ref schema,
            ref codec,
            options,
            ref pools,
            ..
        } = *self;

        let decoder = FieldDecoder {
            codec: codec.as_ref(),
            pools,
            options,
        };
        Record::new(storage, memo.as_mut(), schema, decoder, recno)
    }

    /// Positions on record `recno` and returns its context.
    pub fn record_at(&mut self, recno: u32) -> Result<Record<'_>> {
        let record_count = self.record_count();
        if recno >= record_count {
            bail!(DbfError::InvalidRecordNumber {
                recno,
                record_count
            });
        }

        let offset = self.header().record_offset(recno);
        self.storage
            .seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to record {}", recno))?;

        Ok(self.context(recno))
    }

    /// Cursor over the records from `from` to the end of the table.
    ///
    /// Starting at or after the end yields no records.
    pub fn cursor(&mut self, from: u32) -> Result<RecordCursor<'_>> {
        let record_count = self.record_count();
        let record_length = self.header().record_length() as u64;

        if from >= record_count {
            return Ok(RecordCursor::new(None, from, record_count, record_length));
        }

        let offset = self.header().record_offset(from);
        self.storage
            .seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to record {}", from))?;
        self.storage.advise_sequential();

        Ok(RecordCursor::new(
            Some(self.context(from)),
            from,
            record_count,
            record_length,
        ))
    }

    /// Calls `visit` for every record from `from` on, stopping at the first error.
    pub fn scan<F>(&mut self, from: u32, mut visit: F) -> Result<()>
    where
        F: FnMut(&mut Record<'_>) -> Result<()>,
    {
        let mut cursor = self.cursor(from)?;
        while let Some(record) = cursor.advance()? {
            visit(record)?;
        }
        Ok(())
    }

    /// Replaces the short field names with the long names from `catalog`.
    ///
    /// Names are assigned by position. Fields beyond the catalog's list keep
    /// their short names.
    pub fn link_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        if self.dbc().is_none() {
            bail!(DbfError::NotCatalogLinked(self.path.clone()));
        }

        let name = self.name();
        let long_names = catalog.fields_of(&name)?;

        let user_fields = self.schema.user_fields().count();
        if long_names.len() < user_fields {
            debug!(
                table = %name,
                fields = user_fields,
                catalog_fields = long_names.len(),
                "catalog lists fewer fields than the table"
            );
        }

        for (field, long) in self
            .schema
            .fields_mut()
            .iter_mut()
            .filter(|f| !f.is_system())
            .zip(long_names)
        {
            field.name = long.clone();
        }

        Ok(())
    }

    /// Path of the catalog named by the backlink, relative to this table.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let dbc = self.dbc()?;
        let dbc = if cfg!(windows) {
            dbc.to_string()
        } else {
            dbc.replace('\\', "/")
        };
        let dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(dbc))
    }

    /// Reads the catalog this table belongs to and links it.
    ///
    /// The catalog is opened with this table's codec, storage kind and pools.
    pub fn read_catalog(&mut self) -> Result<Catalog> {
        let Some(catalog_path) = self.catalog_path() else {
            bail!(DbfError::NotCatalogLinked(self.path.clone()));
        };

        let catalog = Catalog::read_with(
            Table::builder()
                .path(&catalog_path)
                .codec(Arc::clone(&self.codec))
                .storage(self.storage_kind())
                .pools(self.pools.clone()),
        )?;

        self.link_catalog(&catalog)?;
        Ok(catalog)
    }

    /// Releases the table and memo handles.
    pub fn close(self) -> Result<()> {
        let table_result = self.storage.close();
        let memo_result = match self.memo {
            Some(memo) => memo.close(),
            None => Ok(()),
        };
        table_result?;
        memo_result
    }
}

/// Memo file that belongs to `path`.
///
/// `.FPT` for tables and `.DCT` for catalogs, lower-cased when the table's
/// extension is lower case.
pub fn memo_path_for(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let memo_ext = if ext.eq_ignore_ascii_case(CATALOG_EXTENSION) {
        CATALOG_MEMO_EXTENSION
    } else {
        MEMO_EXTENSION
    };

    let lower = !ext.is_empty() && ext.chars().all(|c| !c.is_ascii_uppercase());
    if lower {
        path.with_extension(memo_ext.to_ascii_lowercase())
    } else {
        path.with_extension(memo_ext)
    }
}
