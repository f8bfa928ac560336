//! # Catalog Resolver
//!
//! A Visual FoxPro database container (`.DBC`) is itself a table. Each row
//! describes one object; the resolver only cares about two kinds:
//!
//! ```text
//! OBJECTID  PARENTID  OBJECTTYPE  OBJECTNAME
//! 1         1         Database    Database
//! 5         1         Table       contacts
//! 6         5         Field       contact_id
//! 7         5         Field       first_name
//! ```
//!
//! Field rows point at their table through `PARENTID`. Field rows appear in
//! the same order as the table's descriptors, which is what makes positional
//! renaming in [`crate::Table::link_catalog`] work.
//!
//! Table and field names are upper-cased and trimmed. A table is only known
//! to the resolver once at least one field row names it as parent; a table
//! row without fields resolves as missing. Field rows whose parent has not
//! been seen are kept under the empty table name. Deleted rows are ignored.

use std::collections::HashMap;
use std::path::Path;

use eyre::{bail, Result, WrapErr};
use tracing::debug;

use crate::codec::IntoCodec;
use crate::error::DbfError;
use crate::records::Value;
use crate::table::{Table, TableBuilder};

const OBJECT_TYPE: &str = "OBJECTTYPE";
const OBJECT_ID: &str = "OBJECTID";
const PARENT_ID: &str = "PARENTID";
const OBJECT_NAME: &str = "OBJECTNAME";

const TABLE_OBJECT: &str = "Table";
const FIELD_OBJECT: &str = "Field";

/// Table name to ordered long field names, read from a database container.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Vec<String>>,
}

impl Catalog {
    pub fn read<P: AsRef<Path>>(path: P, codec: impl IntoCodec) -> Result<Self> {
        Self::read_with(Table::builder().path(path.as_ref()).codec(codec))
    }

    /// Opens the container with `builder` and reads it.
    ///
    /// Right trimming is forced off; object types are compared as stored.
    pub fn read_with(builder: TableBuilder) -> Result<Self> {
        let mut table = builder.trim_right(false).open()?;
        let catalog = Self::from_table(&mut table)
            .wrap_err_with(|| format!("failed to read catalog '{}'", table.path().display()))?;
        table.close()?;
        Ok(catalog)
    }

    /// Builds the resolver from an already open container table.
    pub fn from_table(table: &mut Table) -> Result<Self> {
        let column = |name: &str| {
            table
                .field_index(name)
                .ok_or_else(|| DbfError::FieldNotFound(name.to_string()))
        };
        let type_idx = column(OBJECT_TYPE)?;
        let id_idx = column(OBJECT_ID)?;
        let parent_idx = column(PARENT_ID)?;
        let name_idx = column(OBJECT_NAME)?;

        let mut table_names: HashMap<u32, String> = HashMap::new();
        let mut tables: HashMap<String, Vec<String>> = HashMap::new();

        table.scan(0, |record| {
            if record.deleted()? {
                return Ok(());
            }

            let object_type = record.field_at(type_idx)?;
            let kind = match object_type.as_str() {
                Some(s) => s.trim_end_matches(' '),
                None => return Ok(()),
            };
            if kind != TABLE_OBJECT && kind != FIELD_OBJECT {
                return Ok(());
            }

            let name = match record.field_at(name_idx)? {
                Value::Text(s) => s.trim().to_uppercase(),
                Value::Null => String::new(),
                other => bail!(DbfError::format(format!(
                    "{} has unexpected value {:?}",
                    OBJECT_NAME, other
                ))),
            };

            if kind == TABLE_OBJECT {
                let id = object_id(&record.field_at(id_idx)?, OBJECT_ID)?;
                table_names.insert(id, name);
            } else {
                let parent = object_id(&record.field_at(parent_idx)?, PARENT_ID)?;
                let owner = table_names.get(&parent).cloned().unwrap_or_default();
                tables.entry(owner).or_default().push(name);
            }
            Ok(())
        })?;

        debug!(tables = tables.len(), "catalog loaded");

        Ok(Self { tables })
    }

    /// Ordered long field names of `table`.
    pub fn fields_of(&self, table: &str) -> Result<&[String]> {
        let key = table.trim().to_uppercase();
        match self.tables.get(&key) {
            Some(fields) => Ok(fields),
            None => bail!(DbfError::TableNotFound(key)),
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(&table.trim().to_uppercase())
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn object_id(value: &Value, column: &str) -> Result<u32> {
    match value {
        Value::U32(id) => Ok(*id),
        Value::Int(id) => u32::try_from(*id)
            .map_err(|_| DbfError::format(format!("{} out of range: {}", column, id)).into()),
        other => bail!(DbfError::format(format!(
            "{} has unexpected value {:?}",
            column, other
        ))),
    }
}
