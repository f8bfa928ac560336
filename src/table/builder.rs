//! # Table Builder
//!
//! `TableBuilder` configures how a table is opened: which file, which code
//! page, which storage backend, and how values are post-processed.
//!
//! ## Configuration Options
//!
//! | Option     | Default         | Description                                 |
//! |------------|-----------------|---------------------------------------------|
//! | path       | required        | Table file (`.dbf`, `.dbc`, ...)            |
//! | codec      | required        | Code page used for names, C and M fields    |
//! | storage    | `Buffered`      | Backend for the table and its memo file     |
//! | trim_right | `false`         | Strip trailing spaces from C fields         |
//! | pools      | fresh `Pools`   | Byte and row pools, shareable across tables |
//!
//! ## Usage Examples
//!
//! ```ignore
//! let table = Table::builder()
//!     .path("data/contacts.dbf")
//!     .codec(encoding_rs::WINDOWS_1252)
//!     .storage(StorageKind::Mmap)
//!     .trim_right(true)
//!     .open()?;
//! ```
//!
//! Sharing pools between tables scanned on different threads:
//!
//! ```ignore
//! let pools = Pools::new();
//! let orders = Table::builder().path("orders.dbf").codec(WINDOWS_1252).pools(pools.clone()).open()?;
//! let items = Table::builder().path("items.dbf").codec(WINDOWS_1252).pools(pools).open()?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;

use crate::codec::{Codec, IntoCodec};
use crate::memory::Pools;
use crate::storage::StorageKind;

use super::Table;

/// Per-table decoding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Strip trailing 0x20 from decoded character fields.
    pub trim_right: bool,
}

/// Builder for configuring and opening a table.
pub struct TableBuilder {
    path: Option<PathBuf>,
    codec: Option<Arc<dyn Codec>>,
    storage: StorageKind,
    options: ReadOptions,
    pools: Option<Pools>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            path: None,
            codec: None,
            storage: StorageKind::default(),
            options: ReadOptions::default(),
            pools: None,
        }
    }

    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the code page. Accepts `encoding_rs` statics or a shared `Arc<dyn Codec>`.
    pub fn codec(mut self, codec: impl IntoCodec) -> Self {
        self.codec = Some(codec.into_codec());
        self
    }

    /// Selects the storage backend for the table and its memo file.
    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.storage = kind;
        self
    }

    pub fn trim_right(mut self, enabled: bool) -> Self {
        self.options.trim_right = enabled;
        self
    }

    pub fn options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Draws scratch buffers from `pools` instead of a private set.
    pub fn pools(mut self, pools: Pools) -> Self {
        self.pools = Some(pools);
        self
    }

    /// Opens the table with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No path or codec was specified
    /// - The table or its memo file cannot be opened
    /// - The header, field descriptors or backlink are malformed
    pub fn open(self) -> Result<Table> {
        let path = self
            .path
            .ok_or_else(|| eyre::eyre!("table path not specified: call .path() first"))?;
        let codec = self
            .codec
            .ok_or_else(|| eyre::eyre!("codec not specified: call .codec() first"))?;

        Table::open_with(
            path,
            codec,
            self.storage,
            self.options,
            self.pools.unwrap_or_default(),
        )
    }

    pub fn get_path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    pub fn get_storage(&self) -> StorageKind {
        self.storage
    }

    pub fn get_options(&self) -> ReadOptions {
        self.options
    }
}
