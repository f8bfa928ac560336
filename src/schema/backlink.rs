//! Visual FoxPro tables that belong to a database container record the
//! container's relative path in the last 263 bytes of the header. A first byte
//! of zero means the table is free-standing.

use eyre::{bail, Result};

use crate::codec::Codec;
use crate::config::BACKLINK_SIZE;
use crate::error::DbfError;
use crate::storage::BackingStorage;

/// Reads the catalog path stored in `[header_size - 263, header_size)`.
pub fn read_backlink<S: BackingStorage + ?Sized>(
    storage: &mut S,
    header_size: u16,
    codec: &dyn Codec,
) -> Result<Option<String>> {
    let header_size = header_size as usize;
    if header_size < BACKLINK_SIZE {
        bail!(DbfError::format(format!(
            "header size {} is smaller than the {}-byte backlink",
            header_size, BACKLINK_SIZE
        )));
    }

    let mut buf = [0u8; BACKLINK_SIZE];
    let n = storage.read_at(&mut buf, (header_size - BACKLINK_SIZE) as u64)?;
    if n < BACKLINK_SIZE {
        bail!(DbfError::format(format!(
            "backlink truncated: {} < {} bytes",
            n, BACKLINK_SIZE
        )));
    }

    if buf[0] == 0 {
        return Ok(None);
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(BACKLINK_SIZE);
    Ok(Some(codec.decode_string(&buf[..len])))
}
