//! # Record Decoding and Scanning
//!
//! This module turns fixed-length record slots into typed [`Value`]s.
//!
//! ## Record Slot Layout
//!
//! ```text
//! +---------+----------------+----------------+-----+----------------+
//! | marker  | field 0        | field 1        | ... | _NullFlags     |
//! | 1 byte  | at displacement| at displacement|     | (system field) |
//! +---------+----------------+----------------+-----+----------------+
//! ```
//!
//! | Component      | Description                                           |
//! |----------------|-------------------------------------------------------|
//! | **marker**     | `0x2A` (`*`) = deleted, anything else = active        |
//! | **fields**     | fixed width, positioned by the descriptor displacement|
//! | **_NullFlags** | per-record bitmap, one bit per nullable / V / Q field |
//!
//! ## Access Patterns
//!
//! - Random access: [`Table::record_at`](crate::Table::record_at) returns a
//!   [`Record`] for one slot.
//! - Sequential: [`Table::cursor`](crate::Table::cursor) hands out one reused
//!   [`Record`] per slot through [`RecordCursor::advance`];
//!   [`Table::scan`](crate::Table::scan) wraps it with a visitor.
//!
//! Records decode lazily: nothing is read from storage until a field, the
//! deletion flag or a whole-row conversion is requested.
//!
//! ## Module Structure
//!
//! - `value`: the `Value` enum and date sentinels
//! - `decode`: per-type decoders
//! - `memo`: memo file access
//! - `record`: the `Record` context
//! - `cursor`: sequential iteration
//! - `row`: owned row snapshots

mod cursor;
mod decode;
mod memo;
mod record;
mod row;
mod value;


pub use cursor::RecordCursor;
pub use decode::{
    decode_date, decode_datetime, decode_logical, decode_numeric_float, decode_numeric_int,
    julian_day_to_date, numeric_digits,
};
pub(crate) use decode::FieldDecoder;
pub use memo::MemoFile;
pub use record::Record;
pub use row::Row;
pub use value::{minimum_date, minimum_datetime, Value};
