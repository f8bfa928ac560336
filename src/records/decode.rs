//! # Field Decoding
//!
//! Turns the raw bytes of one field into a [`Value`]. The pure helpers at the
//! top of the file know nothing about tables; [`FieldDecoder`] dispatches on
//! the field type and pulls in the codec, the memo file and scratch buffers.
//!
//! ## Leniency
//!
//! Legacy tables are full of half-written values. Numeric text that does not
//! parse decodes to zero, and dates that are not valid calendar dates decode
//! to the minimum sentinel. Only structural problems (a memo pointer past the
//! memo file, an unsupported V/Q field) are errors.
//!
//! ## Julian Date Conversion
//!
//! `T` fields hold a julian day number in the low 32 bits and milliseconds
//! since midnight in the high 32 bits. The date part uses the Fliegel and
//! Van Flandern algorithm:
//!
//! ```text
//! l = jd + 68569
//! n = floor(4l / 146097)
//! l = l - floor((146097n + 3) / 4)
//! i = floor(4000(l + 1) / 1461001)
//! l = l - floor(1461i / 4) + 31
//! j = floor(80l / 2447)
//! day   = l - floor(2447j / 80)
//! l     = floor(j / 11)
//! month = j + 2 - 12l
//! year  = 100(n - 49) + i + l
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use eyre::{bail, Result};

use crate::codec::Codec;
use crate::config::{CURRENCY_SCALE, JULIAN_DAY_OFFSET, MILLIS_PER_SECOND};
use crate::error::DbfError;
use crate::memory::Pools;
use crate::schema::{FieldDescriptor, FieldType};
use crate::table::ReadOptions;

use super::memo::MemoFile;
use super::value::{minimum_date, minimum_datetime, Value};

const EMPTY_DATE: &[u8; 8] = b"        ";

/// Decodes an ASCII `YYYYMMDD` date.
///
/// Blank fields and digit strings that do not form a calendar date decode to
/// [`minimum_date`].
pub fn decode_date(bytes: &[u8]) -> NaiveDate {
    if bytes.len() < 8 || &bytes[..8] == EMPTY_DATE {
        return minimum_date();
    }

    let digit = |i: usize| bytes[i] as i32 - b'0' as i32;
    let year = ((digit(0) * 10 + digit(1)) * 10 + digit(2)) * 10 + digit(3);
    let month = digit(4) * 10 + digit(5);
    let day = digit(6) * 10 + digit(7);

    match (u32::try_from(month), u32::try_from(day)) {
        (Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(minimum_date),
        _ => minimum_date(),
    }
}

/// Converts a julian day number to a calendar date.
pub fn julian_day_to_date(julian_day: i32) -> Option<NaiveDate> {
    let l = julian_day as f64 + JULIAN_DAY_OFFSET;
    let n = (4.0 * l / 146097.0).floor();
    let l = l - ((146097.0 * n + 3.0) / 4.0).floor();
    let i = (4000.0 * (l + 1.0) / 1461001.0).floor();
    let l = l - (1461.0 * i / 4.0).floor() + 31.0;
    let j = (80.0 * l / 2447.0).floor();
    let day = l - (2447.0 * j / 80.0).floor();
    let l = (j / 11.0).floor();
    let month = j + 2.0 - 12.0 * l;
    let year = 100.0 * (n - 49.0) + i + l;

    if month < 1.0 || day < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
}

/// Decodes the 8-byte julian timestamp of a `T` field.
///
/// The high word counts milliseconds since midnight; whole days past 24 hours
/// carry into the date. Zero decodes to [`minimum_datetime`], as does any value
/// that does not map to a valid date.
pub fn decode_datetime(raw: u64) -> NaiveDateTime {
    if raw == 0 {
        return minimum_datetime();
    }

    let julian_day = raw as u32 as i32;
    let seconds = ((raw >> 32) as u32 / MILLIS_PER_SECOND) as i64;

    julian_day_to_date(julian_day)
        .and_then(|date| {
            date.and_time(NaiveTime::MIN)
                .checked_add_signed(Duration::seconds(seconds))
        })
        .unwrap_or_else(minimum_datetime)
}

/// Digits of a right-aligned numeric field.
///
/// Everything up to and including the last space is padding. A trailing space
/// means the field is blank.
pub fn numeric_digits(bytes: &[u8]) -> &[u8] {
    match bytes.iter().rposition(|&b| b == b' ') {
        Some(i) if i + 1 == bytes.len() => &[],
        Some(i) => &bytes[i + 1..],
        None => bytes,
    }
}

/// Integer value of an `N` field without decimals. Blank or invalid text is 0.
pub fn decode_numeric_int(bytes: &[u8]) -> i64 {
    std::str::from_utf8(numeric_digits(bytes))
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Float value of an `N` or `F` field with decimals. Blank or invalid text is 0.0.
pub fn decode_numeric_float(bytes: &[u8]) -> f64 {
    std::str::from_utf8(numeric_digits(bytes))
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// `L` fields are true for any byte other than NUL and space. The check is on
/// presence only, so `F`, `N` and `?` marks decode as true as well.
pub fn decode_logical(byte: u8) -> bool {
    byte != 0 && byte != b' '
}

fn le_bytes<const N: usize>(field: &FieldDescriptor, bytes: &[u8]) -> Result<[u8; N]> {
    match bytes.get(..N).and_then(|b| <[u8; N]>::try_from(b).ok()) {
        Some(array) => Ok(array),
        None => bail!(DbfError::format(format!(
            "field '{}' of type {} needs {} bytes, has {}",
            field.name,
            field.field_type.tag(),
            N,
            bytes.len()
        ))),
    }
}

/// Per-table decoding context shared by every record of a scan.
#[derive(Clone, Copy)]
pub(crate) struct FieldDecoder<'t> {
    pub codec: &'t dyn Codec,
    pub pools: &'t Pools,
    pub options: ReadOptions,
}

impl<'t> FieldDecoder<'t> {
    /// Decodes `field` from a record buffer.
    ///
    /// Returns `Ok(None)` for type tags without a decoder. Null handling is the
    /// caller's job.
    pub fn decode(
        &self,
        field: &FieldDescriptor,
        record: &[u8],
        memo: Option<&mut MemoFile>,
    ) -> Result<Option<Value>> {
        let Some(bytes) = record.get(field.range()) else {
            bail!(DbfError::format(format!(
                "field '{}' lies outside the {}-byte record",
                field.name,
                record.len()
            )));
        };

        let value = match field.field_type {
            FieldType::Integer => Value::U32(u32::from_le_bytes(le_bytes(field, bytes)?)),
            FieldType::Character => Value::Text(self.transcode(bytes, self.options.trim_right)),
            FieldType::Date => Value::Date(decode_date(bytes)),
            FieldType::DateTime => {
                Value::DateTime(decode_datetime(u64::from_le_bytes(le_bytes(field, bytes)?)))
            }
            FieldType::Numeric | FieldType::Float => {
                if field.decimal_count == 0 {
                    Value::Int(decode_numeric_int(bytes))
                } else {
                    Value::Float(decode_numeric_float(bytes))
                }
            }
            FieldType::Double => Value::Float(f64::from_le_bytes(le_bytes(field, bytes)?)),
            FieldType::Currency => {
                Value::Float(i64::from_le_bytes(le_bytes(field, bytes)?) as f64 / CURRENCY_SCALE)
            }
            FieldType::Logical => Value::Bool(bytes.first().is_some_and(|&b| decode_logical(b))),
            FieldType::Memo => self.decode_memo(field, bytes, memo)?,
            FieldType::Varchar | FieldType::Varbinary => bail!(DbfError::format(format!(
                "field '{}' has variable-length type {}, which cannot be decoded",
                field.name,
                field.field_type.tag()
            ))),
            FieldType::Other(_) => return Ok(None),
        };

        Ok(Some(value))
    }

    fn decode_memo(
        &self,
        field: &FieldDescriptor,
        bytes: &[u8],
        memo: Option<&mut MemoFile>,
    ) -> Result<Value> {
        let offset = u32::from_le_bytes(le_bytes(field, bytes)?);
        let empty = || {
            if field.is_binary() {
                Value::Binary(Vec::new())
            } else {
                Value::Text(String::new())
            }
        };

        if offset == 0 {
            return Ok(empty());
        }

        let Some(memo) = memo else {
            bail!(DbfError::format(format!(
                "memo field '{}' references block {} but the table has no memo file",
                field.name, offset
            )));
        };

        let Some((payload, len)) = memo.read_block(offset, &self.pools.buffers)? else {
            return Ok(empty());
        };

        if field.is_binary() {
            Ok(Value::Binary(payload[..len].to_vec()))
        } else {
            Ok(Value::Text(self.transcode(&payload[..len], false)))
        }
    }

    /// Transcodes through pooled scratch space. Trimming strips 0x20 from the
    /// decoded text, never from the raw bytes.
    fn transcode(&self, raw: &[u8], trim_right: bool) -> String {
        let mut scratch = self.pools.buffers.acquire(self.codec.max_decoded_len(raw.len()));
        let written = self.codec.decode_to_utf8(raw, &mut scratch);

        let mut text = &scratch[..written];
        if trim_right {
            let end = text.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
            text = &text[..end];
        }
        String::from_utf8_lossy(text).into_owned()
    }
}
