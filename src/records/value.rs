//! # Decoded Values
//!
//! `Value` is the closed set of results a field decode can produce.
//!
//! | Field type   | Variant                         |
//! |--------------|---------------------------------|
//! | I            | `U32`                           |
//! | C            | `Text`                          |
//! | D            | `Date`                          |
//! | T            | `DateTime`                      |
//! | N, F         | `Int` (no decimals) or `Float`  |
//! | B, Y         | `Float`                         |
//! | L            | `Bool`                          |
//! | M            | `Text`, or `Binary` when binary |
//! | null bit set | `Null`                          |
//!
//! Dates and timestamps carry no zone. The stored wall-clock value is returned
//! as is; [`Value::to_local`] attaches the local zone when needed.
//!
//! Empty dates decode to 0001-01-01 and empty timestamps to
//! 0001-01-01 00:00:00, see [`minimum_date`] and [`minimum_datetime`].

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    U32(u32),
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// Sentinel returned for empty or unparseable dates.
pub fn minimum_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Sentinel returned for empty or unparseable timestamps.
pub fn minimum_datetime() -> NaiveDateTime {
    minimum_date().and_time(NaiveTime::MIN)
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::U32(v) => Some(*v as i64),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::U32(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            _ => None,
        }
    }

    /// Interprets a date or timestamp as local wall-clock time.
    ///
    /// Returns `None` for other variants and for wall-clock times that do not
    /// exist in the local zone.
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        let naive = self.as_datetime()?;
        Local.from_local_datetime(&naive).earliest()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::U32(_) => "u32",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::U32(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
