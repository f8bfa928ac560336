use std::collections::HashMap;

use super::value::Value;

/// Owned copy of one record, produced by [`Record::snapshot`](super::Record::snapshot).
///
/// Holds the non-system fields in descriptor order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    recno: u32,
    deleted: bool,
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(recno: u32, deleted: bool, names: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            recno,
            deleted,
            names,
            values,
        }
    }

    pub fn recno(&self) -> u32 {
        self.recno
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Case-insensitive lookup by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| &self.values[i])
    }

    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.names.into_iter().zip(self.values).collect()
    }
}
