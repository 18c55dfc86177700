//! Field schemas and the projection of looked-up records onto them.
//!
//! A [`FieldSchema`] is a fixed, ordered list of named accessors over one
//! record type. Callers either take the whole record (no names) or name the
//! fields they want, in the order they want them, repeats included.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A single projected value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

/// A named accessor into a record of type `R`.
pub struct Field<R> {
    pub name: &'static str,
    pub description: &'static str,
    get: fn(&R) -> FieldValue,
}

impl<R> Field<R> {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        get: fn(&R) -> FieldValue,
    ) -> Self {
        Self {
            name,
            description,
            get,
        }
    }

    pub fn value(&self, record: &R) -> FieldValue {
        (self.get)(record)
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Ordered vocabulary of fields for one record type.
#[derive(Debug)]
pub struct FieldSchema<R: 'static> {
    fields: &'static [Field<R>],
}

impl<R: 'static> FieldSchema<R> {
    pub const fn new(fields: &'static [Field<R>]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [Field<R>] {
        self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Validate requested names against the schema.
    ///
    /// An empty request selects the whole schema. Any unknown name fails the
    /// whole selection.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Selection<'_, R>> {
        if names.is_empty() {
            return Ok(Selection {
                schema: self,
                picks: None,
            });
        }

        let mut picks = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            match self.position(name) {
                Some(idx) => picks.push(idx),
                None => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown field '{}' at position {} (expected one of: {})",
                        name,
                        i + 1,
                        self.names().collect::<Vec<_>>().join(", ")
                    )))
                }
            }
        }

        Ok(Selection {
            schema: self,
            picks: Some(picks),
        })
    }
}

/// A validated field selection, reusable across records.
#[derive(Debug)]
pub struct Selection<'s, R: 'static> {
    schema: &'s FieldSchema<R>,
    picks: Option<Vec<usize>>,
}

impl<R: 'static> Selection<'_, R> {
    pub fn render(&self, record: &R) -> QueryResult {
        let fields = self.schema.fields;
        match &self.picks {
            None => QueryResult::Record(Record(
                fields.iter().map(|f| (f.name, f.value(record))).collect(),
            )),
            Some(picks) => {
                QueryResult::Values(picks.iter().map(|&i| fields[i].value(record)).collect())
            }
        }
    }
}

/// A full record: every schema field, in schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(Vec<(&'static str, FieldValue)>);

impl Record {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Outcome of one lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// All schema fields, keyed.
    Record(Record),
    /// Requested fields in request order.
    Values(Vec<FieldValue>),
    /// Organization-style string (ISP, ASN, connection speed).
    Org(String),
    /// No record for the key.
    NotFound,
}

impl QueryResult {
    pub const NOT_FOUND_MESSAGE: &'static str = "not found";

    pub fn is_found(&self) -> bool {
        !matches!(self, QueryResult::NotFound)
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            QueryResult::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn values(&self) -> Option<&[FieldValue]> {
        match self {
            QueryResult::Values(v) => Some(v),
            _ => None,
        }
    }

    pub fn org(&self) -> Option<&str> {
        match self {
            QueryResult::Org(s) => Some(s),
            _ => None,
        }
    }

    /// `"not found"` for a miss, `None` otherwise.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            QueryResult::NotFound => Some(Self::NOT_FOUND_MESSAGE),
            _ => None,
        }
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            QueryResult::Record(record) => record.serialize(serializer),
            QueryResult::Values(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            QueryResult::Org(org) => serializer.serialize_str(org),
            QueryResult::NotFound => serializer.serialize_none(),
        }
    }
}
