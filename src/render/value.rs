//! Native value model for document-database queries.
//!
//! Serializes to MongoDB Extended JSON so dates and patterns survive a trip
//! through JSON or YAML.

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::dsl::Literal;

/// Insertion-ordered document. Key order matters for `sort`.
pub type Document = IndexMap<String, NativeValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(OffsetDateTime),
    Regex { pattern: String, options: String },
    Array(Vec<NativeValue>),
    Document(Document),
}

impl NativeValue {
    /// Case-insensitive regular expression.
    pub fn regex(pattern: impl Into<String>) -> Self {
        NativeValue::Regex {
            pattern: pattern.into(),
            options: "i".to_string(),
        }
    }
}

impl From<&Literal> for NativeValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Date(date) => NativeValue::DateTime(*date),
            Literal::Number(n) => NativeValue::Double(*n),
            Literal::Boolean(b) => NativeValue::Bool(*b),
            Literal::Pattern(source) => NativeValue::regex(source.clone()),
        }
    }
}

impl From<Document> for NativeValue {
    fn from(doc: Document) -> Self {
        NativeValue::Document(doc)
    }
}

/// A document with a single entry.
pub fn single(key: impl Into<String>, value: impl Into<NativeValue>) -> Document {
    let mut doc = Document::new();
    doc.insert(key.into(), value.into());
    doc
}

#[derive(Serialize)]
struct RegexBody<'a> {
    pattern: &'a str,
    options: &'a str,
}

impl Serialize for NativeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NativeValue::Bool(b) => serializer.serialize_bool(*b),
            NativeValue::Int(i) => serializer.serialize_i64(*i),
            NativeValue::Double(n) => serializer.serialize_f64(*n),
            NativeValue::String(s) => serializer.serialize_str(s),
            NativeValue::DateTime(date) => {
                let formatted = date.format(&Rfc3339).map_err(S::Error::custom)?;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$date", &formatted)?;
                map.end()
            }
            NativeValue::Regex { pattern, options } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$regularExpression", &RegexBody { pattern, options })?;
                map.end()
            }
            NativeValue::Array(items) => serializer.collect_seq(items),
            NativeValue::Document(doc) => serializer.collect_map(doc),
        }
    }
}
