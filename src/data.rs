use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The value type for fields in a catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Keyword content matched exactly (genre, publisher, ISBN).
    String(String),

    /// Text content that is phrase-matched and/or embedded (title, summary).
    Text(String),

    /// Integer content (edition, counters).
    Int64(i64),

    /// Date and time in UTC.
    DateTime(chrono::DateTime<chrono::Utc>),

    /// Dense embedding vector.
    Vector(Vec<f32>),
}

impl FieldValue {
    /// Returns the string content for both keyword and text variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_vector_ref(&self) -> Option<&Vec<f32>> {
        match self {
            FieldValue::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int64(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for FieldValue {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl From<Vec<f32>> for FieldValue {
    fn from(v: Vec<f32>) -> Self {
        FieldValue::Vector(v)
    }
}

/// A catalog document: an optional external id plus named fields.
///
/// This is the unit the catalog index stores, returns in hits, and mutates
/// through counter increments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// External identifier.
    ///
    /// If `None`, a UUID (v4) is generated by the index during a bulk write.
    pub id: Option<String>,

    /// Field data.
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            id: None,
            fields: HashMap::new(),
        }
    }

    pub fn new_with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: HashMap::new(),
        }
    }

    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a field to the document.
    pub fn add_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add an analyzed text field.
    pub fn add_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), FieldValue::Text(text.into()));
        self
    }

    /// Add a keyword field (matched exactly, never analyzed).
    pub fn add_string(mut self, name: impl Into<String>, keyword: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), FieldValue::String(keyword.into()));
        self
    }

    pub fn add_integer(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.insert(name.into(), FieldValue::Int64(value));
        self
    }

    pub fn add_datetime(
        mut self,
        name: impl Into<String>,
        value: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.fields.insert(name.into(), FieldValue::DateTime(value));
        self
    }

    pub fn add_vector(mut self, name: impl Into<String>, vector: Vec<f32>) -> Self {
        self.fields.insert(name.into(), FieldValue::Vector(vector));
        self
    }

    /// Get a reference to a field's value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
