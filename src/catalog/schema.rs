use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::embedding::DEFAULT_DIMENSION;

/// Book document field names.
pub const FIELD_TITLE: &str = "title";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_GENRE: &str = "genre";
pub const FIELD_PUBLISHER: &str = "publisher";
pub const FIELD_EDITION: &str = "edition";
pub const FIELD_PUBLICATION_DATE: &str = "publication_date";
pub const FIELD_ISBN: &str = "isbn_13";
pub const FIELD_SUMMARY: &str = "summary";
pub const FIELD_SEARCH_TIMES: &str = "search_times";
pub const FIELD_SUMMARY_VECTOR: &str = "summary_vector";
pub const FIELD_BOOK_VECTOR: &str = "book_vector";

/// Index type of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Analyzed text, phrase-matchable.
    Text,
    /// Exact-match keyword.
    Keyword,
    Integer,
    /// Accepted input formats: `yyyy-MM-dd`, `yyyy-M-d`, epoch millis.
    Date,
    DenseVector { dims: usize },
}

/// Mapping for a catalog index: a name plus the typed fields it stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    pub fields: HashMap<String, FieldType>,
}

impl IndexSchema {
    /// The book catalog mapping.
    pub fn books(name: impl Into<String>, dims: usize) -> Self {
        let fields = HashMap::from([
            (FIELD_TITLE.to_string(), FieldType::Text),
            (FIELD_AUTHOR.to_string(), FieldType::Text),
            (FIELD_GENRE.to_string(), FieldType::Keyword),
            (FIELD_PUBLISHER.to_string(), FieldType::Keyword),
            (FIELD_EDITION.to_string(), FieldType::Integer),
            (FIELD_PUBLICATION_DATE.to_string(), FieldType::Date),
            (FIELD_ISBN.to_string(), FieldType::Keyword),
            (FIELD_SUMMARY.to_string(), FieldType::Text),
            (FIELD_SEARCH_TIMES.to_string(), FieldType::Integer),
            (
                FIELD_SUMMARY_VECTOR.to_string(),
                FieldType::DenseVector { dims },
            ),
            (
                FIELD_BOOK_VECTOR.to_string(),
                FieldType::DenseVector { dims },
            ),
        ]);
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Dimension of a dense vector field, if the field is one.
    pub fn vector_dims(&self, field: &str) -> Option<usize> {
        match self.fields.get(field) {
            Some(FieldType::DenseVector { dims }) => Some(*dims),
            _ => None,
        }
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::books("books", DEFAULT_DIMENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn books_schema_declares_both_vector_fields() {
        let schema = IndexSchema::books("books", 384);
        assert_eq!(schema.vector_dims(FIELD_SUMMARY_VECTOR), Some(384));
        assert_eq!(schema.vector_dims(FIELD_BOOK_VECTOR), Some(384));
        assert_eq!(schema.vector_dims(FIELD_TITLE), None);
        assert_eq!(schema.fields.len(), 11);
    }
}
