//! Raw search responses and their normalization into the public record shape.

use serde::{Deserialize, Serialize};

use crate::catalog::schema::{
    FIELD_AUTHOR, FIELD_EDITION, FIELD_GENRE, FIELD_ISBN, FIELD_PUBLICATION_DATE, FIELD_PUBLISHER,
    FIELD_SEARCH_TIMES, FIELD_SUMMARY, FIELD_TITLE,
};
use crate::data::{Document, FieldValue};
use crate::error::{AlexandriaError, Result};

/// A raw hit as returned by the catalog index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: String,
    /// Relevance attached by the index: cosine similarity for KNN queries,
    /// the index default of 1.0 for non-vector queries. Kept for every mode
    /// so the normalized shape stays uniform.
    pub score: f32,
    pub source: Document,
}

/// An ordered set of raw hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Hit>,
}

/// The stable public record shape for a surfaced book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub score: f32,
    pub title: String,
    pub publication_date: String,
    pub publisher: String,
    pub edition: i64,
    pub search_times: u64,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub summary: String,
}

/// Normalize one raw hit into a [`BookRecord`].
///
/// A hit missing any expected field fails loudly with a schema-drift error
/// naming the field. Silently omitting the key would hide ingestion bugs
/// until much later; this is deliberately stricter than the query builder's
/// tolerant handling of absent filter clauses.
pub fn normalize_hit(hit: &Hit) -> Result<BookRecord> {
    Ok(BookRecord {
        id: hit.id.clone(),
        score: hit.score,
        title: text_field(hit, FIELD_TITLE)?,
        publication_date: date_field(hit, FIELD_PUBLICATION_DATE)?,
        publisher: text_field(hit, FIELD_PUBLISHER)?,
        edition: integer_field(hit, FIELD_EDITION)?,
        search_times: counter_field(hit, FIELD_SEARCH_TIMES)?,
        author: text_field(hit, FIELD_AUTHOR)?,
        isbn: text_field(hit, FIELD_ISBN)?,
        genre: text_field(hit, FIELD_GENRE)?,
        summary: text_field(hit, FIELD_SUMMARY)?,
    })
}

/// Normalize every hit of a response, preserving order.
pub fn normalize_response(response: &SearchResponse) -> Result<Vec<BookRecord>> {
    response.hits.iter().map(normalize_hit).collect()
}

fn text_field(hit: &Hit, field: &str) -> Result<String> {
    hit.source
        .get(field)
        .and_then(FieldValue::as_text)
        .map(str::to_string)
        .ok_or_else(|| AlexandriaError::schema_drift(&hit.id, field))
}

fn integer_field(hit: &Hit, field: &str) -> Result<i64> {
    hit.source
        .get(field)
        .and_then(FieldValue::as_integer)
        .ok_or_else(|| AlexandriaError::schema_drift(&hit.id, field))
}

fn counter_field(hit: &Hit, field: &str) -> Result<u64> {
    let value = integer_field(hit, field)?;
    u64::try_from(value).map_err(|_| AlexandriaError::schema_drift(&hit.id, field))
}

fn date_field(hit: &Hit, field: &str) -> Result<String> {
    hit.source
        .get(field)
        .and_then(FieldValue::as_datetime)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .ok_or_else(|| AlexandriaError::schema_drift(&hit.id, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn full_document() -> Document {
        Document::new_with_id("b-1")
            .add_text(FIELD_TITLE, "Dune")
            .add_text(FIELD_AUTHOR, "Frank Herbert")
            .add_string(FIELD_GENRE, "SciFi")
            .add_string(FIELD_PUBLISHER, "Chilton Books")
            .add_integer(FIELD_EDITION, 1)
            .add_datetime(
                FIELD_PUBLICATION_DATE,
                Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap(),
            )
            .add_string(FIELD_ISBN, "9780441013593")
            .add_text(FIELD_SUMMARY, "A desert planet saga")
            .add_integer(FIELD_SEARCH_TIMES, 3)
    }

    #[test]
    fn normalize_maps_every_expected_field() {
        let hit = Hit {
            id: "b-1".to_string(),
            score: 0.87,
            source: full_document(),
        };
        let record = normalize_hit(&hit).unwrap();
        assert_eq!(record.id, "b-1");
        assert_eq!(record.title, "Dune");
        assert_eq!(record.publication_date, "1965-08-01");
        assert_eq!(record.edition, 1);
        assert_eq!(record.search_times, 3);
        assert_eq!(record.isbn, "9780441013593");
    }

    #[test]
    fn missing_field_fails_loudly() {
        let mut source = full_document();
        source.fields.remove(FIELD_PUBLISHER);
        let hit = Hit {
            id: "b-1".to_string(),
            score: 1.0,
            source,
        };
        match normalize_hit(&hit) {
            Err(AlexandriaError::SchemaDrift { id, field }) => {
                assert_eq!(id, "b-1");
                assert_eq!(field, FIELD_PUBLISHER);
            }
            other => panic!("expected schema drift, got {other:?}"),
        }
    }

    #[test]
    fn wrongly_typed_field_fails_loudly() {
        let mut source = full_document();
        source
            .fields
            .insert(FIELD_EDITION.to_string(), FieldValue::Text("first".into()));
        let hit = Hit {
            id: "b-1".to_string(),
            score: 1.0,
            source,
        };
        assert!(matches!(
            normalize_hit(&hit),
            Err(AlexandriaError::SchemaDrift { .. })
        ));
    }

    #[test]
    fn negative_counter_is_schema_drift() {
        let mut source = full_document();
        source
            .fields
            .insert(FIELD_SEARCH_TIMES.to_string(), FieldValue::Int64(-1));
        let hit = Hit {
            id: "b-1".to_string(),
            score: 1.0,
            source,
        };
        assert!(matches!(
            normalize_hit(&hit),
            Err(AlexandriaError::SchemaDrift { .. })
        ));
    }
}
