//! Ingestion pipeline: payload validation, vector computation, bulk writes,
//! and the cold-start bootstrap path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::index::CatalogIndex;
use crate::catalog::schema::{
    FIELD_AUTHOR, FIELD_BOOK_VECTOR, FIELD_EDITION, FIELD_GENRE, FIELD_ISBN,
    FIELD_PUBLICATION_DATE, FIELD_PUBLISHER, FIELD_SEARCH_TIMES, FIELD_SUMMARY,
    FIELD_SUMMARY_VECTOR, FIELD_TITLE, IndexSchema,
};
use crate::data::Document;
use crate::embedding::embedder::Embedder;
use crate::error::{AlexandriaError, Result};

/// A raw ingestion payload.
///
/// Every field is optional at the serde level so a malformed payload is
/// rejected by validation with a field-specific reason instead of a
/// deserialization failure. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBook {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub edition: Option<i64>,
    #[serde(default)]
    pub publication_date: Option<PublicationDate>,
    #[serde(default, rename = "isbn_13", alias = "ISBN-13")]
    pub isbn_13: Option<String>,
}

impl RawBook {
    /// A payload with the required fields set.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            genre: Some(genre.into()),
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_edition(mut self, edition: i64) -> Self {
        self.edition = Some(edition);
        self
    }

    pub fn with_publication_date(mut self, date: impl Into<String>) -> Self {
        self.publication_date = Some(PublicationDate::Text(date.into()));
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn_13 = Some(isbn.into());
        self
    }
}

/// Publication date input: a date string or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationDate {
    EpochMillis(i64),
    Text(String),
}

impl PublicationDate {
    /// Parse into a UTC datetime.
    ///
    /// Accepted text format is `year-month-day` with or without zero
    /// padding (`2024-05-01`, `2024-5-1`).
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        match self {
            PublicationDate::EpochMillis(millis) => Utc
                .timestamp_millis_opt(*millis)
                .single()
                .ok_or_else(|| {
                    AlexandriaError::invalid_argument(format!(
                        "epoch millis {millis} is out of range"
                    ))
                }),
            PublicationDate::Text(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    AlexandriaError::invalid_argument(format!(
                        "unrecognized date '{raw}', expected year-month-day or epoch millis"
                    ))
                })?;
                let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                    AlexandriaError::internal(format!("no midnight for date '{raw}'"))
                })?;
                Ok(midnight.and_utc())
            }
        }
    }
}

/// A payload that passed validation, with required fields borrowed out.
#[derive(Debug)]
struct ValidBook<'a> {
    id: Option<&'a str>,
    title: &'a str,
    author: &'a str,
    genre: &'a str,
    summary: &'a str,
    publisher: Option<&'a str>,
    edition: Option<i64>,
    publication_date: Option<DateTime<Utc>>,
    isbn_13: Option<&'a str>,
}

fn required_text<'a>(
    position: usize,
    field: &str,
    value: &'a Option<String>,
) -> Result<&'a str> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AlexandriaError::validation(
            field,
            format!("payload at position {position} is missing a non-empty '{field}'"),
        )),
    }
}

fn validate(position: usize, book: &RawBook) -> Result<ValidBook<'_>> {
    let title = required_text(position, FIELD_TITLE, &book.title)?;
    let author = required_text(position, FIELD_AUTHOR, &book.author)?;
    let genre = required_text(position, FIELD_GENRE, &book.genre)?;
    let summary = required_text(position, FIELD_SUMMARY, &book.summary)?;

    let publication_date = match &book.publication_date {
        Some(raw) => Some(raw.to_datetime().map_err(|err| {
            AlexandriaError::validation(
                FIELD_PUBLICATION_DATE,
                format!("payload at position {position}: {err}"),
            )
        })?),
        None => None,
    };

    Ok(ValidBook {
        id: book.id.as_deref(),
        title,
        author,
        genre,
        summary,
        publisher: book.publisher.as_deref(),
        edition: book.edition,
        publication_date,
        isbn_13: book.isbn_13.as_deref(),
    })
}

/// One-shot source of the initial corpus.
#[async_trait]
pub trait BulkFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawBook>>;
}

/// Bulk feed backed by an in-memory JSON array.
pub struct JsonFeed {
    raw: String,
}

impl JsonFeed {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|err| {
            AlexandriaError::config(format!(
                "failed to read bulk feed {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::new(raw))
    }
}

#[async_trait]
impl BulkFeed for JsonFeed {
    async fn fetch(&self) -> Result<Vec<RawBook>> {
        serde_json::from_str(&self.raw)
            .map_err(|err| AlexandriaError::invalid_argument(format!("malformed bulk feed: {err}")))
    }
}

/// Bulk feed fetched over HTTP.
#[cfg(feature = "feed-http")]
pub struct HttpFeed {
    url: String,
}

#[cfg(feature = "feed-http")]
impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "feed-http")]
#[async_trait]
impl BulkFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<RawBook>> {
        let response = reqwest::get(&self.url).await.map_err(|err| {
            AlexandriaError::internal(format!("bulk feed request to {} failed: {err}", self.url))
        })?;
        response.json().await.map_err(|err| {
            AlexandriaError::invalid_argument(format!("malformed bulk feed: {err}"))
        })
    }
}

/// Validates raw payloads, computes their vectors, and writes batches.
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn CatalogIndex>,
    schema: IndexSchema,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn CatalogIndex>,
        schema: IndexSchema,
    ) -> Self {
        Self {
            embedder,
            index,
            schema,
        }
    }

    /// Ingest one batch; returns the number of documents written.
    ///
    /// All-or-nothing: every payload is validated before any embedding or
    /// write happens, and the first offending payload rejects the whole
    /// batch. Valid batches go to the index as a single bulk call.
    pub async fn ingest(&self, batch: Vec<RawBook>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut validated = Vec::with_capacity(batch.len());
        for (position, book) in batch.iter().enumerate() {
            validated.push(validate(position, book)?);
        }

        let mut documents = Vec::with_capacity(validated.len());
        for book in &validated {
            documents.push(self.to_document(book).await?);
        }

        let count = documents.len();
        self.index.bulk_upsert(documents).await?;
        log::info!("ingested batch of {count} books");
        Ok(count)
    }

    /// Cold-start path: ensure the index mapping exists, then drain the
    /// one-shot feed through the regular pipeline.
    ///
    /// Independently invocable so tests can populate a fixture index without
    /// running request serving. Intended to run once, single-threaded,
    /// before steady-state traffic.
    pub async fn bootstrap(&self, feed: &dyn BulkFeed) -> Result<usize> {
        self.index.ensure_schema(&self.schema).await?;
        let batch = feed.fetch().await?;
        if batch.is_empty() {
            log::info!("bootstrap feed is empty; index mapping ensured");
            return Ok(0);
        }
        let count = self.ingest(batch).await?;
        log::info!("bootstrap loaded {count} books");
        Ok(count)
    }

    async fn to_document(&self, book: &ValidBook<'_>) -> Result<Document> {
        let summary_vector = self.embedder.embed(book.summary).await?;
        let book_vector = self
            .embedder
            .embed_many(&[
                book.author.to_string(),
                book.genre.to_string(),
                book.title.to_string(),
                book.summary.to_string(),
            ])
            .await?;

        let mut doc = Document::new()
            .add_text(FIELD_TITLE, book.title)
            .add_text(FIELD_AUTHOR, book.author)
            .add_string(FIELD_GENRE, book.genre)
            .add_text(FIELD_SUMMARY, book.summary)
            .add_integer(FIELD_SEARCH_TIMES, 0)
            .add_vector(FIELD_SUMMARY_VECTOR, summary_vector)
            .add_vector(FIELD_BOOK_VECTOR, book_vector);

        if let Some(id) = book.id {
            doc = doc.set_id(id);
        }
        if let Some(publisher) = book.publisher {
            doc = doc.add_string(FIELD_PUBLISHER, publisher);
        }
        if let Some(edition) = book.edition {
            doc = doc.add_integer(FIELD_EDITION, edition);
        }
        if let Some(date) = book.publication_date {
            doc = doc.add_datetime(FIELD_PUBLICATION_DATE, date);
        }
        if let Some(isbn) = book.isbn_13 {
            doc = doc.add_string(FIELD_ISBN, isbn);
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_accepts_padded_and_unpadded_forms() {
        let padded = PublicationDate::Text("2024-05-01".to_string());
        let unpadded = PublicationDate::Text("2024-5-1".to_string());
        assert_eq!(
            padded.to_datetime().unwrap(),
            unpadded.to_datetime().unwrap()
        );
    }

    #[test]
    fn date_accepts_epoch_millis() {
        let date = PublicationDate::EpochMillis(0);
        assert_eq!(
            date.to_datetime().unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn date_rejects_other_formats() {
        let slashed = PublicationDate::Text("05/01/2024".to_string());
        assert!(slashed.to_datetime().is_err());
    }

    #[test]
    fn validation_names_the_offending_field() {
        let book = RawBook {
            title: Some("Dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            genre: Some("  ".to_string()),
            summary: Some("A desert planet".to_string()),
            ..RawBook::default()
        };
        match validate(3, &book) {
            Err(AlexandriaError::Validation { field, message }) => {
                assert_eq!(field, FIELD_GENRE);
                assert!(message.contains("position 3"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn json_feed_parses_payloads_with_wire_isbn_key() {
        let feed = JsonFeed::new(
            r#"[{"title":"Dune","author":"Frank Herbert","genre":"SciFi",
                "summary":"A desert planet saga","ISBN-13":"9780441013593",
                "format":"paperback"}]"#,
        );
        let books = tokio_block_on(feed.fetch()).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].isbn_13.as_deref(), Some("9780441013593"));
    }

    #[test]
    fn json_feed_rejects_malformed_input() {
        let feed = JsonFeed::new("{not json");
        assert!(tokio_block_on(feed.fetch()).is_err());
    }

    fn tokio_block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }
}
