//! The discovery facade: four query modes, popularity feedback, and
//! personalized recommendation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::index::CatalogIndex;
use crate::catalog::query::{CatalogQuery, FilterSpec, QueryBuilder, SortOrder};
use crate::catalog::response::{BookRecord, normalize_response};
use crate::catalog::schema::FIELD_SEARCH_TIMES;
use crate::config::DiscoveryConfig;
use crate::embedding::embedder::Embedder;
use crate::error::{AlexandriaError, Result};
use crate::ingest::{BulkFeed, IngestionPipeline, RawBook};
use crate::profile::ProfileStore;

/// Outcome of a catalog query.
///
/// `NoMatches` is an explicit sentinel so callers never conflate a valid
/// empty result with an error; `Found` always carries at least one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "results", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(Vec<BookRecord>),
    NoMatches,
}

impl SearchOutcome {
    fn from_records(records: Vec<BookRecord>) -> Self {
        if records.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Found(records)
        }
    }

    /// The records, empty for `NoMatches`.
    pub fn records(&self) -> &[BookRecord] {
        match self {
            SearchOutcome::Found(records) => records,
            SearchOutcome::NoMatches => &[],
        }
    }

    pub fn is_no_matches(&self) -> bool {
        matches!(self, SearchOutcome::NoMatches)
    }
}

/// Book discovery service.
///
/// Explicitly constructed from its collaborators (embedding generator,
/// catalog index, profile store) so tests can substitute fakes and no
/// hidden global state survives. Queries are stateless beyond shared access
/// to those collaborators.
pub struct BookDiscovery {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn CatalogIndex>,
    profiles: Arc<dyn ProfileStore>,
    queries: QueryBuilder,
    pipeline: IngestionPipeline,
}

impl BookDiscovery {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn CatalogIndex>,
        profiles: Arc<dyn ProfileStore>,
        config: DiscoveryConfig,
    ) -> Self {
        let pipeline =
            IngestionPipeline::new(embedder.clone(), index.clone(), config.index_schema());
        Self {
            embedder,
            index,
            profiles,
            queries: QueryBuilder::new(config.search),
            pipeline,
        }
    }

    /// Semantic search over book summaries.
    pub async fn semantic(&self, query_text: &str) -> Result<SearchOutcome> {
        if query_text.trim().is_empty() {
            return Err(AlexandriaError::invalid_argument(
                "query text must not be empty",
            ));
        }
        let vector = self.embedder.embed(query_text).await?;
        let query = self.queries.semantic(vector);
        self.run_with_feedback(&query).await
    }

    /// Structured search: boolean AND over whatever conditions are present.
    pub async fn filtered(&self, filter: &FilterSpec) -> Result<SearchOutcome> {
        let query = self.queries.filtered(filter);
        self.run_with_feedback(&query).await
    }

    /// Popularity ranking: match-all ordered by the search counter.
    ///
    /// Exempt from feedback: incrementing `search_times` while sorting by it
    /// would lock in the current ranking.
    pub async fn popularity(&self, order: SortOrder) -> Result<SearchOutcome> {
        let query = self.queries.popularity(order);
        self.run(&query).await
    }

    /// Personalized recommendation from the reader's history.
    ///
    /// The profile is fetched once. A missing profile is treated identically
    /// to an empty history and degrades to the popularity ranking; a new
    /// reader is a normal case, not an error.
    pub async fn recommend(&self, email: &str) -> Result<SearchOutcome> {
        let profile = self.profiles.find(email).await?;
        let (history, read_books) = match &profile {
            Some(profile) => (
                profile.search_history.as_slice(),
                profile.read_books.clone(),
            ),
            None => (&[][..], Vec::new()),
        };

        if history.is_empty() {
            log::debug!("no search history for '{email}', serving popularity ranking");
            return self.popularity(SortOrder::Desc).await;
        }

        let vector = self.embedder.embed_many(history).await?;
        let query = self.queries.personalized(vector, read_books);
        self.run_with_feedback(&query).await
    }

    /// Ingest one batch of raw payloads; aggregate outcome per batch.
    pub async fn ingest(&self, batch: Vec<RawBook>) -> Result<usize> {
        self.pipeline.ingest(batch).await
    }

    /// Cold-start: ensure the mapping, then load the one-shot feed.
    pub async fn bootstrap(&self, feed: &dyn BulkFeed) -> Result<usize> {
        self.pipeline.bootstrap(feed).await
    }

    async fn run(&self, query: &CatalogQuery) -> Result<SearchOutcome> {
        let response = self.index.search(query).await?;
        let records = normalize_response(&response)?;
        Ok(SearchOutcome::from_records(records))
    }

    /// Run a query and feed every surfaced document back into its
    /// popularity counter, by exactly one, through the index's atomic
    /// increment.
    async fn run_with_feedback(&self, query: &CatalogQuery) -> Result<SearchOutcome> {
        let outcome = self.run(query).await?;
        if let SearchOutcome::Found(records) = &outcome {
            for record in records {
                self.index.increment(&record.id, FIELD_SEARCH_TIMES).await?;
            }
        }
        Ok(outcome)
    }
}
