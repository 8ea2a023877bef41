//! In-memory catalog index.
//!
//! Exact-scan implementation of [`CatalogIndex`]: brute-force cosine KNN,
//! term and phrase matching, counter increments under the write lock. Used by
//! the test suite and for embedded deployments; a remote index client
//! implements the same trait.

use std::collections::HashSet;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::catalog::index::CatalogIndex;
use crate::catalog::query::{CatalogQuery, FilterClause, SortOrder, TermValue};
use crate::catalog::response::{Hit, SearchResponse};
use crate::catalog::schema::IndexSchema;
use crate::data::{Document, FieldValue};
use crate::embedding::math::cosine_similarity;
use crate::error::{AlexandriaError, Result};

/// Score attached to hits of non-vector queries.
const DEFAULT_SCORE: f32 = 1.0;

#[derive(Default)]
struct IndexState {
    schema: Option<IndexSchema>,
    docs: AHashMap<String, Document>,
    /// Ids in insertion order, for deterministic iteration and tie-breaks.
    insertion: Vec<String>,
}

pub struct InMemoryCatalogIndex {
    state: RwLock<IndexState>,
}

impl InMemoryCatalogIndex {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.state.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored document by id. Test and fixture helper, not part of
    /// the [`CatalogIndex`] contract.
    pub fn document(&self, id: &str) -> Option<Document> {
        self.state.read().docs.get(id).cloned()
    }

    fn knn(
        state: &IndexState,
        field: &str,
        query_vector: &[f32],
        k: usize,
        num_candidates: usize,
        exclude_ids: &[String],
    ) -> Result<Vec<Hit>> {
        if query_vector.is_empty() {
            return Err(AlexandriaError::invalid_argument(
                "knn query vector must not be empty",
            ));
        }
        if let Some(schema) = &state.schema {
            if let Some(dims) = schema.vector_dims(field) {
                if query_vector.len() != dims {
                    return Err(AlexandriaError::invalid_argument(format!(
                        "knn query vector has dimension {}, field '{field}' expects {dims}",
                        query_vector.len()
                    )));
                }
            }
        }

        let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();

        let mut scored: Vec<Hit> = Vec::new();
        for id in &state.insertion {
            if excluded.contains(id.as_str()) {
                continue;
            }
            let Some(doc) = state.docs.get(id) else {
                continue;
            };
            let Some(vector) = doc.get(field).and_then(FieldValue::as_vector_ref) else {
                continue;
            };
            scored.push(Hit {
                id: id.clone(),
                score: cosine_similarity(query_vector, vector),
                source: doc.clone(),
            });
        }

        // Exact scan: the candidate pool only caps how many survivors feed
        // the final top-k, it does not make the search approximate.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k.min(num_candidates));
        Ok(scored)
    }

    fn filter(state: &IndexState, clauses: &[FilterClause], size: usize) -> Vec<Hit> {
        let mut hits = Vec::new();
        for id in &state.insertion {
            let Some(doc) = state.docs.get(id) else {
                continue;
            };
            if clauses.iter().all(|clause| clause_matches(doc, clause)) {
                hits.push(Hit {
                    id: id.clone(),
                    score: DEFAULT_SCORE,
                    source: doc.clone(),
                });
                if hits.len() == size {
                    break;
                }
            }
        }
        hits
    }

    fn sorted_match_all(
        state: &IndexState,
        sort_field: &str,
        order: SortOrder,
        size: usize,
    ) -> Vec<Hit> {
        let mut hits: Vec<(i64, Hit)> = state
            .insertion
            .iter()
            .filter_map(|id| state.docs.get(id).map(|doc| (id, doc)))
            .map(|(id, doc)| {
                // A document without the sort field sorts as zero.
                let key = doc.get(sort_field).and_then(FieldValue::as_integer).unwrap_or(0);
                (
                    key,
                    Hit {
                        id: id.clone(),
                        score: DEFAULT_SCORE,
                        source: doc.clone(),
                    },
                )
            })
            .collect();

        // Stable sort keeps insertion order among equal keys.
        match order {
            SortOrder::Asc => hits.sort_by_key(|(key, _)| *key),
            SortOrder::Desc => hits.sort_by_key(|(key, _)| std::cmp::Reverse(*key)),
        }
        hits.truncate(size);
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

impl Default for InMemoryCatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogIndex for InMemoryCatalogIndex {
    async fn ensure_schema(&self, schema: &IndexSchema) -> Result<()> {
        let mut state = self.state.write();
        if state.schema.is_none() {
            log::info!("created index mapping '{}'", schema.name);
            state.schema = Some(schema.clone());
        } else {
            log::debug!("index mapping '{}' already exists", schema.name);
        }
        Ok(())
    }

    async fn bulk_upsert(&self, documents: Vec<Document>) -> Result<()> {
        let mut state = self.state.write();
        let Some(schema) = state.schema.clone() else {
            return Err(AlexandriaError::index_unavailable(
                "bulk write against an index with no mapping; run ensure_schema first",
            ));
        };

        // Validate the whole batch before touching the store so a rejected
        // batch writes nothing.
        for doc in &documents {
            for (name, value) in &doc.fields {
                if let (Some(dims), Some(vector)) =
                    (schema.vector_dims(name), value.as_vector_ref())
                {
                    if vector.len() != dims {
                        return Err(AlexandriaError::invalid_argument(format!(
                            "field '{name}' has dimension {}, mapping expects {dims}",
                            vector.len()
                        )));
                    }
                }
            }
        }

        let count = documents.len();
        for doc in documents {
            let id = doc
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            if !state.docs.contains_key(&id) {
                state.insertion.push(id.clone());
            }
            state.docs.insert(id, doc);
        }
        log::debug!("bulk upsert wrote {count} documents");
        Ok(())
    }

    async fn search(&self, query: &CatalogQuery) -> Result<SearchResponse> {
        let state = self.state.read();
        if state.schema.is_none() {
            return Err(AlexandriaError::index_unavailable(
                "search against an index with no mapping; run ensure_schema first",
            ));
        }

        let hits = match query {
            CatalogQuery::Knn {
                field,
                query_vector,
                k,
                num_candidates,
                exclude_ids,
            } => Self::knn(&state, field, query_vector, *k, *num_candidates, exclude_ids)?,
            CatalogQuery::Filter { clauses, size } => Self::filter(&state, clauses, *size),
            CatalogQuery::SortedMatchAll {
                sort_field,
                order,
                size,
            } => Self::sorted_match_all(&state, sort_field, *order, *size),
        };
        Ok(SearchResponse { hits })
    }

    async fn increment(&self, id: &str, field: &str) -> Result<()> {
        let mut state = self.state.write();
        let doc = state
            .docs
            .get_mut(id)
            .ok_or_else(|| AlexandriaError::not_found(format!("document '{id}'")))?;
        match doc.fields.get_mut(field) {
            Some(FieldValue::Int64(value)) => {
                *value += 1;
                Ok(())
            }
            _ => Err(AlexandriaError::invalid_argument(format!(
                "field '{field}' of document '{id}' is not an integer counter",
            ))),
        }
    }
}

fn clause_matches(doc: &Document, clause: &FilterClause) -> bool {
    match clause {
        FilterClause::Term {
            field,
            value: TermValue::Keyword(expected),
        } => doc.get(field).and_then(FieldValue::as_text) == Some(expected.as_str()),
        FilterClause::Term {
            field,
            value: TermValue::Integer(expected),
        } => doc.get(field).and_then(FieldValue::as_integer) == Some(*expected),
        FilterClause::MatchPhrase { field, phrase } => doc
            .get(field)
            .and_then(FieldValue::as_text)
            .is_some_and(|text| phrase_matches(text, phrase)),
    }
}

/// Case-insensitive contiguous token sequence match.
fn phrase_matches(text: &str, phrase: &str) -> bool {
    let needle = tokens(phrase);
    if needle.is_empty() {
        return false;
    }
    let hay = tokens(text);
    hay.windows(needle.len()).any(|window| window == needle.as_slice())
}

fn tokens(text: &str) -> Vec<String> {
    text.unicode_words().map(|word| word.to_lowercase()).collect()
}
