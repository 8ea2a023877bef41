//! Structured catalog queries and the builder for the four search modes.

use serde::{Deserialize, Serialize};

use crate::catalog::schema::{
    FIELD_AUTHOR, FIELD_BOOK_VECTOR, FIELD_EDITION, FIELD_GENRE, FIELD_ISBN, FIELD_PUBLISHER,
    FIELD_SEARCH_TIMES, FIELD_SUMMARY_VECTOR, FIELD_TITLE,
};
use crate::config::SearchSettings;

fn default_k() -> usize {
    10
}

fn default_num_candidates() -> usize {
    100
}

fn default_size() -> usize {
    10
}

/// Sort direction for popularity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Normalize a raw direction string; anything other than `asc`/`desc`
    /// becomes `Desc`.
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => SortOrder::Desc,
        }
    }
}

/// Exact-match term value: keyword or integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Keyword(String),
    Integer(i64),
}

/// One clause in a boolean AND filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterClause {
    /// Exact equality on a keyword or integer field.
    Term { field: String, value: TermValue },
    /// Contiguous token sequence match over an analyzed text field.
    MatchPhrase { field: String, phrase: String },
}

/// Scalar filter conditions for structured searches.
///
/// Every field is optional; an absent field is simply not applied as a
/// constraint, never a hard failure. Unknown keys in a deserialized payload
/// are dropped silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub author: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub edition: Option<i64>,
    pub isbn: Option<String>,
}

impl FilterSpec {
    /// Lower the present conditions into index clauses.
    ///
    /// Author and title are phrase-matched; genre, publisher, edition and
    /// ISBN are exact-matched.
    pub fn clauses(&self) -> Vec<FilterClause> {
        let mut clauses = Vec::new();
        if let Some(author) = &self.author {
            clauses.push(FilterClause::MatchPhrase {
                field: FIELD_AUTHOR.to_string(),
                phrase: author.clone(),
            });
        }
        if let Some(title) = &self.title {
            clauses.push(FilterClause::MatchPhrase {
                field: FIELD_TITLE.to_string(),
                phrase: title.clone(),
            });
        }
        if let Some(genre) = &self.genre {
            clauses.push(FilterClause::Term {
                field: FIELD_GENRE.to_string(),
                value: TermValue::Keyword(genre.clone()),
            });
        }
        if let Some(publisher) = &self.publisher {
            clauses.push(FilterClause::Term {
                field: FIELD_PUBLISHER.to_string(),
                value: TermValue::Keyword(publisher.clone()),
            });
        }
        if let Some(edition) = self.edition {
            clauses.push(FilterClause::Term {
                field: FIELD_EDITION.to_string(),
                value: TermValue::Integer(edition),
            });
        }
        if let Some(isbn) = &self.isbn {
            clauses.push(FilterClause::Term {
                field: FIELD_ISBN.to_string(),
                value: TermValue::Keyword(isbn.clone()),
            });
        }
        clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses().is_empty()
    }
}

/// A structured query against the catalog index.
///
/// Covers the wire verbs the index understands: knn with bool `must_not`
/// exclusions, bool filter, and match-all with a sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogQuery {
    /// Approximate top-k similarity over a dense vector field.
    Knn {
        field: String,
        query_vector: Vec<f32>,
        #[serde(default = "default_k")]
        k: usize,
        #[serde(default = "default_num_candidates")]
        num_candidates: usize,
        /// Document ids excluded via a bool `must_not` clause.
        #[serde(default)]
        exclude_ids: Vec<String>,
    },
    /// Boolean AND over scalar clauses.
    Filter {
        #[serde(default)]
        clauses: Vec<FilterClause>,
        #[serde(default = "default_size")]
        size: usize,
    },
    /// Match-all sorted by an integer field.
    SortedMatchAll {
        sort_field: String,
        #[serde(default)]
        order: SortOrder,
        #[serde(default = "default_size")]
        size: usize,
    },
}

/// Builds the four mutually exclusive query modes.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    settings: SearchSettings,
}

impl QueryBuilder {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    /// Semantic search: KNN on `summary_vector` with the embedded query text.
    pub fn semantic(&self, query_vector: Vec<f32>) -> CatalogQuery {
        CatalogQuery::Knn {
            field: FIELD_SUMMARY_VECTOR.to_string(),
            query_vector,
            k: self.settings.k,
            num_candidates: self.settings.num_candidates,
            exclude_ids: Vec::new(),
        }
    }

    /// Filtered search: boolean AND over whatever conditions are present.
    pub fn filtered(&self, filter: &FilterSpec) -> CatalogQuery {
        CatalogQuery::Filter {
            clauses: filter.clauses(),
            size: self.settings.page_size,
        }
    }

    /// Popularity ranking: match-all ordered by the search counter.
    pub fn popularity(&self, order: SortOrder) -> CatalogQuery {
        CatalogQuery::SortedMatchAll {
            sort_field: FIELD_SEARCH_TIMES.to_string(),
            order,
            size: self.settings.page_size,
        }
    }

    /// Personalized search: KNN on `book_vector` with the pooled history
    /// embedding, excluding already-read books.
    pub fn personalized(&self, query_vector: Vec<f32>, exclude_ids: Vec<String>) -> CatalogQuery {
        CatalogQuery::Knn {
            field: FIELD_BOOK_VECTOR.to_string(),
            query_vector,
            k: self.settings.k,
            num_candidates: self.settings.num_candidates,
            exclude_ids,
        }
    }
}
