//! # Alexandria
//!
//! A book discovery engine for Rust: semantic and structured search over a
//! catalog, personalized recommendation from reader history, and a
//! popularity feedback loop.
//!
//! ## Features
//!
//! - Four query modes: semantic, filtered, popularity, personalized
//! - Deterministic text embedding behind a pluggable [`Embedder`] trait
//! - Catalog index abstraction with bulk writes, KNN search, and atomic
//!   counter increments
//! - Strictly normalized response records
//! - All-or-nothing batch ingestion with computed vectors and a cold-start
//!   bootstrap path

// Core modules
pub mod catalog;
pub mod config;
mod data;
pub mod discovery;
pub mod embedding;
mod error;
pub mod ingest;
pub mod profile;

// Re-exports for the public API
pub use catalog::index::CatalogIndex;
pub use catalog::memory::InMemoryCatalogIndex;
pub use catalog::query::{CatalogQuery, FilterSpec, QueryBuilder, SortOrder};
pub use catalog::response::{BookRecord, Hit, SearchResponse};
pub use catalog::schema::IndexSchema;
pub use config::{DiscoveryConfig, SearchSettings};
pub use data::{Document, FieldValue};
pub use discovery::{BookDiscovery, SearchOutcome};
pub use embedding::embedder::Embedder;
pub use embedding::feature_hash::FeatureHashEmbedder;
pub use error::{AlexandriaError, Result};
#[cfg(feature = "feed-http")]
pub use ingest::HttpFeed;
pub use ingest::{BulkFeed, IngestionPipeline, JsonFeed, RawBook};
pub use profile::{InMemoryProfileStore, ProfilePatch, ProfileStore, UserProfile};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
