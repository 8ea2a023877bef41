use async_trait::async_trait;

use crate::catalog::query::CatalogQuery;
use crate::catalog::response::SearchResponse;
use crate::catalog::schema::IndexSchema;
use crate::data::Document;
use crate::error::Result;

/// Catalog index abstraction.
///
/// Implementations provide document-level atomicity for single-field
/// increments and per-batch atomicity for bulk writes. Callers never take an
/// application-level lock around these operations, and a blocking call blocks
/// its caller: no timeout or retry is modeled here.
#[async_trait]
pub trait CatalogIndex: Send + Sync {
    /// Create the index mapping if it does not exist yet.
    ///
    /// Idempotent. The check-then-create is not atomic; it is only safe under
    /// the single-writer-at-startup assumption the bootstrap path provides.
    async fn ensure_schema(&self, schema: &IndexSchema) -> Result<()>;

    /// Write a batch of documents as a single call.
    ///
    /// Reports one aggregate outcome for the whole batch; there is no
    /// partial-success signal even though partial writes may physically
    /// occur in a remote implementation.
    async fn bulk_upsert(&self, documents: Vec<Document>) -> Result<()>;

    /// Execute a structured query.
    async fn search(&self, query: &CatalogQuery) -> Result<SearchResponse>;

    /// Atomically increment an integer field of one document, server-side.
    ///
    /// Never implemented as a caller-side read-modify-write: concurrent
    /// identical queries would lose updates.
    async fn increment(&self, id: &str, field: &str) -> Result<()>;
}
