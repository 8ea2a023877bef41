use async_trait::async_trait;

use crate::embedding::math::mean_pool;
use crate::error::{AlexandriaError, Result};

/// Text embedding generator.
///
/// Implementations hold read-only model state and must be safe under
/// concurrent invocation. Ingestion and query time must use the same model
/// version: vectors produced by different versions are not comparable, and
/// similarity scores between them are meaningless. `model_version` exists so
/// an index can record what produced its vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a fixed-length vector.
    ///
    /// Deterministic for a fixed model version: the same text always yields
    /// the same vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Identifier of the embedding model version.
    fn model_version(&self) -> &str;

    /// Embed several texts and pool them into a single vector by
    /// elementwise mean.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<f32>> {
        if texts.is_empty() {
            return Err(AlexandriaError::invalid_argument(
                "embed_many requires at least one text",
            ));
        }
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        mean_pool(&vectors)
    }
}
