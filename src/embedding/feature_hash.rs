use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::embedding::embedder::Embedder;
use crate::embedding::math::l2_normalize;
use crate::error::{AlexandriaError, Result};

/// Default embedding dimension, matching the catalog's dense vector fields.
pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic feature-hashing embedder.
///
/// Hashes unicode word tokens and adjacent-token bigrams into a fixed number
/// of signed buckets (FNV-1a), then l2-normalizes. No model weights, no
/// interior mutability: the same text always maps to the same vector, and
/// concurrent use is trivially safe.
///
/// The embedding of empty text is the zero vector; cosine similarity against
/// it is 0.
#[derive(Debug, Clone)]
pub struct FeatureHashEmbedder {
    dimension: usize,
    version: String,
}

impl FeatureHashEmbedder {
    /// Create an embedder with the default 384-dim output.
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            version: format!("feature-hash-v1-{DEFAULT_DIMENSION}"),
        }
    }

    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AlexandriaError::invalid_argument(
                "embedding dimension must be greater than zero",
            ));
        }
        Ok(Self {
            dimension,
            version: format!("feature-hash-v1-{dimension}"),
        })
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        bytes.iter().fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
        })
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str) {
        let hash = Self::fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimension as u64) as usize;
        // High bit decides the sign so colliding features can cancel instead
        // of always reinforcing each other.
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

impl Default for FeatureHashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for FeatureHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens: Vec<String> = text
            .unicode_words()
            .map(|word| word.to_lowercase())
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        for token in &tokens {
            self.accumulate(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_version(&self) -> &str {
        &self.version
    }
}
