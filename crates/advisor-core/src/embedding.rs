//! Embedding function trait and identity

use serde::{Deserialize, Serialize};

use crate::Result;

/// Identifies an embedding function: the model and the vector dimensionality
///
/// Stored next to every persisted index so a loader can refuse vectors produced
/// by a different function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddingIdentity {
    pub model: String,
    pub dimension: usize,
}

impl std::fmt::Display for EmbeddingIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} dims)", self.model, self.dimension)
    }
}

/// Trait for embedding functions
///
/// Implementations must be deterministic: the same text always maps to the same
/// vector, and every vector has `identity().dimension` components.
pub trait EmbeddingFunction: Send + Sync {
    /// Model name and dimensionality of the produced vectors
    fn identity(&self) -> EmbeddingIdentity;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, preserving order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Cosine similarity between two vectors, 0.0 when lengths differ or a vector is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
