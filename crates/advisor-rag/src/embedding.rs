//! Hashed n-gram embedding function

use std::sync::{Arc, OnceLock};

use advisor_core::{EmbeddingFunction, EmbeddingIdentity, Result};

/// Model name recorded in every index built with [`HashedEmbedding`]
pub const HASHED_MODEL: &str = "hashed-ngram-v1";

/// Standard dimension for sentence embeddings
pub const HASHED_DIMENSION: usize = 384;

static SHARED: OnceLock<Arc<HashedEmbedding>> = OnceLock::new();

/// Process-wide embedding function shared by every domain index
///
/// The instance is constructed on first use; later calls return the same `Arc`.
pub fn shared_embedder() -> Arc<HashedEmbedding> {
    SHARED.get_or_init(|| Arc::new(HashedEmbedding::new())).clone()
}

/// Deterministic bag-of-words plus bigram embedding
///
/// Words and bigrams are hashed with md5 into a fixed number of buckets, so the
/// same text yields the same vector in every process. Vectors are L2-normalised.
#[derive(Debug, Clone)]
pub struct HashedEmbedding {
    dimension: usize,
}

impl HashedEmbedding {
    pub fn new() -> Self {
        Self {
            dimension: HASHED_DIMENSION,
        }
    }

    fn bucket_hash(token: &str) -> u64 {
        let digest = md5::compute(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.0[..8]);
        u64::from_le_bytes(bytes)
    }

    fn normalize_text(text: &str) -> String {
        text.to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect()
    }
}

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingFunction for HashedEmbedding {
    fn identity(&self) -> EmbeddingIdentity {
        EmbeddingIdentity {
            model: HASHED_MODEL.to_string(),
            dimension: self.dimension,
        }
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let normalized_text = Self::normalize_text(text);
        let words: Vec<&str> = normalized_text.split_whitespace().collect();
        let buckets = self.dimension as u64;
        let mut embedding = vec![0.0f32; self.dimension];

        for word in &words {
            let hash = Self::bucket_hash(word);
            embedding[(hash % buckets) as usize] += 1.0;

            // Secondary feature spreads longer words over a second bucket
            if word.len() > 3 {
                embedding[((hash >> 16) % buckets) as usize] += 0.5;
            }
        }

        for window in words.windows(2) {
            let bigram = format!("{} {}", window[0], window[1]);
            let hash = Self::bucket_hash(&bigram);
            embedding[(hash % buckets) as usize] += 0.3;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::cosine_similarity;

    #[test]
    fn test_embedding_is_deterministic_and_normalized() {
        let embedder = HashedEmbedding::new();
        let a = embedder.embed("Migrating Oracle PL/SQL to the lakehouse").unwrap();
        let b = embedder.embed("Migrating Oracle PL/SQL to the lakehouse").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), HASHED_DIMENSION);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let embedder = HashedEmbedding::new();
        let query = embedder.embed("serverless compute pricing").unwrap();
        let close = embedder
            .embed("Serverless compute pricing is billed per DBU")
            .unwrap();
        let far = embedder
            .embed("Unity Catalog governs table lineage")
            .unwrap();

        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let vector = HashedEmbedding::new().embed("  ...  ").unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_shared_embedder_is_constructed_once() {
        let first = shared_embedder();
        let second = shared_embedder();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.identity().model, HASHED_MODEL);
    }

    #[test]
    fn test_embed_batch_preserves_order() {
        let embedder = HashedEmbedding::new();
        let batch = embedder.embed_batch(&["dbu", "cluster"]).unwrap();
        assert_eq!(batch[0], embedder.embed("dbu").unwrap());
        assert_eq!(batch[1], embedder.embed("cluster").unwrap());
    }
}
