//! Persistent per-domain vector index

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use advisor_core::{
    Chunk, Domain, EmbeddingFunction, EmbeddingIdentity, Error, Result, ScoredChunk,
    cosine_similarity,
};

/// File holding the collection inside a domain directory
pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: String,
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    collection: String,
    embedding: EmbeddingIdentity,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

/// A named, persistent collection of embedded chunks for one domain
///
/// The collection name always equals the domain name, and the embedding identity
/// used at build time is stored with the vectors and checked again on load.
pub struct DomainIndex {
    domain: Domain,
    path: PathBuf,
    embedder: Arc<dyn EmbeddingFunction>,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl std::fmt::Debug for DomainIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainIndex")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("embedding", &self.embedder.identity())
            .field("len", &self.entries.len())
            .finish()
    }
}

impl DomainIndex {
    /// Embed `chunks` and write them as a fresh collection at `persist_path`
    ///
    /// Anything already at `persist_path` is removed first; the file is synced to
    /// disk before this returns.
    pub fn build(
        chunks: Vec<Chunk>,
        persist_path: &Path,
        domain: Domain,
        embedder: Arc<dyn EmbeddingFunction>,
    ) -> Result<Self> {
        let identity = embedder.identity();
        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "expected {} vectors, embedding function returned {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                if embedding.len() != identity.dimension {
                    return Err(Error::Embedding(format!(
                        "vector of length {} from {}",
                        embedding.len(),
                        identity
                    )));
                }
                Ok(IndexEntry {
                    id: format!(
                        "{:x}-{}",
                        md5::compute(chunk.source_url.as_bytes()),
                        chunk.ordinal
                    ),
                    chunk,
                    embedding,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let index = Self {
            domain,
            path: persist_path.to_path_buf(),
            embedder,
            built_at: Utc::now(),
            entries,
        };
        index.persist()?;

        info!(
            domain = %domain,
            chunks = index.entries.len(),
            path = %persist_path.display(),
            "Built domain index"
        );
        Ok(index)
    }

    /// Open a persisted collection without re-embedding
    ///
    /// Fails with [`Error::IndexNotFound`] if the directory is absent, and with a
    /// mismatch or corruption error if the stored collection cannot be trusted.
    pub fn load(
        persist_path: &Path,
        domain: Domain,
        embedder: Arc<dyn EmbeddingFunction>,
    ) -> Result<Self> {
        if !persist_path.is_dir() {
            return Err(Error::IndexNotFound {
                path: persist_path.to_path_buf(),
            });
        }

        let file = persist_path.join(INDEX_FILE);
        let content = fs::read_to_string(&file).map_err(|e| {
            Error::CorruptIndex(format!("cannot read {}: {}", file.display(), e))
        })?;
        let stored: PersistedIndex = serde_json::from_str(&content).map_err(|e| {
            Error::CorruptIndex(format!("cannot parse {}: {}", file.display(), e))
        })?;

        if stored.collection != domain.as_str() {
            return Err(Error::CollectionMismatch {
                expected: domain.as_str().to_string(),
                found: stored.collection,
            });
        }

        let expected = embedder.identity();
        if stored.embedding != expected {
            return Err(Error::EmbeddingMismatch {
                expected,
                found: stored.embedding,
            });
        }

        if let Some(bad) = stored
            .entries
            .iter()
            .find(|entry| entry.embedding.len() != expected.dimension)
        {
            return Err(Error::CorruptIndex(format!(
                "entry {} has {} dimensions, collection declares {}",
                bad.id,
                bad.embedding.len(),
                expected.dimension
            )));
        }

        debug!(domain = %domain, chunks = stored.entries.len(), "Loaded domain index");

        Ok(Self {
            domain,
            path: persist_path.to_path_buf(),
            embedder,
            built_at: stored.built_at,
            entries: stored.entries,
        })
    }

    /// Return the `k` chunks most similar to `query`, highest similarity first
    ///
    /// `k` is clamped to the index size.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }

        let query_embedding = self.embedder.embed(query)?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k.min(self.entries.len()))
            .map(|(score, entry)| ScoredChunk {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_dir_all(&self.path)?;
        }
        fs::create_dir_all(&self.path)?;

        let stored = PersistedIndex {
            collection: self.domain.as_str().to_string(),
            embedding: self.embedder.identity(),
            built_at: self.built_at,
            entries: self.entries.clone(),
        };
        let content = serde_json::to_vec(&stored)?;

        let mut file = File::create(self.path.join(INDEX_FILE))?;
        file.write_all(&content)?;
        file.sync_all()?;
        Ok(())
    }
}
