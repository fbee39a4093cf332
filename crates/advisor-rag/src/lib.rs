//! Multi-domain retrieval for the FinOps migration advisor
//!
//! Documentation pages are fetched per domain, split into overlapping chunks,
//! embedded and persisted as one index per domain. At query time a keyword
//! classifier picks the domain(s) to search and the results are formatted as
//! tagged references.

pub mod chunker;
pub mod classifier;
pub mod domain_index;
pub mod embedding;
pub mod fetcher;
pub mod knowledge_base;
pub mod sources;


/// Chunks retrieved per query when the caller does not say otherwise
pub const DEFAULT_CONTEXT_K: usize = 3;

pub use chunker::{Chunker, ChunkingConfig};
pub use classifier::{DomainClassifier, DomainScore};
pub use domain_index::DomainIndex;
pub use embedding::{HASHED_DIMENSION, HASHED_MODEL, HashedEmbedding, shared_embedder};
pub use fetcher::HttpFetcher;
pub use knowledge_base::{
    BuildEvent, BuildReport, DomainBuildStats, DomainStatus, KnowledgeBase, KnowledgeBaseConfig,
    KnowledgeBaseContext, format_references, source_display,
};
pub use sources::DomainSources;

// Re-export core types for convenience
pub use advisor_core::{Chunk, Domain, DomainSelector, Error, Result, ScoredChunk};
