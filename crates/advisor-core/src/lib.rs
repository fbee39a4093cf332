//! Core traits and types for the FinOps migration advisor
//!
//! This crate defines the fundamental types shared by every other crate: knowledge
//! domains, chunks, conversation messages, and the error type. It also provides the
//! capability-facing seams (embedding, fetching, completion, context retrieval) so that
//! the retrieval pipeline and the dialogue driver can be tested with fakes.

pub mod completion;
pub mod context;
pub mod embedding;
pub mod entity;
pub mod error;
pub mod fetcher;
pub mod types;

#[cfg(test)]
mod tests;

pub use completion::{CompletionRequest, CompletionService, CompletionStream};
pub use context::{ContextProvider, NoContext};
pub use embedding::{EmbeddingFunction, EmbeddingIdentity, cosine_similarity};
pub use entity::{
    BatchJobs, CurrentPlatform, DataModel, DataVolume, EntityMapping, extract_entity_mapping,
};
pub use error::{Error, Result};
pub use fetcher::ContentFetcher;
pub use types::*;
