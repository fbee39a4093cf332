//! Context provider trait

use async_trait::async_trait;

/// Supplies retrieved reference text for a user query
///
/// An empty string means "no augmentation"; it is never an error.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn relevant_context(&self, query: &str) -> String;
}

/// A provider that never returns context, used when no knowledge base is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContext;

#[async_trait]
impl ContextProvider for NoContext {
    async fn relevant_context(&self, _query: &str) -> String {
        String::new()
    }
}
