//! Content fetcher trait

use async_trait::async_trait;

/// Trait for content fetchers
///
/// A fetch never fails loudly: any network, status or parse problem yields an
/// empty string, which callers treat as "skip this document".
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Retrieve the normalized text content behind `url`
    async fn fetch(&self, url: &str) -> String;
}
