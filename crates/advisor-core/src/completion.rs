//! Completion service trait and request types

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::{Message, Result};

/// Incremental text fragments produced by a completion service
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl CompletionRequest {
    /// Create a streaming request with the advisor's default decoding parameters
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: 0.7,
            max_tokens: 2048,
            stream: true,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for completion services (e.g., Groq, any OpenAI-compatible endpoint)
///
/// The returned stream yields text fragments in order and ends when the producer
/// signals completion. An `Err` item means the transport failed mid-flight.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Start a completion and return its fragment stream
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionStream>;

    /// Model identifier used for requests
    fn model_id(&self) -> &str;
}
