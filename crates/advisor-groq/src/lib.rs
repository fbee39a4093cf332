//! Groq integration for the FinOps migration advisor
//!
//! This crate provides the Groq implementation of the CompletionService trait,
//! speaking the OpenAI-compatible chat-completions protocol with SSE streaming.

mod client;
mod config;


pub use client::{GroqClient, SseLine, parse_sse_line, sse_fragments};
pub use config::{DEFAULT_API_URL, DEFAULT_MODEL, GroqConfig, MISSING_KEY_HELP};

// Re-export core types for convenience
pub use advisor_core::{CompletionRequest, CompletionService, CompletionStream, Error, Result};
