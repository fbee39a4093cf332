//! Groq chat-completions client

use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use advisor_core::{CompletionRequest, CompletionService, CompletionStream, Error, Message, Result};

use crate::config::GroqConfig;

/// Groq client for the OpenAI-compatible chat-completions endpoint
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize, Default)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<MessageContent>,
    #[serde(default)]
    message: Option<MessageContent>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ChatPayload {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl ChatPayload {
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.or(choice.message))
            .and_then(|content| content.content)
    }
}

/// One parsed line of a server-sent event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// A text delta to forward
    Fragment(String),
    /// The `[DONE]` terminator
    Done,
    /// An error payload sent in place of a delta
    Error(String),
    /// Blank lines, comments, other fields and empty deltas
    Skip,
}

/// Parse one line of a chat-completions SSE stream
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Skip;
    }
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };

    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatPayload>(data) {
        Ok(payload) => {
            if let Some(error) = payload.error {
                return SseLine::Error(error.message);
            }
            match payload.first_content() {
                Some(content) if !content.is_empty() => SseLine::Fragment(content),
                _ => SseLine::Skip,
            }
        }
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable stream line");
            SseLine::Skip
        }
    }
}

struct SseState<B, E> {
    bytes: BoxStream<'static, std::result::Result<B, E>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl<B, E> SseState<B, E> {
    fn handle_line(&mut self, line: &[u8]) {
        match parse_sse_line(&String::from_utf8_lossy(line)) {
            SseLine::Fragment(text) => self.pending.push_back(Ok(text)),
            SseLine::Done => self.finished = true,
            SseLine::Error(message) => {
                self.pending.push_back(Err(Error::Completion(message)));
                self.finished = true;
            }
            SseLine::Skip => {}
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line);
            if self.finished {
                self.buffer.clear();
                break;
            }
        }
    }
}

/// Turn a raw byte stream of server-sent events into text fragments
///
/// Lines may be split across network chunks at any byte. The stream ends at
/// `[DONE]` or when the body ends; a transport error or an error payload is
/// yielded once as the last item.
pub fn sse_fragments<S, B, E>(bytes: S) -> CompletionStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        bytes: bytes.boxed(),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(chunk.as_ref());
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Completion stream interrupted");
                    state.pending.push_back(Err(Error::Network(e.to_string())));
                    state.finished = true;
                }
                None => {
                    let rest = std::mem::take(&mut state.buffer);
                    if !rest.is_empty() {
                        state.handle_line(&rest);
                    }
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

impl GroqClient {
    /// Create a new Groq client from configuration
    pub fn new(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Groq client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GroqConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for completions
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn config(&self) -> &GroqConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionService for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionStream> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        };

        debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.config.chat_completions_url())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Completion(format!(
                "Groq API request failed with status {}: {}",
                status, error_text
            )));
        }

        if request.stream {
            return Ok(sse_fragments(response.bytes_stream()));
        }

        let payload: ChatPayload = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        if let Some(error) = payload.error {
            return Err(Error::Completion(error.message));
        }
        let content = payload.first_content().unwrap_or_default();
        Ok(stream::iter(vec![Ok(content)]).boxed())
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
