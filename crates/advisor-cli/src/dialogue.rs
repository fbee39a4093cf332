//! Dialogue driver: assembles requests, streams replies and keeps the conversation log

use futures::StreamExt;
use tracing::{debug, warn};

use advisor_core::{
    CompletionRequest, CompletionService, ContextProvider, EntityMapping, Message, Role,
    extract_entity_mapping,
};

use crate::prompts::{SYSTEM_PROMPT, context_message};
use crate::settings::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// The persisted conversation; the first message is always the system instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    /// Everything after the leading system instruction
    pub fn history(&self) -> &[Message] {
        &self.messages[1..]
    }

    /// Number of messages after the system instruction
    pub fn history_len(&self) -> usize {
        self.messages.len() - 1
    }

    /// Append one completed exchange: the user message, then the assistant reply
    pub fn record_exchange(&mut self, utterance: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(Message::user(utterance));
        self.messages.push(Message::assistant(reply));
    }

    /// Drop the history, keeping the system instruction
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(SYSTEM_PROMPT)
    }
}

/// Build the exact message sequence for one request
///
/// The order is: system instruction, prior history, the retrieved context (only
/// when non-empty) as a second system message, then the unchanged utterance.
pub fn assemble_messages(conversation: &Conversation, context: &str, utterance: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(conversation.messages().len() + 2);
    messages.push(conversation.system().clone());
    messages.extend(
        conversation
            .history()
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned(),
    );
    if !context.trim().is_empty() {
        messages.push(Message::system(context_message(context)));
    }
    messages.push(Message::user(utterance));
    messages
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// The text recorded as the assistant message
    pub text: String,
    pub used_context: bool,
    /// Whether the reply carried a new entity mapping
    pub mapping_updated: bool,
    /// Whether the completion failed to start or broke off mid-stream
    pub failed: bool,
}

/// Drives a conversation against a completion service with optional retrieval
pub struct DialogueDriver<C: CompletionService, P: ContextProvider> {
    completion: C,
    context: P,
    conversation: Conversation,
    temperature: f32,
    max_tokens: u32,
    latest_mapping: Option<EntityMapping>,
}

impl<C: CompletionService, P: ContextProvider> DialogueDriver<C, P> {
    pub fn new(completion: C, context: P) -> Self {
        Self {
            completion,
            context,
            conversation: Conversation::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            latest_mapping: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.conversation = Conversation::new(system_prompt);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Most recent entity mapping found in an assistant reply
    pub fn latest_mapping(&self) -> Option<&EntityMapping> {
        self.latest_mapping.as_ref()
    }

    pub fn reset(&mut self) {
        self.conversation.reset();
        self.latest_mapping = None;
    }

    /// Answer one utterance, forwarding fragments to `on_fragment` as they arrive
    ///
    /// Completion failures never escape: a failure to start becomes the reply
    /// `Error: ...`, and a mid-stream failure keeps the partial text and appends
    /// an `[Error: ...]` marker. The log is only appended once the reply is final.
    pub async fn respond(&mut self, utterance: &str, mut on_fragment: impl FnMut(&str)) -> Reply {
        let context = self.context.relevant_context(utterance).await;
        let used_context = !context.trim().is_empty();
        debug!(used_context, context_chars = context.len(), "Assembled request");

        let messages = assemble_messages(&self.conversation, &context, utterance);
        let request = CompletionRequest::new(messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let mut text = String::new();
        let mut failed = false;
        match self.completion.complete(&request).await {
            Ok(mut stream) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(fragment) => {
                            on_fragment(&fragment);
                            text.push_str(&fragment);
                        }
                        Err(e) => {
                            warn!(error = %e, "Completion stream failed");
                            let marker = format!("\n\n[Error: {}]", e);
                            on_fragment(&marker);
                            text.push_str(&marker);
                            failed = true;
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Completion request failed");
                text = format!("Error: {}", e);
                on_fragment(&text);
                failed = true;
            }
        }

        let mapping = extract_entity_mapping(&text);
        let mapping_updated = mapping.is_some();
        if mapping.is_some() {
            self.latest_mapping = mapping;
        }

        self.conversation.record_exchange(utterance, text.clone());

        Reply {
            text,
            used_context,
            mapping_updated,
            failed,
        }
    }
}
