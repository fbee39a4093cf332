//! Dialogue driver tests with scripted completion and context services

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use insta::assert_yaml_snapshot;

use advisor_core::{
    CompletionRequest, CompletionService, CompletionStream, ContextProvider, Error, Message,
    NoContext, Result, Role,
};

use crate::{Conversation, DialogueDriver, assemble_messages, context_message};

/// Replays scripted fragments and records every request it receives
#[derive(Clone, Default)]
struct ScriptedCompletion {
    script: Arc<Mutex<Vec<Script>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Clone)]
enum Script {
    Fragments(Vec<&'static str>),
    BreaksAfter(Vec<&'static str>),
    Rejected,
}

impl ScriptedCompletion {
    fn new(script: Vec<Script>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionStream> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().remove(0);
        match next {
            Script::Fragments(parts) => Ok(Box::pin(stream::iter(
                parts.into_iter().map(|p| Ok(p.to_string())).collect::<Vec<_>>(),
            ))),
            Script::BreaksAfter(parts) => {
                let mut items: Vec<Result<String>> =
                    parts.into_iter().map(|p| Ok(p.to_string())).collect();
                items.push(Err(Error::Network("connection reset".to_string())));
                Ok(Box::pin(stream::iter(items)))
            }
            Script::Rejected => Err(Error::Completion(
                "Groq API request failed with status 429 Too Many Requests: rate limited"
                    .to_string(),
            )),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

struct FixedContext(&'static str);

#[async_trait]
impl ContextProvider for FixedContext {
    async fn relevant_context(&self, _query: &str) -> String {
        self.0.to_string()
    }
}

fn roles(messages: &[Message]) -> Vec<Role> {
    messages.iter().map(|m| m.role).collect()
}

mod assembly {
    use super::*;

    #[test]
    fn test_first_turn_without_context() {
        let conversation = Conversation::new("persona");
        let messages = assemble_messages(&conversation, "", "Hello");
        assert_yaml_snapshot!(messages, @r"
        - role: system
          content: persona
        - role: user
          content: Hello
        ");
    }

    #[test]
    fn test_context_goes_immediately_before_the_utterance() {
        let mut conversation = Conversation::new("persona");
        conversation.record_exchange("We use Oracle", "How much data?");

        let messages = assemble_messages(&conversation, "[MIGRATION - Reference 1: guide]\nStep one", "About 40 TB");
        assert_eq!(
            roles(&messages),
            vec![Role::System, Role::User, Role::Assistant, Role::System, Role::User]
        );
        assert_eq!(messages[0].content, "persona");
        assert_eq!(
            messages[3].content,
            context_message("[MIGRATION - Reference 1: guide]\nStep one")
        );
        assert_eq!(messages[4].content, "About 40 TB");
    }

    #[test]
    fn test_blank_context_is_not_injected() {
        let conversation = Conversation::new("persona");
        let messages = assemble_messages(&conversation, "  \n", "Hi");
        assert_eq!(roles(&messages), vec![Role::System, Role::User]);
    }

    #[test]
    fn test_reset_keeps_system_prompt() {
        let mut conversation = Conversation::new("persona");
        conversation.record_exchange("a", "b");
        conversation.reset();
        assert_eq!(conversation.messages(), &[Message::system("persona")]);
        assert_eq!(conversation.history_len(), 0);
    }
}

mod driver {
    use super::*;

    #[tokio::test]
    async fn test_streamed_reply_is_forwarded_and_recorded() {
        let completion = ScriptedCompletion::new(vec![Script::Fragments(vec!["Great, ", "how much data?"])]);
        let mut driver = DialogueDriver::new(completion.clone(), NoContext).with_system_prompt("persona");

        let mut shown = Vec::new();
        let reply = driver
            .respond("We run Teradata", |fragment| shown.push(fragment.to_string()))
            .await;

        assert_eq!(shown, vec!["Great, ", "how much data?"]);
        assert_eq!(reply.text, "Great, how much data?");
        assert!(!reply.used_context);
        assert!(!reply.failed);
        assert_eq!(
            driver.conversation().messages(),
            &[
                Message::system("persona"),
                Message::user("We run Teradata"),
                Message::assistant("Great, how much data?"),
            ]
        );

        let request = &completion.requests()[0];
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 2048);
        assert!(request.stream);
    }

    #[tokio::test]
    async fn test_context_never_enters_the_log() {
        let completion = ScriptedCompletion::new(vec![
            Script::Fragments(vec!["first"]),
            Script::Fragments(vec!["second"]),
        ]);
        let mut driver = DialogueDriver::new(
            completion.clone(),
            FixedContext("[COSTING - Reference 1: pricing]\nDBUs"),
        )
        .with_system_prompt("persona");

        let reply = driver.respond("How much is a DBU?", |_| {}).await;
        assert!(reply.used_context);
        driver.respond("And serverless?", |_| {}).await;

        // Log grows by exactly [user, assistant] per turn
        assert_eq!(driver.conversation().history_len(), 4);
        assert!(driver.conversation().history().iter().all(|m| m.role != Role::System));

        let requests = completion.requests();
        assert_eq!(
            roles(&requests[1].messages),
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::System,
                Role::User,
            ]
        );
        assert_eq!(requests[1].messages[4].content, "And serverless?");
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_text() {
        let completion = ScriptedCompletion::new(vec![
            Script::BreaksAfter(vec!["Phase 1: ", "assess"]),
            Script::Fragments(vec!["still here"]),
        ]);
        let mut driver = DialogueDriver::new(completion, NoContext);

        let reply = driver.respond("Plan it", |_| {}).await;
        assert!(reply.failed);
        assert_eq!(
            reply.text,
            "Phase 1: assess\n\n[Error: Network error: connection reset]"
        );

        // The session continues
        let next = driver.respond("Go on", |_| {}).await;
        assert_eq!(next.text, "still here");
        assert_eq!(driver.conversation().history_len(), 4);
    }

    #[tokio::test]
    async fn test_start_failure_becomes_the_reply() {
        let completion = ScriptedCompletion::new(vec![Script::Rejected]);
        let mut driver = DialogueDriver::new(completion, NoContext);

        let mut shown = String::new();
        let reply = driver.respond("Hi", |f| shown.push_str(f)).await;
        assert!(reply.failed);
        assert_eq!(shown, reply.text);
        assert_eq!(
            reply.text,
            "Error: Completion service error: Groq API request failed with status 429 Too Many Requests: rate limited"
        );
        assert_eq!(driver.conversation().history()[1], Message::assistant(reply.text.clone()));
    }

    #[tokio::test]
    async fn test_latest_mapping_is_tracked_and_reset() {
        let completion = ScriptedCompletion::new(vec![Script::Fragments(vec![
            "Here's what I've understood:\n```json\n",
            "{\"current_platform\": {\"data_warehouse\": \"Oracle\"}, \"cloud_provider\": \"AWS\"}",
            "\n```\nDoes this look correct?",
        ])]);
        let mut driver = DialogueDriver::new(completion, NoContext)
            .with_temperature(0.2)
            .with_max_tokens(256);

        let reply = driver.respond("That's everything", |_| {}).await;
        assert!(reply.mapping_updated);
        let mapping = driver.latest_mapping().unwrap();
        assert_eq!(mapping.cloud_provider.as_deref(), Some("AWS"));
        assert!(!mapping.has_mandatory_fields());

        driver.reset();
        assert!(driver.latest_mapping().is_none());
        assert_eq!(driver.conversation().history_len(), 0);
    }
}
