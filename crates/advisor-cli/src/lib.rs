//! Dialogue driver and terminal interface for the FinOps migration advisor

pub mod dialogue;
pub mod logging;
pub mod prompts;
pub mod settings;
mod ui;

#[cfg(test)]
mod tests;

pub use dialogue::{Conversation, DialogueDriver, Reply, assemble_messages};
pub use logging::init_logging;
pub use prompts::{GREETING, SYSTEM_PROMPT, context_message};
pub use settings::AdvisorSettings;
pub use ui::{
    display_banner, print_build_event, print_build_report, print_classification, print_help,
    print_mapping, print_status, read_input_with_history, render_build_event,
};

// Re-export core types
pub use advisor_core::{Error, Result};
