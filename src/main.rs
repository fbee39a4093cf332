use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use advisor_core::Domain;
use advisor_groq::{GroqClient, GroqConfig};
use advisor_rag::{HttpFetcher, KnowledgeBase, KnowledgeBaseContext, shared_embedder};
use advisor_cli::{
    AdvisorSettings, DialogueDriver, GREETING, display_banner, init_logging, print_build_event,
    print_build_report, print_classification, print_help, print_mapping, print_status,
    read_input_with_history,
};

const REBUILD_HINT: &str =
    "Run `advisor build` or `advisor chat --rebuild` to rebuild it; answering without documentation for now.";

#[derive(Parser)]
#[command(name = "advisor")]
#[command(about = "Databricks migration advisor with documentation-backed answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Knowledge base directory (overrides ADVISOR_KB_DIR)
    #[arg(long, global = true)]
    kb_dir: Option<PathBuf>,

    /// Chunks retrieved per question (overrides ADVISOR_CONTEXT_K)
    #[arg(
        short = 'k',
        long = "top-k",
        global = true,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    k: Option<u16>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an advisory conversation (default)
    Chat {
        /// Rebuild the knowledge base before starting
        #[arg(long)]
        rebuild: bool,
    },
    /// Fetch every documentation source and rebuild all domain indexes
    Build,
    /// Show which domain indexes exist on disk
    Status,
    /// Print the documentation context retrieved for a question
    Context {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Search this domain instead of classifying the question
        #[arg(long)]
        domain: Option<Domain>,
    },
    /// Show which domain a question is routed to
    Classify {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut settings = AdvisorSettings::from_env()?;
    if let Some(dir) = cli.kb_dir {
        settings.kb_dir = dir;
    }
    if let Some(k) = cli.k {
        settings.context_k = usize::from(k);
    }

    let mut knowledge_base = open_knowledge_base(&settings)?;

    match cli.command.unwrap_or(Commands::Chat { rebuild: false }) {
        Commands::Chat { rebuild } => chat(knowledge_base, &settings, rebuild).await,
        Commands::Build => {
            let report = knowledge_base
                .build_all(|event| print_build_event(&event))
                .await?;
            print_build_report(&report);
            if !report.ready {
                anyhow::bail!("knowledge base is incomplete after the build");
            }
            Ok(())
        }
        Commands::Status => {
            println!(
                "{} {}",
                "Knowledge base:".bold(),
                settings.kb_dir.display()
            );
            print_status(&knowledge_base.status());
            Ok(())
        }
        Commands::Context { query, domain } => {
            let query = query.join(" ");
            if let Err(e) = knowledge_base.initialize() {
                warn!(error = %e, "Knowledge base failed to load");
            }
            if !knowledge_base.is_ready() {
                println!(
                    "{}",
                    "Knowledge base not ready; run `advisor build` first.".yellow()
                );
                return Ok(());
            }
            let context = knowledge_base.get_context(&query, settings.context_k, domain);
            if context.is_empty() {
                println!("{}", "(no context retrieved)".dimmed());
            } else {
                println!("{}", context);
            }
            Ok(())
        }
        Commands::Classify { query } => {
            let query = query.join(" ");
            let classifier = knowledge_base.classifier();
            print_classification(classifier.classify(&query), &classifier.scores(&query));
            Ok(())
        }
    }
}

fn open_knowledge_base(settings: &AdvisorSettings) -> Result<KnowledgeBase> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    let knowledge_base =
        KnowledgeBase::new(settings.knowledge_base_config(), fetcher, shared_embedder())?
            .with_sources(settings.sources()?);
    Ok(knowledge_base)
}

/// Load the knowledge base, building it when absent or when asked to
async fn prepare_knowledge_base(knowledge_base: &mut KnowledgeBase, rebuild: bool) {
    if !rebuild {
        match knowledge_base.initialize() {
            Ok(true) => return,
            Ok(false) => println!(
                "{}",
                "Knowledge base not found. Building it now; this takes a few minutes.".yellow()
            ),
            Err(e) => {
                warn!(error = %e, "degraded: answering without documentation");
                println!(
                    "{} {}",
                    "Knowledge base could not be loaded:".yellow(),
                    e
                );
                println!("{}", REBUILD_HINT.dimmed());
                return;
            }
        }
    }

    match knowledge_base
        .build_all(|event| print_build_event(&event))
        .await
    {
        Ok(report) => {
            print_build_report(&report);
            if !report.ready {
                warn!("degraded: answering without documentation");
                println!("{}", REBUILD_HINT.dimmed());
            }
        }
        Err(e) => warn!(error = %e, "degraded: answering without documentation"),
    }
}

async fn chat(mut knowledge_base: KnowledgeBase, settings: &AdvisorSettings, rebuild: bool) -> Result<()> {
    // Checked before any long-running build
    let config = match GroqConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    };

    prepare_knowledge_base(&mut knowledge_base, rebuild).await;
    let ready = knowledge_base.is_ready();
    info!(ready, "Starting conversation");

    let client = GroqClient::new(config)?;
    let model = client.config().model.clone();
    let context = KnowledgeBaseContext::new(Arc::new(knowledge_base), settings.context_k);
    let mut driver = DialogueDriver::new(client, context)
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

    display_banner(&model, ready);
    println!("{}\n", GREETING.cyan());

    let mut history = Vec::new();

    loop {
        let Some(input) = read_input_with_history(&mut history)? else {
            break;
        };
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "/help" | "help" => {
                print_help();
                continue;
            }
            "/mapping" => {
                print_mapping(driver.latest_mapping());
                continue;
            }
            "/reset" => {
                driver.reset();
                println!("{}", "Conversation cleared.".dimmed());
                println!("{}\n", GREETING.cyan());
                continue;
            }
            _ => {}
        }

        let reply = driver
            .respond(input, |fragment| {
                print!("{}", fragment);
                let _ = io::stdout().flush();
            })
            .await;
        println!("\n");

        if reply.mapping_updated {
            println!(
                "{}",
                "Environment summary updated. Type /mapping to view it.".dimmed()
            );
        }
    }

    println!("{}", "Goodbye!".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_must_be_positive() {
        let cli = Cli::try_parse_from(["advisor", "-k", "5", "status"]).unwrap();
        assert_eq!(cli.k, Some(5));

        assert!(Cli::try_parse_from(["advisor", "-k", "0", "status"]).is_err());
        assert!(Cli::try_parse_from(["advisor", "status", "--top-k", "0"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
