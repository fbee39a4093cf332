//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, BufRead, IsTerminal, Write};

use advisor_core::{DomainSelector, EntityMapping, Result};
use advisor_rag::{BuildEvent, BuildReport, DomainScore, DomainStatus};

const PROMPT: &str = "advisor>";

/// Display startup banner
pub fn display_banner(model: &str, knowledge_ready: bool) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));
    let line = |text: &str| format!("│  {:<width$}│", text, width = inner - 2);

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());
    println!("{}", line("Databricks FinOps Migration Advisor").blue().bold());
    println!("{}", empty_line.blue());

    let knowledge = if knowledge_ready {
        "Documentation: migration, architecture, costing"
    } else {
        "Documentation: unavailable (answers without references)"
    };
    for text in [
        "Plan a move from your current data platform to Databricks",
        "",
        knowledge,
        "Commands: /help  /mapping  /reset  exit",
        "",
    ] {
        if text.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            println!("{}", line(text).blue());
        }
    }
    println!("{}", line(&format!("Model: {}", model)).dimmed());
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

/// Read one line, with ↑/↓ history navigation on a terminal
///
/// Returns `None` at end of input (EOF on piped stdin, Ctrl+D or Ctrl+C on a
/// terminal). Esc clears the line and returns an empty string.
pub fn read_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_raw_line(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if let Some(line) = &input {
        if !line.is_empty() {
            history.push(line.clone());
        }
    }
    Ok(input)
}

fn redraw(input: &str, previous_width: usize) -> Result<()> {
    let padding = previous_width.saturating_sub(input.chars().count());
    print!(
        "\r{} {}{}\r{} {}",
        PROMPT.green().bold(),
        input,
        " ".repeat(padding),
        PROMPT.green().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}

fn read_raw_line(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }
        let previous_width = input.chars().count();

        match key_event.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None);
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input, previous_width)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input, previous_width)?;
                }
            }
            KeyCode::Up => {
                if !history.is_empty() {
                    let new_index = match history_index {
                        None => history.len() - 1,
                        Some(idx) if idx > 0 => idx - 1,
                        Some(idx) => idx,
                    };
                    history_index = Some(new_index);
                    input = history[new_index].clone();
                    redraw(&input, previous_width)?;
                }
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input, previous_width)?;
                }
            }
            KeyCode::Esc => return Ok(Some(String::new())),
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask anything about your migration", "<question>".green());
    println!("  {} - Show the environment summary gathered so far", "/mapping".green());
    println!("  {} - Start the conversation over", "/reset".green());
    println!("  {} - Show this help message", "/help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  We run a 40 TB Oracle warehouse with nightly ETL");
    println!("  How are DBUs billed for serverless compute?");
}

/// Print the latest entity mapping as JSON
pub fn print_mapping(mapping: Option<&EntityMapping>) {
    match mapping {
        Some(mapping) => {
            let json = serde_json::to_string_pretty(mapping).unwrap_or_else(|e| e.to_string());
            println!("{}", "Environment summary:".bold());
            println!("{}", json);
            if !mapping.has_mandatory_fields() {
                println!(
                    "{}",
                    "Some mandatory facts are still missing; keep answering to refine it.".dimmed()
                );
            }
        }
        None => println!(
            "{}",
            "No environment summary yet. It appears once the advisor has the key facts.".dimmed()
        ),
    }
}

/// One status line per build event
pub fn render_build_event(event: &BuildEvent) -> String {
    match event {
        BuildEvent::DomainStarted { domain, total_urls } => {
            format!("Building {} knowledge base ({} sources)", domain.tag(), total_urls)
        }
        BuildEvent::Fetching {
            index, total, url, ..
        } => format!("  [{}/{}] Fetching {}", index, total, url),
        BuildEvent::Indexing { domain, chunks } => {
            format!("  Embedding {} chunks for {}", chunks, domain)
        }
        BuildEvent::DomainFinished(stats) => format!(
            "  {} ready: {} documents, {} chunks",
            stats.domain.tag(),
            stats.documents,
            stats.chunks
        ),
        BuildEvent::DomainFailed { domain, error } => {
            format!("  {} failed: {}", domain.tag(), error)
        }
    }
}

pub fn print_build_event(event: &BuildEvent) {
    let line = render_build_event(event);
    match event {
        BuildEvent::DomainStarted { .. } => println!("{}", line.cyan().bold()),
        BuildEvent::Fetching { .. } => println!("{}", line.dimmed()),
        BuildEvent::Indexing { .. } => println!("{}", line),
        BuildEvent::DomainFinished(_) => println!("{}", line.green()),
        BuildEvent::DomainFailed { .. } => println!("{}", line.red()),
    }
}

pub fn print_build_report(report: &BuildReport) {
    println!();
    println!("{}", "Build summary:".bold());
    for stats in &report.domains {
        match &stats.error {
            None => println!(
                "  {} {:<13} {:>3} documents {:>5} chunks",
                "✓".green(),
                stats.domain.as_str(),
                stats.documents,
                stats.chunks
            ),
            Some(error) => println!("  {} {:<13} {}", "✗".red(), stats.domain.as_str(), error),
        }
    }
    if report.ready {
        println!("{}", "Knowledge base ready.".green());
    } else {
        println!(
            "{}",
            "Knowledge base incomplete; answers will not include documentation.".yellow()
        );
    }
}

pub fn print_status(statuses: &[DomainStatus]) {
    for status in statuses {
        let detail = match (&status.chunks, &status.error) {
            (Some(chunks), _) => {
                let built = status
                    .built_at
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_default();
                format!("{} chunks, built {}", chunks, built).green()
            }
            (None, Some(error)) => error.red(),
            (None, None) => "missing".yellow(),
        };
        println!(
            "  {:<13} {} ({})",
            status.domain.as_str(),
            detail,
            status.path.display()
        );
    }
}

pub fn print_classification(selector: DomainSelector, scores: &[DomainScore]) {
    println!("{} {}", "Selected:".bold(), selector.to_string().green());
    for score in scores {
        println!("  {:<13} {}", score.domain.as_str(), score.score);
    }
}
