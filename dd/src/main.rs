//! Draftdaemon - staged document drafting
//!
//! CLI entry point for creating drafting sessions, chatting through the
//! interview, and driving the skeleton, review, and clause stages.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use draftdaemon::candidates::{CandidateSearch, NoReuse, StoreCandidates};
use draftdaemon::catalog::Catalog;
use draftdaemon::chat::{self, ChatSession};
use draftdaemon::cli::{Cli, Command, OutputFormat, ReviewCommand};
use draftdaemon::config::Config;
use draftdaemon::domain::{Answer, GenerationDepth, TurnRole};
use draftdaemon::llm::create_client;
use draftdaemon::orchestrator::Orchestrator;
use draftdaemon::prompts::PromptLoader;
use draftdaemon::reason::{LlmReasoner, Reasoner, Unconfigured};
use draftstore::SessionStore;

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Log to a file, the terminal belongs to the conversation
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftdaemon")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file =
        fs::File::create(log_dir.join("draftd.log")).context("Failed to create log file")?;

    let directive: Directive = log_level
        .unwrap_or("info")
        .parse()
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    info!("Logging initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "Draftdaemon loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Command::New {
            message,
            document_type,
        } => cmd_new(&config, message.as_deref(), document_type.as_deref()),
        Command::Chat { session_id } => cmd_chat(&config, &session_id).await,
        Command::Send {
            session_id,
            message,
        } => cmd_send(&config, &session_id, &message).await,
        Command::Status { session_id, format } => cmd_status(&config, &session_id, format),
        Command::Skeleton { session_id } => cmd_skeleton(&config, &session_id).await,
        Command::Review { command } => match command {
            ReviewCommand::Plan { session_id } => cmd_review_plan(&config, &session_id).await,
            ReviewCommand::Answer {
                session_id,
                answers,
                file,
            } => cmd_review_answer(&config, &session_id, &answers, file.as_deref()),
            ReviewCommand::Apply {
                session_id,
                answers,
            } => cmd_review_apply(&config, &session_id, &answers),
            ReviewCommand::Freeze { session_id } => cmd_review_freeze(&config, &session_id),
        },
        Command::Generate { session_id, depth } => cmd_generate(&config, &session_id, depth).await,
        Command::Assemble { session_id, output } => {
            cmd_assemble(&config, &session_id, output.as_deref())
        }
        Command::List => cmd_list(&config),
        Command::Doctypes => cmd_doctypes(&config),
    }
}

/// Assemble an orchestrator from configuration
///
/// `with_llm` controls whether a real client is built. Commands that only
/// read or rewrite stored state skip the client so they work without an
/// API key.
fn build_orchestrator(config: &Config, with_llm: bool) -> Result<Orchestrator> {
    let store = SessionStore::open(&config.storage.sessions_dir)
        .context("Failed to open session store")?;

    let reasoner: Arc<dyn Reasoner> = if with_llm {
        config.validate()?;
        let llm = create_client(&config.llm).context("Failed to create LLM client")?;
        let prompts =
            PromptLoader::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Arc::new(LlmReasoner::new(llm, prompts, config.llm.max_tokens))
    } else {
        Arc::new(Unconfigured)
    };

    let candidates: Arc<dyn CandidateSearch> = if config.workflow.reuse_candidates {
        Arc::new(StoreCandidates::new(
            store.clone(),
            config.workflow.max_candidates,
        ))
    } else {
        Arc::new(NoReuse)
    };

    let catalog = Catalog::load(&config.doctypes.expanded_paths())
        .context("Failed to load document types")?;

    Ok(Orchestrator::new(
        store,
        reasoner,
        candidates,
        catalog,
        config.workflow.default_document_type.clone(),
        config.workflow.default_depth,
    ))
}

/// Create a new drafting session
fn cmd_new(config: &Config, message: Option<&str>, document_type: Option<&str>) -> Result<()> {
    let orchestrator = build_orchestrator(config, false)?;

    let mut payload = serde_json::Map::new();
    if let Some(text) = message {
        payload.insert("message".to_string(), Value::String(text.to_string()));
    }
    if let Some(id) = document_type {
        payload.insert("document_type".to_string(), Value::String(id.to_string()));
    }

    let snapshot = orchestrator.create_session(&Value::Object(payload))?;
    println!(
        "{} session {} created ({})",
        "✓".green(),
        snapshot.session.id,
        snapshot.session.document_type
    );
    println!(
        "Chat with it: {}",
        format!("draftd chat {}", snapshot.session.id).yellow()
    );
    Ok(())
}

/// Chat interactively with a session
async fn cmd_chat(config: &Config, session_id: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config, true)?;
    ChatSession::new(&orchestrator, session_id).run().await
}

/// Send one message and print the reply
async fn cmd_send(config: &Config, session_id: &str, message: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config, true)?;
    let snapshot = orchestrator.process_user_message(session_id, message).await?;

    if let Some(turn) = snapshot.session.dialogue.last()
        && turn.role == TurnRole::System
    {
        println!("{}", turn.text);
    }
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Show session state and the suggested next action
fn cmd_status(config: &Config, session_id: &str, format: OutputFormat) -> Result<()> {
    let orchestrator = build_orchestrator(config, false)?;
    let snapshot = orchestrator.get_session_state(session_id)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Text => {
            let session = &snapshot.session;
            println!("Session {}", session.id);
            println!("  document type: {}", session.document_type);
            println!("  stage:         {}", session.stage.name());
            println!("  gate ready:    {}", session.gate.ready_for_skeleton);
            println!("  revision:      {}", session.revision);
            println!("  turns:         {}", session.dialogue.len());
            if let Some(review) = session.stage.review() {
                println!(
                    "  review:        {} ({} of {} answered)",
                    review.status,
                    review.answers.len(),
                    review.questions.len()
                );
            }
            if let Some(clauses) = session.stage.clauses() {
                println!("  clauses:       {}", clauses.len());
            }
            chat::print_next_action(&snapshot.next_action);
        }
    }
    Ok(())
}

/// Propose the document skeleton
async fn cmd_skeleton(config: &Config, session_id: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config, true)?;
    let snapshot = orchestrator.generate_skeleton(session_id).await?;

    println!("{} skeleton proposed", "✓".green());
    if let Some(skeleton) = snapshot.session.stage.skeleton() {
        chat::print_outline(skeleton);
    }
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Plan review questions for the proposed skeleton
async fn cmd_review_plan(config: &Config, session_id: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config, true)?;
    let snapshot = orchestrator.plan_review(session_id).await?;

    println!("{} review planned", "✓".green());
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Record review answers from ID=VALUE pairs or a JSON file
fn cmd_review_answer(
    config: &Config,
    session_id: &str,
    pairs: &[String],
    file: Option<&Path>,
) -> Result<()> {
    let mut answers = Vec::new();
    for raw in pairs {
        let answer = chat::parse_answer_pair(raw)
            .ok_or_else(|| eyre::eyre!("Invalid answer '{}', expected question-id=value", raw))?;
        answers.push(answer);
    }
    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file {}", path.display()))?;
        let from_file: Vec<Answer> = serde_json::from_str(&text)
            .context("Answers file must be a JSON array of {question_id, raw} objects")?;
        answers.extend(from_file);
    }
    if answers.is_empty() {
        return Err(eyre::eyre!("No answers given. Pass ID=VALUE pairs or --file."));
    }

    let orchestrator = build_orchestrator(config, false)?;
    let snapshot = orchestrator.record_review_answers(session_id, answers)?;

    println!("{} answers recorded", "✓".green());
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Merge recorded answers into the document context
fn cmd_review_apply(config: &Config, session_id: &str, pairs: &[String]) -> Result<()> {
    let mut answers = Vec::new();
    for raw in pairs {
        let answer = chat::parse_answer_pair(raw)
            .ok_or_else(|| eyre::eyre!("Invalid answer '{}', expected question-id=value", raw))?;
        answers.push(answer);
    }

    let orchestrator = build_orchestrator(config, false)?;
    let snapshot = orchestrator.apply_review(session_id, answers)?;

    println!("{} answers applied", "✓".green());
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Freeze the review, sealing the skeleton
fn cmd_review_freeze(config: &Config, session_id: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config, false)?;
    let snapshot = orchestrator.freeze_review(session_id)?;

    println!("{} outline frozen", "✓".green());
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Draft clauses for the frozen skeleton
async fn cmd_generate(
    config: &Config,
    session_id: &str,
    depth: Option<GenerationDepth>,
) -> Result<()> {
    let orchestrator = build_orchestrator(config, true)?;
    let snapshot = orchestrator
        .process_clause_generation(session_id, depth)
        .await?;

    if let Some(clauses) = snapshot.session.stage.clauses() {
        println!("{} {} clause(s) drafted", "✓".green(), clauses.len());
    }
    println!("  stage: {}", snapshot.session.stage.name());
    chat::print_next_action(&snapshot.next_action);
    Ok(())
}

/// Assemble the document and print or write it
fn cmd_assemble(config: &Config, session_id: &str, output: Option<&Path>) -> Result<()> {
    let orchestrator = build_orchestrator(config, false)?;
    let document = orchestrator.assemble_document(session_id)?;

    match output {
        Some(path) => {
            fs::write(path, &document.full_text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} document written to {}", "✓".green(), path.display());
        }
        None => println!("{}", document.full_text),
    }
    Ok(())
}

/// List stored sessions
fn cmd_list(config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config, false)?;
    let ids = orchestrator.list_sessions()?;

    if ids.is_empty() {
        println!("No sessions yet. Create one with {}", "draftd new".yellow());
        return Ok(());
    }

    println!("Sessions:");
    for id in ids {
        match orchestrator.get_session_state(&id) {
            Ok(snapshot) => println!(
                "  {}  {:16} {}",
                id,
                snapshot.session.stage.name(),
                snapshot.session.document_type
            ),
            Err(e) => println!("  {}  (unreadable: {})", id, e),
        }
    }
    Ok(())
}

/// List available document types
fn cmd_doctypes(config: &Config) -> Result<()> {
    let catalog = Catalog::load(&config.doctypes.expanded_paths())
        .context("Failed to load document types")?;

    println!("Available document types:");
    println!();
    for def in catalog.iter() {
        println!("  {}", def.id);
        println!("    {}", def.name);
        if !def.description.is_empty() {
            println!("    {}", def.description);
        }
        println!("    Questions: {}", def.questions.len());
        println!();
    }
    Ok(())
}
