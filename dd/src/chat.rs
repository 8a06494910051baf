//! Interactive chat over a drafting session
//!
//! A thin REPL around the orchestrator: plain lines go through message
//! interpretation, slash commands trigger the staged operations. Operation
//! failures print and the loop continues; only readline failures abort.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::SessionSnapshot;
use crate::domain::{Answer, GenerationDepth, Section, Skeleton, TurnRole};
use crate::orchestrator::{NextAction, Orchestrator};

/// Interactive REPL over one session
pub struct ChatSession<'a> {
    orchestrator: &'a Orchestrator,
    session_id: String,
}

enum SlashResult {
    Continue,
    Quit,
}

impl<'a> ChatSession<'a> {
    pub fn new(orchestrator: &'a Orchestrator, session_id: impl Into<String>) -> Self {
        Self {
            orchestrator,
            session_id: session_id.into(),
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        let snapshot = self.orchestrator.get_session_state(&self.session_id)?;
        self.print_welcome(&snapshot);
        print_next_action(&snapshot.next_action);

        let mut rl = DefaultEditor::new()
            .map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            Ok(SlashResult::Continue) => continue,
                            Ok(SlashResult::Quit) => break,
                            Err(e) => {
                                println!("{} {}", "✗".red(), e);
                                continue;
                            }
                        }
                    } else if let Err(e) = self.send_message(input).await {
                        println!("{} {}", "✗".red(), e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn send_message(&mut self, text: &str) -> Result<()> {
        let snapshot = self
            .orchestrator
            .process_user_message(&self.session_id, text)
            .await?;

        if let Some(turn) = snapshot.session.dialogue.last()
            && turn.role == TurnRole::System
        {
            println!();
            println!("{}", turn.text);
        }
        print_next_action(&snapshot.next_action);
        Ok(())
    }

    fn print_welcome(&self, snapshot: &SessionSnapshot) {
        println!();
        println!("{}", "Draftdaemon Chat".bright_cyan().bold());
        println!(
            "Session {} ({})",
            snapshot.session.id,
            snapshot.session.document_type
        );
        println!(
            "Type {} for help, {} to quit",
            "/help".yellow(),
            "/quit".yellow()
        );
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<SlashResult> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                Ok(SlashResult::Continue)
            }
            "/quit" | "/q" | "/exit" => Ok(SlashResult::Quit),
            "/status" => {
                let snapshot = self.orchestrator.get_session_state(&self.session_id)?;
                self.print_status(&snapshot);
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/skeleton" => {
                println!("{}", "Proposing the outline...".dimmed());
                let snapshot = self.orchestrator.generate_skeleton(&self.session_id).await?;
                if let Some(skeleton) = snapshot.session.stage.skeleton() {
                    print_outline(skeleton);
                }
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/plan" => {
                println!("{}", "Planning the review...".dimmed());
                let snapshot = self.orchestrator.plan_review(&self.session_id).await?;
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/answer" => {
                let rest = input["/answer".len()..].trim();
                let Some(answer) = parse_answer_pair(rest) else {
                    println!("{}", "Usage: /answer <question-id>=<value>".yellow());
                    return Ok(SlashResult::Continue);
                };
                let snapshot = self
                    .orchestrator
                    .record_review_answers(&self.session_id, vec![answer])?;
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/apply" => {
                let rest = input["/apply".len()..].trim();
                let answers = if rest.is_empty() {
                    Vec::new()
                } else {
                    match parse_answer_pair(rest) {
                        Some(answer) => vec![answer],
                        None => {
                            println!("{}", "Usage: /apply [<question-id>=<value>]".yellow());
                            return Ok(SlashResult::Continue);
                        }
                    }
                };
                let snapshot = self.orchestrator.apply_review(&self.session_id, answers)?;
                println!("{} answers applied", "✓".green());
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/freeze" => {
                let snapshot = self.orchestrator.freeze_review(&self.session_id)?;
                println!("{} outline frozen", "✓".green());
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/generate" => {
                let depth = match parts.get(1) {
                    Some(raw) => Some(raw.parse::<GenerationDepth>().map_err(|e| eyre::eyre!(e))?),
                    None => None,
                };
                println!("{}", "Drafting clauses...".dimmed());
                let snapshot = self
                    .orchestrator
                    .process_clause_generation(&self.session_id, depth)
                    .await?;
                if let Some(clauses) = snapshot.session.stage.clauses() {
                    println!("{} {} clause(s) drafted", "✓".green(), clauses.len());
                }
                print_next_action(&snapshot.next_action);
                Ok(SlashResult::Continue)
            }
            "/assemble" => {
                let document = self.orchestrator.assemble_document(&self.session_id)?;
                println!();
                println!("{}", document.full_text);
                Ok(SlashResult::Continue)
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                Ok(SlashResult::Continue)
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the chat", "/quit".yellow());
        println!("  {:14} Show session state", "/status".yellow());
        println!("  {:14} Propose the document outline", "/skeleton".yellow());
        println!("  {:14} Plan review questions", "/plan".yellow());
        println!("  {:14} Answer a review question (id=value)", "/answer".yellow());
        println!("  {:14} Merge review answers, optionally with one more (id=value)", "/apply".yellow());
        println!("  {:14} Freeze the outline", "/freeze".yellow());
        println!("  {:14} Draft clauses (optional depth)", "/generate".yellow());
        println!("  {:14} Render the assembled document", "/assemble".yellow());
        println!();
        println!("Anything else is sent to the interview.");
        println!();
    }

    fn print_status(&self, snapshot: &SessionSnapshot) {
        let session = &snapshot.session;
        println!();
        println!("{}", "Session".bright_cyan().bold());
        println!("  id:            {}", session.id);
        println!("  document type: {}", session.document_type);
        println!("  stage:         {}", session.stage.name().yellow());
        println!("  gate ready:    {}", session.gate.ready_for_skeleton);
        println!("  turns:         {}", session.dialogue.len());
        if let Some(clauses) = session.stage.clauses() {
            println!("  clauses:       {}", clauses.len());
        }
        println!();
    }
}

/// Parse an `id=value` pair into an answer; the value may be JSON
pub fn parse_answer_pair(raw: &str) -> Option<Answer> {
    let (id, value) = raw.split_once('=')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    let text = value.trim();
    let value = serde_json::from_str(text)
        .unwrap_or_else(|_| serde_json::Value::String(text.to_string()));
    Some(Answer::new(id, value))
}

/// Print a skeleton as an indented outline
pub fn print_outline(skeleton: &Skeleton) {
    fn walk(section: &Section, depth: usize) {
        let indent = "  ".repeat(depth);
        println!(
            "{}{} {}",
            indent,
            section.title.bold(),
            format!("({})", section.id).dimmed()
        );
        for item in &section.items {
            println!("{}  - [{}] {}", indent, item.importance, item.text);
        }
        for sub in &section.subsections {
            walk(sub, depth + 1);
        }
    }

    println!();
    for section in &skeleton.sections {
        walk(section, 0);
    }
    println!();
}

/// Print what the workflow expects next
pub fn print_next_action(action: &NextAction) {
    match action {
        NextAction::AskRequired { questions } => {
            if let Some(question) = questions.first() {
                println!();
                println!("{} {}", "Next:".bright_cyan(), question.text);
            } else {
                println!(
                    "{}",
                    "No askable required question remains; check the document type definition."
                        .yellow()
                );
            }
        }
        NextAction::OfferRefinement { questions, can_generate } => {
            println!();
            println!("{}", "Optional refinements:".bright_cyan());
            for question in questions {
                println!("  - {}", question.text);
            }
            if *can_generate {
                println!("{}", "Ready to outline. Use /skeleton to propose it.".green());
            }
        }
        NextAction::GenerateSkeleton => {
            println!("{}", "Ready to outline. Use /skeleton to propose it.".green());
        }
        NextAction::PlanReview => {
            println!("{}", "Outline proposed. Use /plan to get review questions.".green());
        }
        NextAction::AnswerReview { pending } => {
            println!();
            println!("{}", "Review questions:".bright_cyan());
            for question in pending {
                println!("  {} {}", question.id.yellow(), question.text);
                for option in &question.options {
                    println!("      {} {}", option.id.dimmed(), option.label);
                }
            }
            println!("{}", "Answer with /answer <id>=<value>.".dimmed());
        }
        NextAction::ApplyReview => {
            println!("{}", "All required review answers recorded. Use /apply.".green());
        }
        NextAction::FreezeReview => {
            println!("{}", "Review applied. Use /freeze to seal the outline.".green());
        }
        NextAction::GenerateClauses { pending_sections } => {
            println!(
                "{} {}",
                "Sections to draft:".bright_cyan(),
                pending_sections.join(", ")
            );
            println!("{}", "Use /generate [depth] to draft them.".dimmed());
        }
        NextAction::AssembleDocument => {
            println!(
                "{}",
                "Drafting complete. Use /assemble to render the document.".green()
            );
        }
    }
}
