//! CLI command definitions for draftd

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::GenerationDepth;

/// Draftdaemon - staged document drafting workflows
#[derive(Parser, Debug)]
#[command(name = "draftd")]
#[command(author, version, about = "Interview-driven document drafting daemon", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new drafting session
    New {
        /// Opening message for the interview
        message: Option<String>,

        /// Document type id (see `draftd doctypes`)
        #[arg(short = 't', long = "doc-type")]
        document_type: Option<String>,
    },

    /// Chat interactively with a session
    Chat {
        /// Session ID
        session_id: String,
    },

    /// Send a single message to a session
    Send {
        /// Session ID
        session_id: String,

        /// Message text
        message: String,
    },

    /// Show session state and the suggested next action
    Status {
        /// Session ID
        session_id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Propose the document skeleton
    Skeleton {
        /// Session ID
        session_id: String,
    },

    /// Manage the skeleton review
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// Draft clauses for the frozen skeleton
    Generate {
        /// Session ID
        session_id: String,

        /// Generation depth (short, standard, extended, expert)
        #[arg(short, long)]
        depth: Option<GenerationDepth>,
    },

    /// Assemble and print the document
    Assemble {
        /// Session ID
        session_id: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored sessions
    List,

    /// List available document types
    Doctypes,
}

/// Skeleton review subcommands
#[derive(Debug, Subcommand)]
pub enum ReviewCommand {
    /// Plan review questions for the proposed skeleton
    Plan {
        /// Session ID
        session_id: String,
    },

    /// Record review answers
    Answer {
        /// Session ID
        session_id: String,

        /// Answers in the form question-id=value
        #[arg(value_name = "ID=VALUE")]
        answers: Vec<String>,

        /// JSON file with an array of structured answers
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Merge recorded answers into the document context
    Apply {
        /// Session ID
        session_id: String,

        /// Extra answers to record in the same call, question-id=value
        #[arg(value_name = "ID=VALUE")]
        answers: Vec<String>,
    },

    /// Freeze the review, sealing the skeleton
    Freeze {
        /// Session ID
        session_id: String,
    },
}

/// Output format for status
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}
