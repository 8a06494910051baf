//! CLI argument parsing for draftstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ds")]
#[command(author, version, about = "Inspect draftdaemon session storage", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the sessions directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all stored sessions
    List,

    /// Print a session's JSON payload
    Show {
        /// Session ID to display
        #[arg(required = true)]
        session_id: String,
    },

    /// Delete a session
    Delete {
        /// Session ID to delete
        #[arg(required = true)]
        session_id: String,
    },

    /// Show storage statistics
    Stats,
}
