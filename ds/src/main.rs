use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use draftstore::SessionStore;
use draftstore::cli::Cli;
use draftstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let sessions_dir = cli.dir.unwrap_or(config.sessions_dir);

    info!("draftstore starting");

    let store = SessionStore::open(&sessions_dir)?;

    match cli.command {
        draftstore::cli::Command::List => {
            let ids = store.list()?;
            if ids.is_empty() {
                println!("No sessions found");
            } else {
                for id in ids {
                    println!("{}", id);
                }
            }
        }
        draftstore::cli::Command::Show { session_id } => {
            match store.get_raw(&session_id)? {
                Some(payload) => println!("{}", payload),
                None => {
                    eprintln!("{} Session not found: {}", "✗".red(), session_id);
                    std::process::exit(1);
                }
            }
        }
        draftstore::cli::Command::Delete { session_id } => {
            if store.delete(&session_id)? {
                println!("{} Deleted session: {}", "✓".green(), session_id);
            } else {
                eprintln!("{} Session not found: {}", "✗".red(), session_id);
                std::process::exit(1);
            }
        }
        draftstore::cli::Command::Stats => {
            let ids = store.list()?;
            let mut total_bytes = 0usize;
            for id in &ids {
                if let Some(payload) = store.get_raw(id)? {
                    total_bytes += payload.len();
                }
            }
            println!("Store: {}", sessions_dir.display().to_string().cyan());
            println!("  Sessions: {}", ids.len());
            println!("  Total bytes: {}", total_bytes);
        }
    }

    Ok(())
}
