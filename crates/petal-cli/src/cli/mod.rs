//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use petal_core::config;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "petal")]
#[command(version)]
#[command(about = "Chat transcript viewer with a guided tour")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open a transcript in the full-screen chat view
    Chat {
        /// Transcript JSON file (default: built-in demo)
        #[arg(long, value_name = "FILE")]
        transcript: Option<PathBuf>,

        /// Do not open the tour on start
        #[arg(long = "no-tutorial")]
        no_tutorial: bool,
    },

    /// Print a transcript as an HTML fragment
    Export {
        /// Transcript JSON file
        #[arg(long, value_name = "FILE")]
        transcript: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // default to chat mode
    let command = cli.command.unwrap_or(Commands::Chat {
        transcript: None,
        no_tutorial: false,
    });

    match command {
        Commands::Chat {
            transcript,
            no_tutorial,
        } => {
            let _guard = logging::init_file()?;
            let config = config::Config::load().context("load config")?;
            commands::chat::run(config, transcript.as_deref(), no_tutorial)
        }
        Commands::Export { transcript } => {
            logging::init_stderr();
            commands::export::run(&transcript)
        }
        Commands::Config { command } => {
            logging::init_stderr();
            match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
            }
        }
    }
}
