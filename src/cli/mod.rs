//! CLI Module
//!
//! Command-line interface for VibeSplit using Clap v4.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::session::{Mode, SessionSettings};

/// VibeSplit - relationship vibe checks, debates and love letters from four AI agents
#[derive(Parser, Debug)]
#[command(name = "vibesplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Presentation mode (valentine, anti-valentine)
    #[arg(short, long, global = true)]
    pub mode: Option<Mode>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Copy the shareable line of the result to the clipboard
    #[arg(long, global = true)]
    pub copy: bool,

    /// Print the agent activity log after the result
    #[arg(long, global = true)]
    pub activity: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through the reference session and show its finale, no agents needed
    Replay,

    /// Vibe-check a chat conversation
    Analyze {
        /// Conversation text (read from stdin when omitted)
        text: Option<String>,

        /// Upload chat screenshots instead of pasting text
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// Let two debaters argue a topic
    Debate {
        /// The question to debate
        topic: String,

        /// Rounds to run (defaults to session.max_debate_rounds)
        #[arg(short, long)]
        rounds: Option<u32>,
    },

    /// Answer the creator's interview on stdin and receive generated content
    Create,

    /// Run all three experiences, then generate the Ultimate Vibe Report
    Report {
        /// Conversation text for the analyst
        #[arg(long)]
        chat: String,

        /// Debate topic
        #[arg(long)]
        topic: String,

        /// Interview answers, used in order
        #[arg(long = "answer", value_name = "TEXT", required = true)]
        answers: Vec<String>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Rendering options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub copy: bool,
    pub activity: bool,
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;
    let _log_guard = crate::logging::init(&config.logging, cli.debug)?;
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    let mut settings = SessionSettings::from_config(&config);
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    let out = OutputOptions {
        format: cli.format,
        copy: cli.copy,
        activity: cli.activity,
    };

    match cli.command {
        Commands::Config => commands::cmd_config(&config, out.format),
        Commands::Replay => commands::cmd_replay(settings, out),
        Commands::Analyze { text, files } => {
            let client = commands::client(&config)?;
            commands::cmd_analyze(settings, &client, text, files, out).await
        }
        Commands::Debate { topic, rounds } => {
            let client = commands::client(&config)?;
            commands::cmd_debate(settings, &client, &topic, rounds, out).await
        }
        Commands::Create => {
            let client = commands::client(&config)?;
            commands::cmd_create(settings, &client, out).await
        }
        Commands::Report {
            chat,
            topic,
            answers,
        } => {
            let client = commands::client(&config)?;
            commands::cmd_report(settings, &client, &chat, &topic, &answers, out).await
        }
    }
}
