//! CLI argument parsing and command routing

use clap::{Parser, Subcommand};

/// chatdesk: chat with hosted LLM providers from the terminal
#[derive(Debug, Parser)]
#[command(name = "chatdesk")]
#[command(about = "Chat with hosted LLM providers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a message and stream the reply
    Chat {
        /// The message to send
        message: String,

        /// Model id to use (overrides the configured model)
        #[arg(long)]
        model: Option<String>,

        /// System prompt (defaults to the seed session prompt)
        #[arg(long)]
        system: Option<String>,
    },

    /// List known model ids
    Models,

    /// Show the default session seed data
    Sessions,

    /// Show version information
    Version,
}

impl Cli {
    /// Parse CLI arguments from environment
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
