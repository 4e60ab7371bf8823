//! CLI module for Kysy.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kysy - Ask questions against your own documents
///
/// A CLI tool for building a document knowledge base and asking questions
/// against it with retrieval-augmented generation. The name "Kysy" comes
/// from the Finnish word for "ask."
#[derive(Parser, Debug)]
#[command(name = "kysy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Kysy and verify the document store schema
    Init,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,

        /// Conversation thread to record this exchange under
        #[arg(short, long, default_value = "cli")]
        thread: String,

        /// Show the retrieved source documents after the answer
        #[arg(short, long)]
        sources: bool,
    },

    /// Start an interactive chat session
    Chat {
        /// Conversation thread to record this session under
        #[arg(short, long, default_value = "cli")]
        thread: String,
    },

    /// Add a text document to the knowledge base
    Add {
        /// The document text
        text: String,

        /// Metadata as a JSON object (e.g. '{"topic": "history"}')
        #[arg(short, long)]
        metadata: Option<String>,
    },

    /// Ingest one or more text files into the knowledge base
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Metadata as a JSON object, applied to every file
        #[arg(short, long)]
        metadata: Option<String>,
    },

    /// Start the HTTP server with the web chat UI
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
