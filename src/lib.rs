//! Kysy - Retrieval-Augmented Generation chat
//!
//! A CLI and web chat tool that answers questions from your own documents.
//!
//! The name "Kysy" comes from the Finnish word for "ask."
//!
//! # Overview
//!
//! Kysy allows you to:
//! - Ingest text and files into a vector knowledge base
//! - Ask questions and get AI-generated answers grounded in your documents
//! - Chat interactively from the terminal or a browser
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `chunking` - Text splitting with overlap
//! - `embedding` - Embedding generation
//! - `store` - Document store abstraction (Supabase, in-memory)
//! - `rag` - Retrieval, context assembly, and the ask pipeline
//! - `generation` - Answer generation
//! - `cli` - Command-line interface and web server
//!
//! # Example
//!
//! ```rust,no_run
//! use kysy::config::Settings;
//! use kysy::rag::RagEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = RagEngine::new(settings)?;
//!
//!     engine.add_text_document("Helsinki is the capital of Finland.", None).await;
//!     let result = engine.ask("What is the capital of Finland?", "demo").await;
//!     println!("{}", result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod rag;
pub mod store;

pub use error::{KysyError, Result};
