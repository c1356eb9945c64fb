//! # firstp
//!
//! A guided first-principles analysis engine. A problem moves through six
//! ordered phases - framing, assumptions, decomposition, validation,
//! reconstruction, dashboard - and each AI-seeded phase is fed by a
//! streaming LLM text completion that is parsed incrementally into typed
//! records and merged into a single Analysis document.
//!
//! ## Architecture
//!
//! ```text
//! CLI -> Phase drivers -> Anthropic Messages API (SSE stream)
//!              |                     |
//!              v                     v
//!       AnalysisStore  <-  RecordParser (line-oriented, skip-tolerant)
//!              |
//!              v
//!       Snapshot codec (portable JSON envelope)
//! ```
//!
//! The stream producer is opaque: chunks arrive in order and terminate with
//! a completion or failure signal, and only the cumulative text matters.
//! Malformed record lines are skipped silently; the generator's output is
//! never trusted to be well-formed line by line.
//!
//! ## Example
//!
//! ```ignore
//! use firstp::{AnalysisStore, Config};
//! use firstp::anthropic::AnthropicClient;
//! use firstp::phases::FramingPhase;
//! use firstp::stream::{SessionManager, StreamEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = AnthropicClient::new(
//!         &config.anthropic,
//!         config.request.clone(),
//!         config.generation.clone(),
//!     )?;
//!     let mut store = AnalysisStore::new();
//!     let mut sessions = SessionManager::new();
//!
//!     store.set_original_input("Why is customer churn so high?");
//!     let framing = FramingPhase::new(client);
//!     let mut events = framing.begin(&mut sessions, &store).await?;
//!     while let Some(event) = events.recv().await {
//!         if let StreamEvent::Completed { text } = event {
//!             FramingPhase::apply_completion(&mut store, &text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Anthropic Messages API client for streaming generation.
pub mod anthropic;
/// Interactive CLI for the guided workflow.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// The Analysis data model: entities, tree, and phase gate.
pub mod model;
/// Line-oriented record parser for generator output.
pub mod parser;
/// Phase drivers that stream, parse, and merge per-phase records.
pub mod phases;
/// System prompts for the guided workflow.
pub mod prompts;
/// Snapshot import/export envelope codec.
pub mod snapshot;
/// The Analysis aggregate's mutation surface.
pub mod store;
/// Streaming ingestion sessions.
pub mod stream;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::{Analysis, AnalysisPhase, PhaseGate};
pub use store::AnalysisStore;
