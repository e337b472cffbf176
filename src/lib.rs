//! Sustain Tutor - Sustainable Digitalization AI Tutor Library
//!
//! An interactive tutor with:
//! - A local knowledge base and scenario catalogue loaded from JSON
//! - Random context retrieval for grounding feedback
//! - Fixed prompt templates for knowledge checks, scenarios and reflections
//! - A text-generation client for locally hosted models (TGI or Ollama)
//! - An HTTP API with a single-page UI, and a terminal session
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sustain_tutor::{Config, Mode, SessionController, Tutor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let tutor = Arc::new(Tutor::from_config(&config)?);
//!     let mut session = SessionController::with_os_rng(tutor);
//!     session.select_mode(Mode::KnowledgeCheck)?;
//!     let feedback = session.submit_answer("What is e-waste?", "Discarded electronics").await?;
//!     println!("{}", feedback);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod config;
pub mod knowledge;
pub mod generation;
pub mod tutor;
pub mod server;
pub mod cli;

pub use error::{GenerationError, TutorError};
pub use config::Config;
pub use knowledge::{KnowledgeChunk, KnowledgeStore, Scenario, ScenarioStore};
pub use generation::{GenerationParams, Generator, TextGenerator};
pub use tutor::{Mode, Tutor};
pub use tutor::session::{SessionController, SessionMode, SessionState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Sustainable Digitalization AI Tutor", NAME, VERSION)
}
