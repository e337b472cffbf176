//! Local knowledge base and scenario catalogue
//!
//! Both stores are loaded once from JSON at startup and stay read-only for
//! the lifetime of the process.

pub mod retrieval;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::TutorError;

pub use retrieval::{choose_scenario, retrieve_knowledge, sample_context, CONTEXT_CHUNKS};

/// A short fact used to ground feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub text: String,
}

/// A business scenario the learner reasons about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario: String,
}

/// Read a JSON array of records, rejecting any element without the required field
fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TutorError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| TutorError::load(path, e))?;
    serde_json::from_str(&contents).map_err(|e| TutorError::load(path, e))
}

/// Immutable collection of knowledge chunks
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeStore {
    /// Load chunks from a JSON file of `{ "text": ... }` objects
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TutorError> {
        let path = path.as_ref();
        let chunks: Vec<KnowledgeChunk> = load_records(path)?;
        info!("Loaded {} knowledge chunks from {}", chunks.len(), path.display());
        Ok(Self { chunks })
    }

    /// Build a store from in-memory records
    pub fn from_records(chunks: Vec<KnowledgeChunk>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Immutable collection of scenarios
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
}

impl ScenarioStore {
    /// Load scenarios from a JSON file of `{ "scenario": ... }` objects
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TutorError> {
        let path = path.as_ref();
        let scenarios: Vec<Scenario> = load_records(path)?;
        info!("Loaded {} scenarios from {}", scenarios.len(), path.display());
        Ok(Self { scenarios })
    }

    /// Build a store from in-memory records
    pub fn from_records(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
