//! Shared test fixtures: a recording text generator and tutor builders

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use sustain_tutor::error::GenerationError;
use sustain_tutor::{
    GenerationParams, Generator, KnowledgeChunk, KnowledgeStore, Scenario, ScenarioStore,
    TextGenerator, Tutor,
};

enum Outcome {
    Reply(String),
    Unavailable,
    Timeout,
}

/// Records every prompt; replies with fixed text or fails
pub struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
    outcome: Outcome,
}

impl RecordingGenerator {
    fn with(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            outcome,
        })
    }

    pub fn replying(reply: &str) -> Arc<Self> {
        Self::with(Outcome::Reply(reply.to_string()))
    }

    pub fn failing() -> Arc<Self> {
        Self::with(Outcome::Unavailable)
    }

    pub fn timing_out() -> Arc<Self> {
        Self::with(Outcome::Timeout)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.outcome {
            // Echo the prompt the way full-text servers do
            Outcome::Reply(reply) => Ok(format!("{}{}", prompt, reply)),
            Outcome::Unavailable => Err(GenerationError::Unavailable("connection refused".to_string())),
            Outcome::Timeout => Err(GenerationError::Timeout("operation timed out".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn knowledge(texts: &[&str]) -> KnowledgeStore {
    KnowledgeStore::from_records(texts.iter().map(|t| KnowledgeChunk { text: t.to_string() }).collect())
}

pub fn scenarios(texts: &[&str]) -> ScenarioStore {
    ScenarioStore::from_records(texts.iter().map(|s| Scenario { scenario: s.to_string() }).collect())
}

pub fn tutor(knowledge: KnowledgeStore, scenarios: ScenarioStore, generator: Arc<RecordingGenerator>) -> Arc<Tutor> {
    Arc::new(Tutor::new(
        knowledge,
        scenarios,
        Generator::new(generator, GenerationParams::default(), true),
    ))
}
