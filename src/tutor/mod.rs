//! Tutor service: data stores plus the generator, shared by every session

pub mod prompts;
pub mod session;
pub mod interactive;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::TutorError;
use crate::generation::Generator;
use crate::knowledge::{KnowledgeStore, ScenarioStore};

/// Top-level activity a learner can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    KnowledgeCheck,
    ScenarioActivity,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::KnowledgeCheck, Mode::ScenarioActivity];

    /// Label shown in the mode selector
    pub fn label(&self) -> &'static str {
        match self {
            Mode::KnowledgeCheck => "Knowledge Check",
            Mode::ScenarioActivity => "Scenario-Based Activity",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "knowledge check" | "knowledge_check" | "knowledge" | "1" => Ok(Mode::KnowledgeCheck),
            "scenario-based activity" | "scenario_activity" | "scenario" | "2" => Ok(Mode::ScenarioActivity),
            _ => Err(TutorError::UnknownMode(s.to_string())),
        }
    }
}

/// Process-wide tutor resources, built once at startup
pub struct Tutor {
    knowledge: KnowledgeStore,
    scenarios: ScenarioStore,
    generator: Generator,
}

impl Tutor {
    pub fn new(knowledge: KnowledgeStore, scenarios: ScenarioStore, generator: Generator) -> Self {
        Self {
            knowledge,
            scenarios,
            generator,
        }
    }

    /// Load both data files and build the configured generator.
    ///
    /// A data file that cannot be loaded stops startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let knowledge = KnowledgeStore::load(&config.data.knowledge_path)?;
        let scenarios = ScenarioStore::load(&config.data.scenarios_path)?;
        let generator = Generator::from_config(&config.generation)
            .context("Failed to build generation client")?;
        Ok(Self::new(knowledge, scenarios, generator))
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_labels_and_aliases() {
        assert_eq!("Knowledge Check".parse::<Mode>().unwrap(), Mode::KnowledgeCheck);
        assert_eq!("Scenario-Based Activity".parse::<Mode>().unwrap(), Mode::ScenarioActivity);
        assert_eq!("scenario_activity".parse::<Mode>().unwrap(), Mode::ScenarioActivity);
        assert_eq!(" 1 ".parse::<Mode>().unwrap(), Mode::KnowledgeCheck);
        assert!(matches!("quiz".parse::<Mode>(), Err(TutorError::UnknownMode(_))));
    }

    #[test]
    fn test_mode_labels_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.label().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_from_config_fails_on_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.knowledge_path = dir.path().join("missing.json");
        assert!(Tutor::from_config(&config).is_err());
    }
}
