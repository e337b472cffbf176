//! Per-learner session state and the flows it drives
//!
//! The only transition is an explicit mode selection. Each submission
//! recomputes retrieval and prompt from scratch; nothing else is remembered.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::prompts::PromptContext;
use super::{Mode, Tutor};
use crate::error::TutorError;
use crate::knowledge::{choose_scenario, retrieve_knowledge, Scenario};

/// Mode of a session, including the state before any selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Unset,
    KnowledgeCheck,
    ScenarioActivity,
}

impl SessionMode {
    /// The selected mode, if any
    pub fn mode(&self) -> Option<Mode> {
        match self {
            SessionMode::Unset => None,
            SessionMode::KnowledgeCheck => Some(Mode::KnowledgeCheck),
            SessionMode::ScenarioActivity => Some(Mode::ScenarioActivity),
        }
    }
}

impl From<Mode> for SessionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::KnowledgeCheck => SessionMode::KnowledgeCheck,
            Mode::ScenarioActivity => SessionMode::ScenarioActivity,
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode() {
            Some(mode) => f.write_str(mode.label()),
            None => f.write_str("no selected"),
        }
    }
}

/// Everything a session remembers between requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub id: Uuid,
    pub mode: SessionMode,
    /// Scenario presented to the learner; set only in scenario mode
    pub scenario: Option<Scenario>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: SessionMode::Unset,
            scenario: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates retrieval, prompting and generation for one session
pub struct SessionController {
    tutor: Arc<Tutor>,
    state: SessionState,
    rng: StdRng,
}

impl SessionController {
    /// Start a session with an explicit random source
    pub fn new(tutor: Arc<Tutor>, rng: StdRng) -> Self {
        Self {
            tutor,
            state: SessionState::new(),
            rng,
        }
    }

    /// Start a session seeded from the operating system
    pub fn with_os_rng(tutor: Arc<Tutor>) -> Self {
        Self::new(tutor, StdRng::from_os_rng())
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    /// Scenario currently shown to the learner
    pub fn scenario(&self) -> Option<&Scenario> {
        self.state.scenario.as_ref()
    }

    /// Switch mode. Scenario mode draws a fresh scenario and returns it.
    ///
    /// Knowledge Check reads no data at selection time; Scenario mode reads
    /// only the scenario store. On failure the previous mode is kept.
    pub fn select_mode(&mut self, mode: Mode) -> Result<Option<&Scenario>, TutorError> {
        let scenario = match mode {
            Mode::KnowledgeCheck => None,
            Mode::ScenarioActivity => Some(choose_scenario(self.tutor.scenarios(), &mut self.rng)?),
        };

        self.state.mode = mode.into();
        self.state.scenario = scenario;
        info!(session = %self.state.id, "Mode selected: {}", mode);
        Ok(self.state.scenario.as_ref())
    }

    fn require(&self, expected: Mode) -> Result<(), TutorError> {
        if self.state.mode == SessionMode::from(expected) {
            Ok(())
        } else {
            Err(TutorError::ModeMismatch {
                expected,
                actual: self.state.mode,
            })
        }
    }

    /// Knowledge Check: grade an answer against freshly retrieved context
    pub async fn submit_answer(&mut self, question: &str, answer: &str) -> Result<String, TutorError> {
        self.require(Mode::KnowledgeCheck)?;

        let context = retrieve_knowledge(self.tutor.knowledge(), &mut self.rng)?;
        let prompt = PromptContext::KnowledgeCheck {
            context: &context,
            question,
            answer,
        }
        .render();

        info!(session = %self.state.id, "Evaluating knowledge-check answer");
        Ok(self.tutor.generator().generate(&prompt).await?)
    }

    /// Scenario activity: assess a proposed solution to the presented scenario
    pub async fn evaluate_solution(&self, solution: &str) -> Result<String, TutorError> {
        self.require(Mode::ScenarioActivity)?;

        let scenario = self.state.scenario.as_ref().ok_or(TutorError::InsufficientData {
            kind: "scenarios",
            required: 1,
            available: 0,
        })?;
        let prompt = PromptContext::Scenario {
            scenario: &scenario.scenario,
            response: solution,
        }
        .render();

        info!(session = %self.state.id, "Evaluating scenario solution");
        Ok(self.tutor.generator().generate(&prompt).await?)
    }

    /// Summarize an optional reflection; an empty one yields `None` without
    /// calling the model
    pub async fn summarize_reflection(&self, reflection: &str) -> Result<Option<String>, TutorError> {
        self.require(Mode::ScenarioActivity)?;

        if reflection.is_empty() {
            return Ok(None);
        }

        let prompt = PromptContext::Reflection { reflection }.render();
        info!(session = %self.state.id, "Summarizing reflection");
        Ok(Some(self.tutor.generator().generate(&prompt).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generation::{GenerationParams, Generator, TextGenerator};
    use crate::knowledge::{KnowledgeChunk, KnowledgeStore, ScenarioStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("feedback".to_string())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn controller(knowledge: &[&str], scenarios: &[&str]) -> (SessionController, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let tutor = Tutor::new(
            KnowledgeStore::from_records(
                knowledge.iter().map(|t| KnowledgeChunk { text: t.to_string() }).collect(),
            ),
            ScenarioStore::from_records(
                scenarios.iter().map(|s| Scenario { scenario: s.to_string() }).collect(),
            ),
            Generator::new(recorder.clone(), GenerationParams::default(), true),
        );
        (SessionController::new(Arc::new(tutor), StdRng::seed_from_u64(11)), recorder)
    }

    #[test]
    fn test_starts_unset() {
        let (session, _) = controller(&["a", "b"], &["s"]);
        assert_eq!(session.mode(), SessionMode::Unset);
        assert!(session.scenario().is_none());
    }

    #[test]
    fn test_select_mode_transitions() {
        let (mut session, _) = controller(&["a", "b"], &["only scenario"]);

        let shown = session.select_mode(Mode::ScenarioActivity).unwrap().cloned();
        assert_eq!(shown.unwrap().scenario, "only scenario");
        assert_eq!(session.mode(), SessionMode::ScenarioActivity);

        assert!(session.select_mode(Mode::KnowledgeCheck).unwrap().is_none());
        assert_eq!(session.mode(), SessionMode::KnowledgeCheck);
        assert!(session.scenario().is_none());
    }

    #[test]
    fn test_failed_selection_keeps_previous_mode() {
        let (mut session, _) = controller(&["a", "b"], &[]);
        session.select_mode(Mode::KnowledgeCheck).unwrap();

        let err = session.select_mode(Mode::ScenarioActivity).unwrap_err();
        assert!(matches!(err, TutorError::InsufficientData { kind: "scenarios", .. }));
        assert_eq!(session.mode(), SessionMode::KnowledgeCheck);
    }

    #[tokio::test]
    async fn test_submit_answer_requires_knowledge_mode() {
        let (mut session, recorder) = controller(&["a", "b"], &["s"]);

        let err = session.submit_answer("q", "a").await.unwrap_err();
        assert!(matches!(
            err,
            TutorError::ModeMismatch { expected: Mode::KnowledgeCheck, actual: SessionMode::Unset }
        ));

        session.select_mode(Mode::ScenarioActivity).unwrap();
        assert!(session.submit_answer("q", "a").await.is_err());
        assert!(recorder.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_answer_builds_grounded_prompt() {
        let (mut session, recorder) = controller(&["Fact one.", "Fact two."], &[]);
        session.select_mode(Mode::KnowledgeCheck).unwrap();

        let feedback = session.submit_answer("What is PUE?", "Power usage effectiveness").await.unwrap();
        assert_eq!(feedback, "feedback");

        let prompts = recorder.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Fact one.") && prompts[0].contains("Fact two."));
        assert!(prompts[0].contains("QUESTION:\nWhat is PUE?\n"));
        assert!(prompts[0].contains("STUDENT ANSWER:\nPower usage effectiveness\n"));
    }

    #[tokio::test]
    async fn test_evaluate_uses_presented_scenario() {
        let (mut session, recorder) = controller(&[], &["Scenario A", "Scenario B", "Scenario C"]);
        let shown = session.select_mode(Mode::ScenarioActivity).unwrap().cloned().unwrap();

        session.evaluate_solution("my plan").await.unwrap();

        let prompts = recorder.prompts.lock().unwrap();
        assert!(prompts[0].contains(&format!("SCENARIO:\n{}\n", shown.scenario)));
        assert!(prompts[0].contains("STUDENT RESPONSE:\nmy plan\n"));
    }

    #[tokio::test]
    async fn test_empty_reflection_skips_generation() {
        let (mut session, recorder) = controller(&[], &["s"]);
        session.select_mode(Mode::ScenarioActivity).unwrap();

        assert_eq!(session.summarize_reflection("").await.unwrap(), None);
        assert!(recorder.prompts.lock().unwrap().is_empty());

        let summary = session.summarize_reflection("I learned a lot").await.unwrap();
        assert_eq!(summary.as_deref(), Some("feedback"));
        assert!(recorder.prompts.lock().unwrap()[0].contains("STUDENT REFLECTION:\nI learned a lot\n"));
    }
}
