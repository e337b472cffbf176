//! Random context retrieval
//!
//! Every call draws a fresh sample, so feedback is grounded on different
//! facts each time. The random source is always passed in.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::{KnowledgeStore, Scenario, ScenarioStore};
use crate::error::TutorError;

/// Number of knowledge chunks joined into one context string
pub const CONTEXT_CHUNKS: usize = 2;

/// Sample `CONTEXT_CHUNKS` distinct chunks and join their text with a space
pub fn retrieve_knowledge<R: Rng + ?Sized>(
    store: &KnowledgeStore,
    rng: &mut R,
) -> Result<String, TutorError> {
    sample_context(store, CONTEXT_CHUNKS, rng)
}

/// Sample `count` distinct chunks without replacement and join their text
pub fn sample_context<R: Rng + ?Sized>(
    store: &KnowledgeStore,
    count: usize,
    rng: &mut R,
) -> Result<String, TutorError> {
    if store.len() < count {
        return Err(TutorError::InsufficientData {
            kind: "knowledge chunks",
            required: count,
            available: store.len(),
        });
    }

    let context = store
        .chunks()
        .choose_multiple(rng, count)
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    tracing::debug!("Retrieved {} knowledge chunks ({} chars)", count, context.len());
    Ok(context)
}

/// Pick one scenario uniformly at random
pub fn choose_scenario<R: Rng + ?Sized>(
    store: &ScenarioStore,
    rng: &mut R,
) -> Result<Scenario, TutorError> {
    store
        .scenarios()
        .choose(rng)
        .cloned()
        .ok_or(TutorError::InsufficientData {
            kind: "scenarios",
            required: 1,
            available: 0,
        })
}
