//! AI retrieval scoring and classification.

mod classify;
mod engine;

pub use classify::{BotType, Classifier, ConfidenceLevel};
pub use engine::ScoringEngine;
