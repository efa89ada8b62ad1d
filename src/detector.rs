//! Batch detection: records → profiles → scores → classified bot records.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::features::{BehavioralAggregator, BehavioralProfile};
use crate::ingest::LogRecord;
use crate::risk::{BotType, Classifier, ConfidenceLevel, ScoringEngine};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProfile {
    #[serde(flatten)]
    pub profile: BehavioralProfile,
    pub ai_score: f64,
}

/// Final per-identity output, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub profile: BehavioralProfile,
    pub ai_score: f64,
    pub bot_type: BotType,
    pub confidence_level: ConfidenceLevel,
}

pub struct BotDetector {
    aggregator: BehavioralAggregator,
    scoring: ScoringEngine,
    classifier: Classifier,
}

impl BotDetector {
    /// Build a detector. Fails before any processing if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            aggregator: BehavioralAggregator::new(&config.features),
            scoring: ScoringEngine::new(config.scoring.clone()),
            classifier: Classifier::new(config.classification.clone()),
        })
    }

    pub fn score_profile(&self, profile: BehavioralProfile) -> ScoredProfile {
        let ai_score = self.scoring.score(&profile.features());
        ScoredProfile { profile, ai_score }
    }

    pub fn classify_profile(&self, scored: ScoredProfile) -> ClassifiedRecord {
        let (bot_type, confidence_level) = self.classifier.classify(scored.ai_score);
        ClassifiedRecord {
            profile: scored.profile,
            ai_score: scored.ai_score,
            bot_type,
            confidence_level,
        }
    }

    /// Run the whole batch. Empty input yields an empty result.
    pub fn run(&self, records: &[LogRecord]) -> Vec<ClassifiedRecord> {
        let classified: Vec<ClassifiedRecord> = self
            .aggregator
            .aggregate(records)
            .into_iter()
            .map(|p| self.classify_profile(self.score_profile(p)))
            .collect();

        let ai_bots = classified
            .iter()
            .filter(|c| c.bot_type == BotType::AiRetrieval)
            .count();
        info!(
            records = records.len(),
            bots = classified.len(),
            ai_bots,
            "detection run complete"
        );
        classified
    }
}
