//! Maps an AI score to a bot type and confidence level.

use crate::config::ClassificationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotType {
    #[serde(rename = "AI_Retrieval")]
    AiRetrieval,
    Suspicious,
    Indexer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl BotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotType::AiRetrieval => "AI_Retrieval",
            BotType::Suspicious => "Suspicious",
            BotType::Indexer => "Indexer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AI_Retrieval" => Some(BotType::AiRetrieval),
            "Suspicious" => Some(BotType::Suspicious),
            "Indexer" => Some(BotType::Indexer),
            _ => None,
        }
    }
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(ConfidenceLevel::High),
            "Medium" => Some(ConfidenceLevel::Medium),
            "Low" => Some(ConfidenceLevel::Low),
            _ => None,
        }
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Classifier {
    config: ClassificationConfig,
}

impl Classifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    /// Half-open thresholds checked high to low.
    pub fn classify(&self, score: f64) -> (BotType, ConfidenceLevel) {
        if score >= self.config.high_threshold {
            (BotType::AiRetrieval, ConfidenceLevel::High)
        } else if score >= self.config.medium_threshold {
            (BotType::Suspicious, ConfidenceLevel::Medium)
        } else {
            (BotType::Indexer, ConfidenceLevel::Low)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_half_open() {
        let c = Classifier::new(ClassificationConfig::default());
        assert_eq!(c.classify(100.0), (BotType::AiRetrieval, ConfidenceLevel::High));
        assert_eq!(c.classify(60.0), (BotType::AiRetrieval, ConfidenceLevel::High));
        assert_eq!(c.classify(59.99), (BotType::Suspicious, ConfidenceLevel::Medium));
        assert_eq!(c.classify(30.0), (BotType::Suspicious, ConfidenceLevel::Medium));
        assert_eq!(c.classify(29.99), (BotType::Indexer, ConfidenceLevel::Low));
        assert_eq!(c.classify(0.0), (BotType::Indexer, ConfidenceLevel::Low));
        assert_eq!(c.classify(-5.0), (BotType::Indexer, ConfidenceLevel::Low));
    }

    #[test]
    fn custom_thresholds() {
        let c = Classifier::new(ClassificationConfig {
            high_threshold: 80.0,
            medium_threshold: 10.0,
        });
        assert_eq!(c.classify(79.0).0, BotType::Suspicious);
        assert_eq!(c.classify(9.0).0, BotType::Indexer);
    }

    #[test]
    fn labels_roundtrip_through_strings() {
        for t in [BotType::AiRetrieval, BotType::Suspicious, BotType::Indexer] {
            assert_eq!(BotType::parse(t.as_str()), Some(t));
        }
        for l in [ConfidenceLevel::High, ConfidenceLevel::Medium, ConfidenceLevel::Low] {
            assert_eq!(ConfidenceLevel::parse(l.as_str()), Some(l));
        }
        assert_eq!(
            serde_json::to_string(&BotType::AiRetrieval).unwrap(),
            r#""AI_Retrieval""#
        );
    }
}
