//! Linear weighted scoring over behavioral features, normalized to a bounded range.

use crate::config::ScoringConfig;
use crate::features::{round2, ScoringFeatures};

pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Weighted sum of the five features before normalization.
    pub fn raw_score(&self, features: &ScoringFeatures) -> f64 {
        let w = &self.config.weights;
        w.depth * features.avg_url_depth
            + w.burst * features.burst_rate
            + w.html * features.html_ratio
            + w.repeat * features.repeat_url_ratio
            + w.sitemap * f64::from(features.sitemap_hits)
    }

    /// AI score: scaled raw score rounded to 2 decimals, then clamped.
    pub fn score(&self, features: &ScoringFeatures) -> f64 {
        let scaled = round2(self.raw_score(features) * self.config.normalization_scale);
        scaled.clamp(self.config.score_min, self.config.score_max)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}
