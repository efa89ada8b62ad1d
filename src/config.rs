//! Engine configuration. Every policy knob (burst window, weights, thresholds) is
//! injected through these values; nothing in the pipeline reads process-wide state.

use crate::error::{IntelError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Behavioral feature extraction parameters
    pub features: FeaturesConfig,
    /// Weighted scoring and normalization
    pub scoring: ScoringConfig,
    /// Score thresholds for bot type / confidence
    pub classification: ClassificationConfig,
    /// Local SQLite store
    pub store: StoreConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Gap (seconds) at or under which two consecutive requests count as a burst
    pub burst_window_secs: i64,
    /// Identities with fewer requests than this never produce a profile
    pub min_request_threshold: usize,
    /// URL suffixes treated as assets rather than HTML pages
    pub non_html_extensions: Vec<String>,
    /// Substrings marking sitemap / robots traffic
    pub sitemap_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub depth: f64,
    pub burst: f64,
    pub html: f64,
    pub repeat: f64,
    /// Negative: sitemap traffic points to a classic indexer
    pub sitemap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Multiplier applied to the raw weighted sum
    pub normalization_scale: f64,
    pub score_min: f64,
    pub score_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Score at or above this is AI retrieval (high confidence)
    pub high_threshold: f64,
    /// Score at or above this is suspicious (medium confidence)
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        let non_html = [
            ".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".woff",
            ".woff2", ".ttf", ".map",
        ];
        Self {
            burst_window_secs: 5,
            min_request_threshold: 1,
            non_html_extensions: non_html.iter().map(|s| s.to_string()).collect(),
            sitemap_keywords: vec!["sitemap".to_string(), "robots.txt".to_string()],
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            depth: 2.0,
            burst: 1.5,
            html: 1.2,
            repeat: 1.0,
            sitemap: -1.5,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            normalization_scale: 5.0,
            score_min: 0.0,
            score_max: 100.0,
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            high_threshold: 60.0,
            medium_threshold: 30.0,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("crawler-intel.db"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IntelError::config(format!("{name} must be finite, got {value}")))
    }
}

impl FeaturesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.burst_window_secs < 0 {
            return Err(IntelError::config(format!(
                "features.burst_window_secs must be >= 0, got {}",
                self.burst_window_secs
            )));
        }
        if self.min_request_threshold == 0 {
            return Err(IntelError::config(
                "features.min_request_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        ensure_finite("scoring.weights.depth", w.depth)?;
        ensure_finite("scoring.weights.burst", w.burst)?;
        ensure_finite("scoring.weights.html", w.html)?;
        ensure_finite("scoring.weights.repeat", w.repeat)?;
        ensure_finite("scoring.weights.sitemap", w.sitemap)?;
        ensure_finite("scoring.normalization_scale", self.normalization_scale)?;
        ensure_finite("scoring.score_min", self.score_min)?;
        ensure_finite("scoring.score_max", self.score_max)?;

        if w.depth < 0.0 || w.burst < 0.0 {
            return Err(IntelError::config(
                "scoring.weights.depth and scoring.weights.burst must be non-negative",
            ));
        }
        if w.sitemap > 0.0 {
            return Err(IntelError::config(
                "scoring.weights.sitemap must not be positive",
            ));
        }
        if self.normalization_scale <= 0.0 {
            return Err(IntelError::config(
                "scoring.normalization_scale must be positive",
            ));
        }
        if self.score_min > self.score_max {
            return Err(IntelError::config(format!(
                "scoring.score_min ({}) exceeds scoring.score_max ({})",
                self.score_min, self.score_max
            )));
        }
        Ok(())
    }
}

impl ClassificationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("classification.high_threshold", self.high_threshold)?;
        ensure_finite("classification.medium_threshold", self.medium_threshold)?;
        if self.medium_threshold > self.high_threshold {
            return Err(IntelError::config(format!(
                "classification.medium_threshold ({}) exceeds classification.high_threshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Read a JSON config. A missing file yields defaults; an unreadable or
    /// malformed file is an error.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| IntelError::io(format!("read config {}", path.display()), e))?;
        serde_json::from_str(&data)
            .map_err(|e| IntelError::config(format!("{}: {e}", path.display())))
    }

    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default config");
            Self::default()
        })
    }

    /// Check every pipeline policy value before any record is processed.
    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.scoring.validate()?;
        self.classification.validate()
    }
}
