//! Behavioral feature extraction: per-URL signals and per-identity profiles.

mod behavioral;
mod extract;
mod pipeline;

pub use behavioral::{BehavioralProfile, ScoringFeatures};
pub use extract::{burst_rate, is_html_bearing, is_sitemap_like, url_depth, FeatureExtractor};
pub use pipeline::BehavioralAggregator;

/// Round to 2 decimals from the exact binary value, ties to even (0.125 -> 0.12, 2.675 -> 2.67).
pub(crate) fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
