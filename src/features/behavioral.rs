//! Per-identity behavioral profile built from one group of log records.

use super::{round2, FeatureExtractor};
use crate::ingest::{Identity, LogRecord};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The five signals the scoring engine is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringFeatures {
    pub avg_url_depth: f64,
    pub burst_rate: f64,
    pub html_ratio: f64,
    pub repeat_url_ratio: f64,
    pub sitemap_hits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    #[serde(flatten)]
    pub identity: Identity,
    pub total_requests: u32,
    pub unique_urls: u32,
    /// Mean path depth, 2 decimals
    pub avg_url_depth: f64,
    /// Share of sorted gaps within the burst window, 2 decimals
    pub burst_rate: f64,
    /// Share of HTML-bearing URLs, 2 decimals
    pub html_ratio: f64,
    /// 1 - unique/total, 2 decimals
    pub repeat_url_ratio: f64,
    pub sitemap_hits: u32,
    pub first_seen: DateTime<FixedOffset>,
    pub last_seen: DateTime<FixedOffset>,
}

impl BehavioralProfile {
    /// Build a profile from a non-empty group sharing one identity.
    /// Returns None for an empty group.
    pub fn from_records(
        identity: Identity,
        records: &[&LogRecord],
        extractor: &FeatureExtractor,
    ) -> Option<Self> {
        let first_seen = records.iter().map(|r| r.timestamp).min()?;
        let last_seen = records.iter().map(|r| r.timestamp).max()?;

        let total = records.len();
        let mut urls = HashSet::with_capacity(total);
        let mut depth_sum = 0usize;
        let mut html_requests = 0usize;
        let mut sitemap_hits = 0u32;
        let mut timestamps = Vec::with_capacity(total);

        for r in records {
            urls.insert(r.url.as_str());
            depth_sum += extractor.url_depth(&r.url);
            if extractor.is_html_bearing(&r.url) {
                html_requests += 1;
            }
            if extractor.is_sitemap_like(&r.url) {
                sitemap_hits += 1;
            }
            timestamps.push(r.timestamp);
        }

        let unique = urls.len();
        debug_assert!(unique <= total, "unique_urls exceeds total_requests");

        Some(Self {
            identity,
            total_requests: total as u32,
            unique_urls: unique as u32,
            avg_url_depth: round2(depth_sum as f64 / total as f64),
            burst_rate: extractor.burst_rate(&timestamps),
            html_ratio: round2(html_requests as f64 / total as f64),
            repeat_url_ratio: round2(1.0 - unique as f64 / total as f64),
            sitemap_hits,
            first_seen,
            last_seen,
        })
    }

    pub fn features(&self) -> ScoringFeatures {
        ScoringFeatures {
            avg_url_depth: self.avg_url_depth,
            burst_rate: self.burst_rate,
            html_ratio: self.html_ratio,
            repeat_url_ratio: self.repeat_url_ratio,
            sitemap_hits: self.sitemap_hits,
        }
    }
}
