//! Per-URL and per-timestamp-series signals. All functions here are pure.

use super::round2;
use crate::config::FeaturesConfig;
use chrono::{DateTime, FixedOffset};

/// Number of non-empty `/`-separated path segments. Root and empty URLs have depth 0.
pub fn url_depth(url: &str) -> usize {
    url.split('/').filter(|segment| !segment.is_empty()).count()
}

/// True unless the lowercased URL ends in one of the non-HTML extensions.
pub fn is_html_bearing(url: &str, non_html_extensions: &[String]) -> bool {
    let url = url.to_lowercase();
    !non_html_extensions
        .iter()
        .any(|ext| url.ends_with(ext.to_lowercase().as_str()))
}

/// True if the lowercased URL contains any sitemap/robots keyword.
pub fn is_sitemap_like(url: &str, keywords: &[String]) -> bool {
    let url = url.to_lowercase();
    keywords
        .iter()
        .any(|kw| url.contains(kw.to_lowercase().as_str()))
}

/// Fraction of sorted inter-request gaps at or under `window_secs`, over the request count.
/// Zero-length gaps (duplicate timestamps) count as bursts.
pub fn burst_rate(timestamps: &[DateTime<FixedOffset>], window_secs: i64) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();

    let window = window_secs as f64;
    let bursts = sorted
        .windows(2)
        .filter(|pair| {
            let gap = pair[1] - pair[0];
            let delta = gap
                .num_microseconds()
                .map(|us| us as f64 / 1e6)
                .unwrap_or_else(|| gap.num_milliseconds() as f64 / 1000.0);
            delta <= window
        })
        .count();

    round2(bursts as f64 / sorted.len() as f64)
}

/// Feature extractors bound to one policy. Extension and keyword lists are
/// lowercased once at construction.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    burst_window_secs: i64,
    non_html_extensions: Vec<String>,
    sitemap_keywords: Vec<String>,
}

impl FeatureExtractor {
    pub fn new(config: &FeaturesConfig) -> Self {
        Self {
            burst_window_secs: config.burst_window_secs,
            non_html_extensions: config
                .non_html_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            sitemap_keywords: config
                .sitemap_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    pub fn url_depth(&self, url: &str) -> usize {
        url_depth(url)
    }

    pub fn is_html_bearing(&self, url: &str) -> bool {
        is_html_bearing(url, &self.non_html_extensions)
    }

    pub fn is_sitemap_like(&self, url: &str) -> bool {
        is_sitemap_like(url, &self.sitemap_keywords)
    }

    pub fn burst_rate(&self, timestamps: &[DateTime<FixedOffset>]) -> f64 {
        burst_rate(timestamps, self.burst_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    fn exts() -> Vec<String> {
        FeaturesConfig::default().non_html_extensions
    }

    #[test]
    fn depth_counts_non_empty_segments() {
        assert_eq!(url_depth(""), 0);
        assert_eq!(url_depth("/"), 0);
        assert_eq!(url_depth("/a"), 1);
        assert_eq!(url_depth("/a/b/"), 2);
        assert_eq!(url_depth("//a///b/c"), 3);
    }

    #[test]
    fn html_excludes_asset_extensions() {
        let exts = exts();
        assert!(is_html_bearing("/docs/page", &exts));
        assert!(is_html_bearing("/sitemap.xml", &exts));
        assert!(!is_html_bearing("/static/app.JS", &exts));
        assert!(!is_html_bearing("/fonts/x.woff2", &exts));
        assert!(!is_html_bearing("/bundle.js.map", &exts));
    }

    #[test]
    fn sitemap_keywords_are_case_insensitive() {
        let kws = FeaturesConfig::default().sitemap_keywords;
        assert!(is_sitemap_like("/Sitemap_index.xml", &kws));
        assert!(is_sitemap_like("/ROBOTS.TXT", &kws));
        assert!(!is_sitemap_like("/blog/post", &kws));
    }

    #[test]
    fn burst_rate_needs_two_timestamps() {
        assert_eq!(burst_rate(&[], 5), 0.0);
        assert_eq!(burst_rate(&[ts(0)], 5), 0.0);
    }

    #[test]
    fn burst_window_is_inclusive() {
        // gap exactly equal to the window counts
        assert_eq!(burst_rate(&[ts(0), ts(5)], 5), 0.5);
        assert_eq!(burst_rate(&[ts(0), ts(6)], 5), 0.0);
        // duplicate timestamps count as bursts
        assert_eq!(burst_rate(&[ts(3), ts(3)], 0), 0.5);
    }

    #[test]
    fn sub_millisecond_overshoot_is_not_a_burst() {
        let late = ts(0) + Duration::microseconds(5_000_900);
        assert_eq!(burst_rate(&[ts(0), late], 5), 0.0);
        let on_time = ts(0) + Duration::microseconds(4_999_100);
        assert_eq!(burst_rate(&[ts(0), on_time], 5), 0.5);
    }

    #[test]
    fn one_burst_in_eight_rounds_half_to_even() {
        let mut stamps = vec![ts(0), ts(1)];
        stamps.extend((1..=6).map(|i| ts(i * 100)));
        assert_eq!(burst_rate(&stamps, 5), 0.12);
    }

    #[test]
    fn burst_rate_sorts_before_scanning() {
        // unsorted: gaps after sort are 1, 1, 100
        let stamps = [ts(102), ts(0), ts(2), ts(1)];
        assert_eq!(burst_rate(&stamps, 5), 0.5);
    }

    #[test]
    fn burst_rate_rounds_to_two_decimals() {
        let stamps = [ts(0), ts(1), ts(100)];
        assert_eq!(burst_rate(&stamps, 5), 0.33);
    }

    #[test]
    fn extractor_lowercases_policy_lists() {
        let config = FeaturesConfig {
            non_html_extensions: vec![".PDF".to_string()],
            sitemap_keywords: vec!["FEED".to_string()],
            ..FeaturesConfig::default()
        };
        let fx = FeatureExtractor::new(&config);
        assert!(!fx.is_html_bearing("/report.pdf"));
        assert!(fx.is_sitemap_like("/feed.xml"));
    }
}
