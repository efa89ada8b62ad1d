//! Aggregation pipeline: records → identity groups → behavioral profiles.

use super::{BehavioralProfile, FeatureExtractor};
use crate::config::FeaturesConfig;
use crate::ingest::{Identity, LogRecord};
use std::collections::BTreeMap;
use tracing::debug;

pub struct BehavioralAggregator {
    extractor: FeatureExtractor,
    min_request_threshold: usize,
}

impl BehavioralAggregator {
    pub fn new(config: &FeaturesConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config),
            min_request_threshold: config.min_request_threshold,
        }
    }

    /// Group records by identity and build one profile per group that meets the
    /// request threshold. Output is ordered by identity. Records without a source
    /// address are excluded before grouping.
    pub fn aggregate(&self, records: &[LogRecord]) -> Vec<BehavioralProfile> {
        let mut grouped: BTreeMap<&Identity, Vec<&LogRecord>> = BTreeMap::new();
        let mut invalid = 0usize;

        for record in records {
            if let Err(e) = record.validate() {
                debug!(error = %e, "excluding record");
                invalid += 1;
                continue;
            }
            grouped.entry(&record.identity).or_default().push(record);
        }
        if invalid > 0 {
            debug!(invalid, "excluded invalid records");
        }

        let identities = grouped.len();
        let profiles: Vec<BehavioralProfile> = grouped
            .into_iter()
            .filter(|(_, group)| group.len() >= self.min_request_threshold)
            .filter_map(|(identity, group)| {
                BehavioralProfile::from_records(identity.clone(), &group, &self.extractor)
            })
            .collect();

        debug!(
            records = records.len(),
            identities,
            profiles = profiles.len(),
            min_request_threshold = self.min_request_threshold,
            "aggregated behavioral profiles"
        );
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};

    fn at(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    fn rec(ip: &str, ua: &str, secs: i64, url: &str) -> LogRecord {
        LogRecord::new(Identity::new(ip, ua), at(secs), url)
    }

    fn aggregator(min_request_threshold: usize) -> BehavioralAggregator {
        BehavioralAggregator::new(&FeaturesConfig {
            min_request_threshold,
            ..FeaturesConfig::default()
        })
    }

    #[test]
    fn empty_input_yields_no_profiles() {
        assert!(aggregator(1).aggregate(&[]).is_empty());
    }

    #[test]
    fn one_profile_per_identity_sorted() {
        let records = vec![
            rec("10.0.0.2", "b", 0, "/x"),
            rec("10.0.0.1", "z", 0, "/x"),
            rec("10.0.0.1", "a", 0, "/x"),
            rec("10.0.0.2", "b", 1, "/y"),
            rec("10.0.0.1", "a", 9, "/y"),
        ];
        let profiles = aggregator(1).aggregate(&records);
        let keys: Vec<(&str, &str)> = profiles
            .iter()
            .map(|p| (p.identity.ip_address.as_str(), p.identity.user_agent.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("10.0.0.1", "a"), ("10.0.0.1", "z"), ("10.0.0.2", "b")]
        );
        assert_eq!(profiles[0].total_requests, 2);
        assert_eq!(profiles[2].total_requests, 2);
    }

    #[test]
    fn same_ip_different_agent_is_a_different_identity() {
        let records = vec![rec("1.1.1.1", "ua-1", 0, "/"), rec("1.1.1.1", "ua-2", 0, "/")];
        assert_eq!(aggregator(1).aggregate(&records).len(), 2);
    }

    #[test]
    fn groups_below_threshold_are_dropped() {
        let records = vec![
            rec("1.1.1.1", "busy", 0, "/a"),
            rec("1.1.1.1", "busy", 1, "/b"),
            rec("1.1.1.1", "busy", 2, "/c"),
            rec("2.2.2.2", "quiet", 0, "/a"),
        ];
        let profiles = aggregator(3).aggregate(&records);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].identity.user_agent, "busy");

        assert!(aggregator(4).aggregate(&records).is_empty());
    }

    #[test]
    fn records_without_address_are_excluded() {
        let records = vec![rec("", "ghost", 0, "/a"), rec("3.3.3.3", "ok", 0, "/a")];
        let profiles = aggregator(1).aggregate(&records);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].identity.ip_address, "3.3.3.3");
    }

    #[test]
    fn profile_invariants_hold() {
        let records: Vec<LogRecord> = (0..40)
            .map(|i| rec("9.9.9.9", "crawler", i * 3, &format!("/p/{}", i % 7)))
            .collect();
        for p in aggregator(1).aggregate(&records) {
            assert!(p.unique_urls <= p.total_requests);
            assert!(p.first_seen <= p.last_seen);
            for v in [p.burst_rate, p.html_ratio, p.repeat_url_ratio] {
                assert!((0.0..=1.0).contains(&v), "ratio out of range: {v}");
            }
        }
    }

    #[test]
    fn all_distinct_urls_means_no_repeats() {
        let records = vec![rec("4.4.4.4", "x", 0, "/a"), rec("4.4.4.4", "x", 60, "/b")];
        let p = &aggregator(1).aggregate(&records)[0];
        assert_eq!(p.unique_urls, p.total_requests);
        assert_eq!(p.repeat_url_ratio, 0.0);
    }
}
