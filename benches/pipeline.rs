//! Pipeline benchmark: parsed records → behavioral profiles → classified bots.

use chrono::{Duration, FixedOffset, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crawler_intel::config::{EngineConfig, FeaturesConfig};
use crawler_intel::detector::BotDetector;
use crawler_intel::features::BehavioralAggregator;
use crawler_intel::ingest::{self, Identity, LogRecord};

fn make_dummy_records(n: usize, identities: usize) -> Vec<LogRecord> {
    let base = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            LogRecord::new(
                Identity::new(format!("10.0.0.{}", i % identities), "bench-bot"),
                base + Duration::seconds((i * 3) as i64),
                format!("/section/{}/page/{}", i % 17, i % 5),
            )
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let aggregator = BehavioralAggregator::new(&FeaturesConfig::default());
    let records = make_dummy_records(10_000, 200);

    c.bench_function("aggregate_10k_records", |b| {
        b.iter(|| black_box(aggregator.aggregate(black_box(&records))))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let detector = BotDetector::new(&EngineConfig::default()).unwrap();
    let records = make_dummy_records(10_000, 200);

    c.bench_function("detect_10k_records", |b| {
        b.iter(|| black_box(detector.run(black_box(&records))))
    });
}

fn bench_parse(c: &mut Criterion) {
    let line = r#"203.0.113.9 - - [01/Jul/2024:09:00:00 +0000] "GET /docs/a/b HTTP/1.1" 200 512 "-" "ClaudeBot/1.0""#;
    let text: String = std::iter::repeat(line).take(1_000).collect::<Vec<_>>().join("\n");

    c.bench_function("parse_1k_lines", |b| {
        b.iter(|| black_box(ingest::parse_reader(black_box(text.as_bytes())).unwrap()))
    });
}

criterion_group!(benches, bench_aggregation, bench_full_pipeline, bench_parse);
criterion_main!(benches);
