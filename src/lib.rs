//! Crawler Intel — behavioral AI crawler detection over web-server access logs.
//!
//! Modular structure:
//! - [`ingest`] — Combined log format parsing into [`LogRecord`]s
//! - [`features`] — Per-URL signals and per-identity behavioral profiles
//! - [`risk`] — Weighted AI score and bot classification
//! - [`detector`] — Batch pipeline: records to classified bot records
//! - [`storage`] — SQLite store for uploads and bots
//! - [`logging`] — Tracing subscriber setup

pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod ingest;
pub mod logging;
pub mod risk;
pub mod storage;

pub use config::EngineConfig;
pub use detector::{BotDetector, ClassifiedRecord, ScoredProfile};
pub use error::{IntelError, Result};
pub use features::{BehavioralAggregator, BehavioralProfile, ScoringFeatures};
pub use ingest::{Identity, LogRecord, ParsedLog};
pub use logging::StructuredLogger;
pub use risk::{BotType, Classifier, ConfidenceLevel, ScoringEngine};
pub use storage::BotStore;
