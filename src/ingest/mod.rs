//! Access-log ingestion: raw combined-format lines to structured records.

mod combined;

pub use combined::{parse_line, parse_lines, parse_reader, ParsedLog};

use crate::error::{IntelError, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Grouping key for behavioral analysis: one visitor is one (address, agent) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub ip_address: String,
    pub user_agent: String,
}

impl Identity {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// One parsed access-log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub identity: Identity,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    pub url: String,
    pub status_code: u16,
}

impl LogRecord {
    pub fn new(identity: Identity, timestamp: DateTime<FixedOffset>, url: impl Into<String>) -> Self {
        Self {
            identity,
            timestamp,
            method: "GET".to_string(),
            url: url.into(),
            status_code: 200,
        }
    }

    /// A record without a source address cannot be attributed to a visitor.
    pub fn validate(&self) -> Result<()> {
        if self.identity.ip_address.trim().is_empty() {
            return Err(IntelError::InvalidRecord {
                reason: format!("missing source address for {}", self.url),
            });
        }
        Ok(())
    }
}
