//! Apache/Nginx combined log format parser.

use super::{Identity, LogRecord};
use chrono::{DateTime, FixedOffset};
use fancy_regex::Regex;
use serde::Serialize;
use std::io::BufRead;
use std::sync::LazyLock;

// ip ident user [time] "METHOD URL PROTO" status bytes "referrer" "agent"
static COMBINED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<ip>\S+) \S+ \S+ \[(?P<time>.*?)\] "(?P<method>\S+) (?P<url>\S+) \S+" (?P<status>\d{3}) \S+ "[^"]*" "(?P<agent>[^"]*)""#,
    )
    .expect("valid regex literal")
});

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Result of parsing a whole upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedLog {
    pub records: Vec<LogRecord>,
    pub total_lines: usize,
    /// Lines that did not match the combined format
    pub rejected: usize,
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

/// Parse a single line. Returns None for anything that is not a well-formed combined entry.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = COMBINED_LINE.captures(line.trim()).ok()??;
    let timestamp = parse_timestamp(&caps["time"])?;
    let status_code = caps["status"].parse::<u16>().ok()?;
    Some(LogRecord {
        identity: Identity::new(&caps["ip"], &caps["agent"]),
        timestamp,
        method: caps["method"].to_string(),
        url: caps["url"].to_string(),
        status_code,
    })
}

impl ParsedLog {
    fn push_line(&mut self, line: &str) {
        self.total_lines += 1;
        match parse_line(line) {
            Some(record) => self.records.push(record),
            None => {
                self.rejected += 1;
                tracing::trace!(line = self.total_lines, "skipping malformed log line");
            }
        }
    }

    fn log_totals(&self) {
        tracing::debug!(
            total_lines = self.total_lines,
            parsed = self.records.len(),
            rejected = self.rejected,
            "parsed access log"
        );
    }
}

pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> ParsedLog {
    let mut out = ParsedLog::default();
    for line in lines {
        out.push_line(line);
    }
    out.log_totals();
    out
}

/// Parse from a reader. Invalid UTF-8 is replaced rather than aborting the upload.
pub fn parse_reader(mut reader: impl BufRead) -> std::io::Result<ParsedLog> {
    let mut out = ParsedLog::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        out.push_line(&String::from_utf8_lossy(&buf));
    }
    out.log_totals();
    Ok(out)
}
