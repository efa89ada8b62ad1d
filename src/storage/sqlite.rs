//! SQLite-backed store for uploads and classified bot records.
//! The store owns identifier assignment; detection output never carries ids.

use crate::detector::ClassifiedRecord;
use crate::error::{IntelError, Result};
use crate::features::BehavioralProfile;
use crate::ingest::{Identity, ParsedLog};
use crate::risk::{BotType, ConfidenceLevel};
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS uploads (
        id TEXT PRIMARY KEY,
        filename TEXT NOT NULL,
        total_lines INTEGER NOT NULL,
        processed_bots INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS bots (
        id TEXT PRIMARY KEY,
        upload_id TEXT NOT NULL REFERENCES uploads(id),
        ip_address TEXT NOT NULL,
        user_agent TEXT NOT NULL,
        total_requests INTEGER NOT NULL,
        unique_urls INTEGER NOT NULL,
        avg_url_depth REAL NOT NULL,
        burst_rate REAL NOT NULL,
        html_ratio REAL NOT NULL,
        repeat_url_ratio REAL NOT NULL,
        sitemap_hits INTEGER NOT NULL,
        ai_score REAL NOT NULL,
        bot_type TEXT NOT NULL,
        confidence_level TEXT NOT NULL,
        first_seen TEXT NOT NULL,
        last_seen TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bots_score ON bots(ai_score);
    CREATE INDEX IF NOT EXISTS idx_bots_upload ON bots(upload_id);
"#;

const BOT_COLUMNS: &str = "id, upload_id, ip_address, user_agent, total_requests, unique_urls, \
     avg_url_depth, burst_rate, html_ratio, repeat_url_ratio, sitemap_hits, ai_score, bot_type, \
     confidence_level, first_seen, last_seen";

/// Dashboard aggregate over every stored bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_bots: u64,
    pub ai_bots: u64,
    pub suspicious_bots: u64,
    pub average_ai_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBot {
    pub id: String,
    pub upload_id: String,
    #[serde(flatten)]
    pub record: ClassifiedRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    pub upload_id: String,
    pub filename: String,
    pub total_lines: usize,
    pub rejected_lines: usize,
    pub processed_bots: usize,
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<FixedOffset>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| conversion_error(idx, format!("bad timestamp {raw:?}: {e}")))
}

fn bot_from_row(row: &Row<'_>) -> rusqlite::Result<StoredBot> {
    let bot_type: String = row.get(12)?;
    let confidence: String = row.get(13)?;
    let profile = BehavioralProfile {
        identity: Identity::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?),
        total_requests: row.get(4)?,
        unique_urls: row.get(5)?,
        avg_url_depth: row.get(6)?,
        burst_rate: row.get(7)?,
        html_ratio: row.get(8)?,
        repeat_url_ratio: row.get(9)?,
        sitemap_hits: row.get(10)?,
        first_seen: timestamp_at(row, 14)?,
        last_seen: timestamp_at(row, 15)?,
    };
    Ok(StoredBot {
        id: row.get(0)?,
        upload_id: row.get(1)?,
        record: ClassifiedRecord {
            profile,
            ai_score: row.get(11)?,
            bot_type: BotType::parse(&bot_type)
                .ok_or_else(|| conversion_error(12, format!("unknown bot type {bot_type:?}")))?,
            confidence_level: ConfidenceLevel::parse(&confidence).ok_or_else(|| {
                conversion_error(13, format!("unknown confidence level {confidence:?}"))
            })?,
        },
    })
}

fn insert_bot_row(conn: &Connection, upload_id: &str, bot: &ClassifiedRecord) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let p = &bot.profile;
    conn.execute(
        "INSERT INTO bots (id, upload_id, ip_address, user_agent, total_requests, unique_urls, \
         avg_url_depth, burst_rate, html_ratio, repeat_url_ratio, sitemap_hits, ai_score, \
         bot_type, confidence_level, first_seen, last_seen) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            id,
            upload_id,
            p.identity.ip_address,
            p.identity.user_agent,
            p.total_requests,
            p.unique_urls,
            p.avg_url_depth,
            p.burst_rate,
            p.html_ratio,
            p.repeat_url_ratio,
            p.sitemap_hits,
            bot.ai_score,
            bot.bot_type.as_str(),
            bot.confidence_level.as_str(),
            p.first_seen.to_rfc3339(),
            p.last_seen.to_rfc3339(),
        ],
    )
    .map_err(|e| IntelError::storage("insert bot", e))?;
    Ok(id)
}

pub struct BotStore {
    conn: Mutex<Connection>,
}

impl BotStore {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| IntelError::storage("open", e))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| IntelError::storage("open", e))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| IntelError::storage("create schema", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create_upload(&self, filename: &str, total_lines: usize) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn()
            .execute(
                "INSERT INTO uploads (id, filename, total_lines, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, filename, total_lines as i64, Utc::now().to_rfc3339()],
            )
            .map_err(|e| IntelError::storage("create upload", e))?;
        Ok(id)
    }

    pub fn update_processed_bots(&self, upload_id: &str, processed_bots: usize) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE uploads SET processed_bots = ?1 WHERE id = ?2",
                params![processed_bots as i64, upload_id],
            )
            .map_err(|e| IntelError::storage("update processed bots", e))?;
        Ok(())
    }

    /// Insert one classified record; returns the generated bot id.
    pub fn insert_bot(&self, upload_id: &str, bot: &ClassifiedRecord) -> Result<String> {
        insert_bot_row(&self.conn(), upload_id, bot)
    }

    /// Record an upload and all of its bots in a single transaction.
    pub fn ingest_upload(
        &self,
        filename: &str,
        parsed: &ParsedLog,
        bots: &[ClassifiedRecord],
    ) -> Result<UploadReport> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| IntelError::storage("begin upload", e))?;
        let upload_id = Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO uploads (id, filename, total_lines, processed_bots, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                upload_id,
                filename,
                parsed.total_lines as i64,
                bots.len() as i64,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| IntelError::storage("create upload", e))?;
        for bot in bots {
            insert_bot_row(&tx, &upload_id, bot)?;
        }
        tx.commit()
            .map_err(|e| IntelError::storage("commit upload", e))?;

        tracing::info!(%upload_id, filename, bots = bots.len(), "stored upload");
        Ok(UploadReport {
            upload_id,
            filename: filename.to_string(),
            total_lines: parsed.total_lines,
            rejected_lines: parsed.rejected,
            processed_bots: bots.len(),
        })
    }

    pub fn summary(&self) -> Result<Summary> {
        self.conn()
            .query_row(
                "SELECT COUNT(*), \
                 COALESCE(SUM(CASE WHEN bot_type = 'AI_Retrieval' THEN 1 ELSE 0 END), 0), \
                 COALESCE(SUM(CASE WHEN bot_type = 'Suspicious' THEN 1 ELSE 0 END), 0), \
                 AVG(ai_score) \
                 FROM bots",
                [],
                |row| {
                    Ok(Summary {
                        total_bots: row.get::<_, i64>(0)? as u64,
                        ai_bots: row.get::<_, i64>(1)? as u64,
                        suspicious_bots: row.get::<_, i64>(2)? as u64,
                        average_ai_score: row.get(3)?,
                    })
                },
            )
            .map_err(|e| IntelError::storage("summary", e))
    }

    /// Every stored bot, highest AI score first.
    pub fn all_bots(&self) -> Result<Vec<StoredBot>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("SELECT {BOT_COLUMNS} FROM bots ORDER BY ai_score DESC"))
            .map_err(|e| IntelError::storage("list bots", e))?;
        let rows = stmt
            .query_map([], bot_from_row)
            .map_err(|e| IntelError::storage("list bots", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| IntelError::storage("list bots", e))
    }

    pub fn bot_by_id(&self, id: &str) -> Result<Option<StoredBot>> {
        self.conn()
            .query_row(
                &format!("SELECT {BOT_COLUMNS} FROM bots WHERE id = ?1"),
                params![id],
                bot_from_row,
            )
            .optional()
            .map_err(|e| IntelError::storage("get bot", e))
    }
}
