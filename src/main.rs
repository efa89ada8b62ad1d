//! Crawler Intel entrypoint: analyze an access log, persist the classified bots,
//! and query the local store. Results are printed as JSON on stdout.

use clap::{Parser, Subcommand};
use crawler_intel::{
    config::EngineConfig,
    detector::{BotDetector, ClassifiedRecord},
    error::IntelError,
    ingest,
    logging::StructuredLogger,
    storage::BotStore,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "crawler-intel", version, about = "Behavioral AI crawler detection and scoring")]
struct Cli {
    /// Config file (JSON); falls back to CRAWLER_INTEL_CONFIG, then config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the store path from the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an access log, classify every visitor, and store the result
    Analyze {
        file: PathBuf,
        /// Print the report without writing to the store
        #[arg(long)]
        no_store: bool,
    },
    /// Totals across every stored bot
    Summary,
    /// All stored bots, highest AI score first
    Bots,
    /// One stored bot by id
    Bot { id: String },
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_id: Option<String>,
    filename: String,
    total_lines: usize,
    rejected_lines: usize,
    processed_bots: usize,
    bots: &'a [ClassifiedRecord],
}

fn analyze(
    config: &EngineConfig,
    store_path: &Path,
    file: &Path,
    no_store: bool,
) -> Result<(), IntelError> {
    let detector = BotDetector::new(config)?;
    let reader = File::open(file)
        .map(BufReader::new)
        .map_err(|e| IntelError::io(format!("open {}", file.display()), e))?;
    let parsed = ingest::parse_reader(reader)
        .map_err(|e| IntelError::io(format!("read {}", file.display()), e))?;
    let bots = detector.run(&parsed.records);

    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let upload_id = if no_store {
        None
    } else {
        let store = BotStore::open(store_path)?;
        Some(store.ingest_upload(&filename, &parsed, &bots)?.upload_id)
    };

    let report = AnalyzeReport {
        upload_id,
        filename,
        total_lines: parsed.total_lines,
        rejected_lines: parsed.rejected,
        processed_bots: bots.len(),
        bots: &bots,
    };
    emit(&report)
}

fn emit(value: &impl Serialize) -> Result<(), IntelError> {
    StructuredLogger::emit_json(value, &mut std::io::stdout().lock())
        .map_err(|e| IntelError::io("write output", e))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CRAWLER_INTEL_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let loaded = EngineConfig::try_load(&config_path);
    let config = loaded.as_ref().ok().cloned().unwrap_or_default();

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Err(e) = &loaded {
        warn!(error = %e, "using default config");
    }

    let store_path = cli.db.unwrap_or_else(|| config.store.path.clone());
    info!(config = %config_path.display(), store = %store_path.display(), "crawler-intel starting");

    match cli.command {
        Command::Analyze { file, no_store } => analyze(&config, &store_path, &file, no_store)?,
        Command::Summary => emit(&BotStore::open(&store_path)?.summary()?)?,
        Command::Bots => emit(&BotStore::open(&store_path)?.all_bots()?)?,
        Command::Bot { id } => {
            let bot = BotStore::open(&store_path)?
                .bot_by_id(&id)?
                .ok_or(IntelError::NotFound { id })?;
            emit(&bot)?
        }
    }

    Ok(())
}
