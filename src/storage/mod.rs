//! Local storage for uploads and classified bot records.

mod sqlite;

pub use sqlite::{BotStore, StoredBot, Summary, UploadReport};
