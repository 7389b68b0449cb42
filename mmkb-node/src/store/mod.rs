//! SQLite knowledge store with FTS5 keyword search.
//!
//! Every operation opens its own connection and closes it before returning.

pub mod context;
pub mod search;

#[cfg(test)]
mod tests;

pub use context::ContextBuilder;
pub use search::{sanitize_query, FtsMatcher, Matcher, SubstringMatcher, TieredSearch, PLACEHOLDER_QUERY};

use crate::error::StoreError;
use crate::models::SourceDocument;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct KnowledgeStore {
    db_path: PathBuf,
    search: Arc<TieredSearch>,
}

impl KnowledgeStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_search(db_path, TieredSearch::default())
    }

    pub fn with_search(db_path: impl Into<PathBuf>, search: TieredSearch) -> Self {
        Self {
            db_path: db_path.into(),
            search: Arc::new(search),
        }
    }

    pub(crate) fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.db_path)?)
    }

    pub fn init(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files_meta (
                id INTEGER PRIMARY KEY,
                file_name TEXT,
                file_path TEXT
            );
            CREATE VIRTUAL TABLE IF NOT EXISTS files_fts USING fts5(
                file_name,
                extracted_text
            );",
        )?;
        info!("Knowledge store ready at {}", self.db_path.display());
        Ok(())
    }

    pub fn add(&self, name: &str, text: &str) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO files_fts (file_name, extracted_text) VALUES (?1, ?2)",
            params![name, text],
        )?;
        debug!("Stored {} ({} chars)", name, text.len());
        Ok(())
    }

    /// Records the metadata row and the searchable text in one transaction.
    pub fn add_with_source(&self, name: &str, source: &str, text: &str) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO files_meta (file_name, file_path) VALUES (?1, ?2)",
            params![name, source],
        )?;
        tx.execute(
            "INSERT INTO files_fts (file_name, extracted_text) VALUES (?1, ?2)",
            params![name, text],
        )?;
        tx.commit()?;
        debug!("Stored {} from {} ({} chars)", name, source, text.len());
        Ok(())
    }

    /// Keyword search. Errors only when the database cannot be opened; index
    /// failures degrade to a substring scan.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceDocument>, StoreError> {
        let conn = self.connect()?;
        Ok(self.search.run(&conn, query, limit))
    }

    pub fn all_text(&self) -> Result<String, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT extracted_text FROM files_fts ORDER BY rowid")?;
        let texts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(texts.join(" "))
    }

    pub fn sources(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT file_name, file_path FROM files_meta ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
