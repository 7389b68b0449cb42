//! Keyword search strategies over the `files_fts` table.

use crate::models::SourceDocument;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};
use tracing::warn;

/// Searched for when a query sanitizes to nothing.
pub const PLACEHOLDER_QUERY: &str = "data";

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("sanitizer pattern is valid"));

/// Replaces everything but letters, digits and whitespace with spaces and
/// collapses whitespace runs.
pub fn sanitize_query(query: &str) -> String {
    let cleaned = NON_WORD.replace_all(query, " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        PLACEHOLDER_QUERY.to_string()
    } else {
        collapsed
    }
}

pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn find(&self, conn: &Connection, query: &str, limit: usize) -> rusqlite::Result<Vec<SourceDocument>>;
}

/// FTS5 `MATCH` over both indexed columns, in the engine's default order.
pub struct FtsMatcher;

impl Matcher for FtsMatcher {
    fn name(&self) -> &'static str {
        "fts5"
    }

    fn find(&self, conn: &Connection, query: &str, limit: usize) -> rusqlite::Result<Vec<SourceDocument>> {
        let mut stmt = conn.prepare(
            "SELECT file_name, extracted_text FROM files_fts WHERE files_fts MATCH ?1 LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![query, limit as i64], |row| {
            Ok(SourceDocument {
                name: row.get(0)?,
                text: row.get(1)?,
            })
        })?;
        rows.collect()
    }
}

/// `LIKE '%query%'` scan of the text column.
pub struct SubstringMatcher;

impl Matcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn find(&self, conn: &Connection, query: &str, limit: usize) -> rusqlite::Result<Vec<SourceDocument>> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            "SELECT file_name, extracted_text FROM files_fts WHERE extracted_text LIKE ?1 LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok(SourceDocument {
                name: row.get(0)?,
                text: row.get(1)?,
            })
        })?;
        rows.collect()
    }
}

/// Primary matcher with a fallback used when the primary query errors.
pub struct TieredSearch {
    primary: Box<dyn Matcher>,
    fallback: Box<dyn Matcher>,
}

impl TieredSearch {
    pub fn new(primary: Box<dyn Matcher>, fallback: Box<dyn Matcher>) -> Self {
        Self { primary, fallback }
    }

    pub fn run(&self, conn: &Connection, query: &str, limit: usize) -> Vec<SourceDocument> {
        let safe_query = sanitize_query(query);

        match self.primary.find(conn, &safe_query, limit) {
            Ok(results) => results,
            Err(err) => {
                warn!(
                    "{} search failed ({}). Falling back to {} search for '{}'",
                    self.primary.name(),
                    err,
                    self.fallback.name(),
                    safe_query
                );
                self.fallback
                    .find(conn, &safe_query, limit)
                    .unwrap_or_else(|err| {
                        warn!("{} search failed too: {}", self.fallback.name(), err);
                        Vec::new()
                    })
            }
        }
    }
}

impl Default for TieredSearch {
    fn default() -> Self {
        Self::new(Box::new(FtsMatcher), Box::new(SubstringMatcher))
    }
}
