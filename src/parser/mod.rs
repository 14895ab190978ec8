//! Statement extraction from legacy SQL Server style dumps.
//!
//! A dump is split into `GO`-separated batches; each batch is searched for a
//! single `INSERT INTO <table> (<columns>) VALUES <block>;` statement. The
//! values block is handed over untouched to [`values`].

pub mod values;

#[cfg(test)]
mod edge_case_tests;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub use values::{classify, parse_tuple, split_fields, split_tuples, Literal, ParseError};

static BATCH_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*GO[ \t]*\r?$").unwrap());

// The values block stops at the first `;`. A literal containing `;` would
// truncate the statement; the legacy dumps never escape it.
static INSERT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)INSERT\s+INTO\s+(?:\[?\w+\]?\s*\.\s*)?\[?(\w+)\]?\s*\(([^)]+)\)\s*VALUES\s*(.+?);",
    )
    .unwrap()
});

/// One `INSERT` found in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Bare table name as written in the dump (schema prefix and brackets removed)
    pub table: String,
    /// Column names in source order
    pub columns: Vec<String>,
    /// Text between `VALUES` and the terminating `;`
    pub values_block: String,
}

/// Split a dump into batches on standalone `GO` lines, dropping empty ones
pub fn split_batches(dump: &str) -> Vec<&str> {
    BATCH_SEPARATOR_RE
        .split(dump)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect()
}

/// Extract the first `INSERT` statement of every batch, in dump order
pub fn extract(dump: &str) -> Vec<Statement> {
    split_batches(dump)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, batch)| {
            let stmt = extract_statement(batch);
            if stmt.is_none() {
                debug!(batch = idx, "no INSERT statement in batch, skipping");
            }
            stmt
        })
        .collect()
}

/// Match the single-statement pattern against one batch
pub fn extract_statement(batch: &str) -> Option<Statement> {
    let caps = INSERT_RE.captures(batch)?;

    let table = caps.get(1)?.as_str().to_string();
    let columns = caps
        .get(2)?
        .as_str()
        .split(',')
        .map(normalize_identifier)
        .collect();
    let values_block = caps.get(3)?.as_str().trim().to_string();

    Some(Statement {
        table,
        columns,
        values_block,
    })
}

/// Trim a column name and strip `[..]`, backtick or double-quote wrapping
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['[', '`', '"'])
        .trim_end_matches([']', '`', '"'])
        .to_string()
}
