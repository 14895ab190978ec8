//! Per-run import counters.

use super::ErrorKind;
use crate::schema::TargetTable;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// What one import run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records loaded per target table
    pub loaded: BTreeMap<String, u64>,
    /// Skipped units per error kind
    pub skipped: BTreeMap<ErrorKind, u64>,
    /// Categorical values that needed best-effort coercion
    pub coercion_warnings: u64,
    /// Dump files actually read
    pub files: usize,
}

impl Default for ImportSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSummary {
    pub fn new() -> Self {
        Self {
            loaded: TargetTable::ALL
                .iter()
                .map(|t| (t.name().to_string(), 0))
                .collect(),
            skipped: BTreeMap::new(),
            coercion_warnings: 0,
            files: 0,
        }
    }

    pub fn record_loaded(&mut self, table: TargetTable) {
        *self.loaded.entry(table.name().to_string()).or_insert(0) += 1;
    }

    pub fn record_skip(&mut self, kind: ErrorKind) {
        *self.skipped.entry(kind).or_insert(0) += 1;
    }

    pub fn loaded(&self, table: TargetTable) -> u64 {
        self.loaded.get(table.name()).copied().unwrap_or(0)
    }

    pub fn skipped(&self, kind: ErrorKind) -> u64 {
        self.skipped.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_loaded(&self) -> u64 {
        self.loaded.values().sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24} {:>10}", "Table", "Loaded")?;
        writeln!(f, "{}", "─".repeat(35))?;
        for (table, count) in &self.loaded {
            writeln!(f, "{:<24} {:>10}", table, count)?;
        }
        writeln!(f, "{}", "─".repeat(35))?;
        writeln!(f, "{:<24} {:>10}", "TOTAL", self.total_loaded())?;

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped:")?;
            for (kind, count) in &self.skipped {
                writeln!(f, "  {:<22} {:>10}", kind, count)?;
            }
        }

        if self.coercion_warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Coercion warnings: {}", self.coercion_warnings)?;
        }

        Ok(())
    }
}
