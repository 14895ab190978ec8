//! In-memory loader used for dry runs.

use super::{LoadError, Loader, RowId};
use crate::schema::{Record, TargetTable};

/// Keeps every accepted record in insertion order
#[derive(Debug, Default)]
pub struct MemoryLoader {
    records: Vec<(RowId, Record)>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, table: TargetTable) -> usize {
        self.records().filter(|r| r.table == table).count()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records.into_iter().map(|(_, r)| r).collect()
    }
}

impl Loader for MemoryLoader {
    fn insert(&mut self, table: TargetTable, record: &Record) -> Result<RowId, LoadError> {
        if table == TargetTable::Users {
            if let Some(email) = record.get("email").filter(|v| !v.is_null()) {
                let existing = self
                    .records
                    .iter()
                    .find(|(_, r)| r.table == TargetTable::Users && r.get("email") == Some(email));
                if let Some((id, _)) = existing {
                    return Ok(*id);
                }
            }
        }

        let id = self.records.len() as RowId + 1;
        self.records.push((id, record.clone()));
        Ok(id)
    }
}
