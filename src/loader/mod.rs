//! Persistence of mapped records.
//!
//! The import pipeline only knows the [`Loader`] trait. [`DuckDbStore`] is
//! the concrete store: an explicit session value owning its connection, passed
//! to the importer by the caller.

mod memory;
mod store;

pub use memory::MemoryLoader;
pub use store::DuckDbStore;

use crate::parser::Literal;
use crate::schema::{Record, TargetTable};
use thiserror::Error;

/// Identifier assigned by the store
pub type RowId = i64;

/// Failure to persist one record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The store refused this record (constraint, type conversion, ...)
    #[error("{table} record rejected: {reason}")]
    Rejected { table: TargetTable, reason: String },
    /// The store cannot be reached or is unusable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl LoadError {
    /// Whether the failure concerns the store rather than the record
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, LoadError::Unavailable(_))
    }
}

/// Destination of mapped records
pub trait Loader {
    /// Persist one record, returning its row id.
    ///
    /// Inserting a `users` record whose email already exists must return the
    /// existing id without writing.
    fn insert(&mut self, table: TargetTable, record: &Record) -> Result<RowId, LoadError>;
}

/// Patient fields that may be changed after import
pub const PATIENT_UPDATABLE: &[&str] = &[
    "citizen_id",
    "full_name",
    "gender",
    "date_of_birth",
    "phone",
    "address",
    "province",
    "condition",
    "created_by",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {0:?} cannot be updated on patients")]
pub struct UnknownField(pub String);

/// A partial patient update holding only the fields to change.
///
/// Field names are checked against [`PATIENT_UPDATABLE`] when set, so an
/// existing value is always safe to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    changes: Vec<(&'static str, Literal)>,
}

impl PatientUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field; setting the same field twice keeps the last value
    pub fn set(mut self, field: &str, value: Literal) -> Result<Self, UnknownField> {
        let name = PATIENT_UPDATABLE
            .iter()
            .find(|allowed| allowed.eq_ignore_ascii_case(field))
            .ok_or_else(|| UnknownField(field.to_string()))?;

        match self.changes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.changes.push((name, value)),
        }
        Ok(self)
    }

    /// Build from name/value pairs, failing on the first unknown name
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, UnknownField>
    where
        I: IntoIterator<Item = (K, Literal)>,
        K: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(Self::new(), |update, (k, v)| update.set(k.as_ref(), v))
    }

    pub fn changes(&self) -> &[(&'static str, Literal)] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
