//! Mapping of legacy source tables onto the target schema.
//!
//! This module provides:
//! - The closed set of target tables and their field allow-lists
//! - Column aliasing (several source names feeding one target field)
//! - Categorical coercion of sex/gender labels to integer codes
//! - Defaults for fields the source dump does not carry

mod coerce;

pub use coerce::{sex_code, Coerced};

use crate::parser::Literal;
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Format used for defaulted timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Target table of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetTable {
    Users,
    Patients,
    Predictions,
}

impl TargetTable {
    pub const ALL: [TargetTable; 3] = [
        TargetTable::Users,
        TargetTable::Patients,
        TargetTable::Predictions,
    ];

    /// Resolve a dump table name (case-insensitive)
    pub fn from_source(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "users" => Some(TargetTable::Users),
            "patients" => Some(TargetTable::Patients),
            "heartrecords" => Some(TargetTable::Predictions),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetTable::Users => "users",
            TargetTable::Patients => "patients",
            TargetTable::Predictions => "predictions",
        }
    }

    /// Recognized fields in target column order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            TargetTable::Users => USER_FIELDS,
            TargetTable::Patients => PATIENT_FIELDS,
            TargetTable::Predictions => PREDICTION_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields()
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a target field is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Copied as-is, NULL when absent
    Plain,
    /// Copied as-is, wall-clock time when absent
    Timestamp,
    /// Free-text sex label coerced to 1/0
    SexCode,
}

/// One allow-listed target field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Source column names feeding this field, in priority order
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

const fn plain(name: &'static str, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        aliases,
        kind: FieldKind::Plain,
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    plain("email", &["email"]),
    plain("password_hash", &["password_hash"]),
    plain("full_name", &["full_name"]),
    plain("role", &["role"]),
    plain("phone", &["phone"]),
    FieldSpec {
        name: "created_at",
        aliases: &["created_at"],
        kind: FieldKind::Timestamp,
    },
];

const PATIENT_FIELDS: &[FieldSpec] = &[
    plain("citizen_id", &["citizen_id"]),
    plain("full_name", &["full_name", "name"]),
    FieldSpec {
        name: "gender",
        aliases: &["gender"],
        kind: FieldKind::SexCode,
    },
    plain("date_of_birth", &["date_of_birth"]),
    plain("phone", &["phone"]),
    plain("address", &["address"]),
    plain("province", &["province"]),
    plain("condition", &["condition"]),
    plain("created_by", &["created_by"]),
    FieldSpec {
        name: "created_at",
        aliases: &["created_at"],
        kind: FieldKind::Timestamp,
    },
];

const PREDICTION_FIELDS: &[FieldSpec] = &[
    plain("patient_id", &["patient_id"]),
    plain("age", &["age"]),
    FieldSpec {
        name: "sex",
        aliases: &["sex"],
        kind: FieldKind::SexCode,
    },
    plain("cp", &["cp"]),
    plain("trestbps", &["trestbps"]),
    plain("chol", &["chol"]),
    plain("fbs", &["fbs"]),
    plain("restecg", &["restecg"]),
    plain("thalach", &["thalach"]),
    plain("exang", &["exang"]),
    plain("oldpeak", &["oldpeak"]),
    plain("slope", &["slope"]),
    plain("ca", &["ca"]),
    plain("thal", &["thal"]),
    plain("prediction", &["target", "prediction"]),
    FieldSpec {
        name: "prediction_date",
        aliases: &["recorded_at", "prediction_date"],
        kind: FieldKind::Timestamp,
    },
];

/// Failure to map one tuple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("table {0:?} is not a known import source")]
    UnknownTable(String),
    #[error("tuple has {found} values but the column list has {expected}")]
    ColumnCountMismatch { expected: usize, found: usize },
}

/// A normalized row for one target table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub table: TargetTable,
    fields: Vec<(&'static str, Literal)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Fields in target column order
    pub fn fields(&self) -> &[(&'static str, Literal)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("_table", self.table.name())?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

type Clock = Box<dyn Fn() -> NaiveDateTime>;

/// Turns (table, columns, tuple) into a [`Record`]
pub struct SchemaMapper {
    clock: Clock,
    coercion_fallbacks: u64,
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaMapper {
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Local::now().naive_local())
    }

    /// Use a custom clock for defaulted timestamps
    pub fn with_clock(clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            coercion_fallbacks: 0,
        }
    }

    /// Number of categorical values that needed best-effort coercion
    pub fn coercion_fallbacks(&self) -> u64 {
        self.coercion_fallbacks
    }

    /// Map a single tuple of `table` whose values follow `columns`
    pub fn map(
        &mut self,
        table: &str,
        columns: &[String],
        tuple: Vec<Literal>,
    ) -> Result<Record, MappingError> {
        let target = TargetTable::from_source(table)
            .ok_or_else(|| MappingError::UnknownTable(table.to_string()))?;

        if tuple.len() != columns.len() {
            return Err(MappingError::ColumnCountMismatch {
                expected: columns.len(),
                found: tuple.len(),
            });
        }

        let mut fields = Vec::with_capacity(target.fields().len());
        for spec in target.fields() {
            let source = lookup(spec, columns, &tuple);
            let value = match spec.kind {
                FieldKind::Plain => source.cloned().unwrap_or(Literal::Null),
                FieldKind::Timestamp => match source {
                    Some(v) => v.clone(),
                    // Taken per tuple, so siblings may differ
                    None => Literal::Text((self.clock)().format(TIMESTAMP_FORMAT).to_string()),
                },
                FieldKind::SexCode => match source {
                    None => Literal::Null,
                    Some(v) => match sex_code(v) {
                        Coerced::Exact(code) => code,
                        Coerced::Fallback(code) => {
                            self.coercion_fallbacks += 1;
                            warn!(
                                table = target.name(),
                                field = spec.name,
                                value = %v,
                                coerced = %code,
                                "unrecognized sex label, used best-effort coercion"
                            );
                            code
                        }
                    },
                },
            };
            fields.push((spec.name, value));
        }

        Ok(Record {
            table: target,
            fields,
        })
    }
}

/// First non-NULL value among the field's aliases
fn lookup<'a>(spec: &FieldSpec, columns: &[String], tuple: &'a [Literal]) -> Option<&'a Literal> {
    spec.aliases.iter().find_map(|alias| {
        columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(alias))
            .map(|idx| &tuple[idx])
            .filter(|v| !v.is_null())
    })
}
