//! DuckDB-backed store for imported records.

use super::{LoadError, Loader, PatientUpdate, RowId};
use crate::parser::Literal;
use crate::schema::{Record, TargetTable};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection, OptionalExt};
use std::path::Path;
use tracing::debug;

const SCHEMA_SQL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;
CREATE TABLE IF NOT EXISTS users (
    user_id BIGINT PRIMARY KEY DEFAULT nextval('users_id_seq'),
    email VARCHAR UNIQUE NOT NULL,
    password_hash VARCHAR NOT NULL,
    full_name VARCHAR,
    role VARCHAR,
    phone VARCHAR,
    created_at TIMESTAMP
);

CREATE SEQUENCE IF NOT EXISTS patients_id_seq START 1;
CREATE TABLE IF NOT EXISTS patients (
    patient_id BIGINT PRIMARY KEY DEFAULT nextval('patients_id_seq'),
    citizen_id VARCHAR,
    full_name VARCHAR NOT NULL,
    gender VARCHAR,
    date_of_birth DATE,
    phone VARCHAR,
    address VARCHAR,
    province VARCHAR,
    "condition" VARCHAR,
    created_by BIGINT,
    created_at TIMESTAMP
);

CREATE SEQUENCE IF NOT EXISTS predictions_id_seq START 1;
CREATE TABLE IF NOT EXISTS predictions (
    prediction_id BIGINT PRIMARY KEY DEFAULT nextval('predictions_id_seq'),
    patient_id BIGINT,
    age INTEGER,
    sex INTEGER,
    cp INTEGER,
    trestbps DOUBLE,
    chol DOUBLE,
    fbs INTEGER,
    restecg INTEGER,
    thalach DOUBLE,
    exang INTEGER,
    oldpeak DOUBLE,
    slope INTEGER,
    ca INTEGER,
    thal INTEGER,
    prediction INTEGER,
    prediction_date TIMESTAMP
);
"#;

/// DuckDB error types that point at the store itself rather than the record
const INFRASTRUCTURE_ERROR_TYPES: &[&str] = &[
    "IO",
    "Connection",
    "Catalog",
    "Out of Memory",
    "FATAL",
    "Fatal",
];

/// A DuckDB session holding the target tables
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open (or create) a database file and make sure the tables exist
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let conn = Connection::open(path).map_err(|e| {
            LoadError::Unavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, LoadError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LoadError::Unavailable(format!("cannot open in-memory store: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LoadError> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| LoadError::Unavailable(format!("cannot create tables: {}", e)))?;
        Ok(Self { conn })
    }

    /// Underlying connection (for ad-hoc queries)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows currently in `table`
    pub fn row_count(&self, table: TargetTable) -> Result<u64, LoadError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| classify_error(table, e))?;
        Ok(count as u64)
    }

    /// Apply a partial update; returns whether a patient row changed
    pub fn update_patient(&self, id: RowId, update: &PatientUpdate) -> Result<bool, LoadError> {
        if update.is_empty() {
            return Ok(false);
        }

        let sets: Vec<String> = update
            .changes()
            .iter()
            .map(|(name, _)| format!("\"{}\" = ?", name))
            .collect();
        let sql = format!(
            "UPDATE patients SET {} WHERE patient_id = ?",
            sets.join(", ")
        );

        let mut values: Vec<Value> = update.changes().iter().map(|(_, v)| to_value(v)).collect();
        values.push(Value::BigInt(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|e| classify_error(TargetTable::Patients, e))?;
        Ok(changed > 0)
    }

    fn existing_user(&self, email: &Literal) -> Result<Option<RowId>, LoadError> {
        self.conn
            .query_row(
                "SELECT user_id FROM users WHERE email = ?",
                params_from_iter([to_value(email)]),
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| classify_error(TargetTable::Users, e))
    }
}

impl Loader for DuckDbStore {
    fn insert(&mut self, table: TargetTable, record: &Record) -> Result<RowId, LoadError> {
        if table == TargetTable::Users {
            if let Some(email) = record.get("email").filter(|v| !v.is_null()) {
                if let Some(id) = self.existing_user(email)? {
                    debug!(user_id = id, email = %email, "user already present, skipping");
                    return Ok(id);
                }
            }
        }

        let columns: Vec<String> = record
            .fields()
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table.name(),
            columns.join(", "),
            placeholders,
            id_column(table)
        );

        let values: Vec<Value> = record.fields().iter().map(|(_, v)| to_value(v)).collect();

        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| classify_error(table, e))?;
        stmt.query_row(params_from_iter(values), |row| row.get(0))
            .map_err(|e| classify_error(table, e))
    }
}

fn id_column(table: TargetTable) -> &'static str {
    match table {
        TargetTable::Users => "user_id",
        TargetTable::Patients => "patient_id",
        TargetTable::Predictions => "prediction_id",
    }
}

fn to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Integer(n) => Value::BigInt(*n),
        Literal::Float(f) => Value::Double(*f),
        Literal::Text(s) => Value::Text(s.clone()),
    }
}

fn classify_error(table: TargetTable, err: duckdb::Error) -> LoadError {
    let message = err.to_string();
    if is_infrastructure_message(&message) {
        LoadError::Unavailable(message)
    } else {
        LoadError::Rejected {
            table,
            reason: message,
        }
    }
}

/// Only the `<Type> Error:` header counts; the rest may quote record data
fn is_infrastructure_message(message: &str) -> bool {
    INFRASTRUCTURE_ERROR_TYPES.iter().any(|t| {
        message
            .strip_prefix(t)
            .is_some_and(|rest| rest.starts_with(" Error:"))
    })
}
