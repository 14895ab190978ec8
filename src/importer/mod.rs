//! Import orchestration.
//!
//! Drives dump text through extraction, optional synthetic padding, value
//! parsing, schema mapping and loading, strictly in order: batch by batch,
//! statement by statement, tuple by tuple. Failures are routed through the
//! [`ErrorKind`] policy table; only an unreachable store stops the run.

mod policy;
mod sources;
mod summary;

pub use policy::{Action, ErrorKind};
pub use sources::{read_dump, secondary_files};
pub use summary::ImportSummary;

use crate::augment::{marker_target, SyntheticAugmenter};
use crate::loader::Loader;
use crate::parser::{self, parse_tuple, split_tuples, Statement};
use crate::schema::{SchemaMapper, TargetTable};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Fatal import failure
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid file pattern {0}")]
    Pattern(String),
    #[error("import aborted ({kind}): {message}")]
    Aborted { kind: ErrorKind, message: String },
}

/// Synthetic padding applied to one source table
#[derive(Debug)]
pub struct AugmentPlan {
    /// Source table name, compared case-insensitively
    pub table: String,
    pub augmenter: SyntheticAugmenter,
}

/// Runs dumps into a [`Loader`] and keeps the [`ImportSummary`]
pub struct Importer<'a, L: Loader> {
    loader: &'a mut L,
    mapper: SchemaMapper,
    augment: Option<AugmentPlan>,
    summary: ImportSummary,
}

impl<'a, L: Loader> Importer<'a, L> {
    pub fn new(loader: &'a mut L) -> Self {
        Self {
            loader,
            mapper: SchemaMapper::new(),
            augment: None,
            summary: ImportSummary::new(),
        }
    }

    pub fn with_mapper(mut self, mapper: SchemaMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Pad the first `table` statement of marked dumps with synthetic rows
    pub fn with_augmentation(
        mut self,
        table: impl Into<String>,
        augmenter: SyntheticAugmenter,
    ) -> Self {
        self.augment = Some(AugmentPlan {
            table: table.into(),
            augmenter,
        });
        self
    }

    /// Import the primary dump, then every `*.sql` file of `data_dir`
    pub fn import_sources(&mut self, dump: &Path, data_dir: &Path) -> Result<(), ImportError> {
        self.import_file(dump)?;
        for path in secondary_files(data_dir)? {
            self.import_file(&path)?;
        }
        Ok(())
    }

    /// Import one dump file; a missing file is not an error
    pub fn import_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let Some(content) = read_dump(path)? else {
            return Ok(());
        };
        info!(path = %path.display(), bytes = content.len(), "importing dump");
        self.summary.files += 1;
        self.import_dump(&content)
    }

    /// Import dump text already in memory
    pub fn import_dump(&mut self, dump: &str) -> Result<(), ImportError> {
        let mut statements = parser::extract(dump);
        self.pad_synthetic(dump, &mut statements);

        for stmt in &statements {
            self.import_statement(stmt)?;
        }
        Ok(())
    }

    /// Close the run and hand back the summary
    pub fn finish(mut self) -> ImportSummary {
        self.summary.coercion_warnings = self.mapper.coercion_fallbacks();
        self.summary
    }

    fn pad_synthetic(&mut self, dump: &str, statements: &mut [Statement]) {
        let Some(plan) = self.augment.as_mut() else {
            return;
        };
        let Some(target) = marker_target(dump) else {
            return;
        };
        let Some(stmt) = statements
            .iter_mut()
            .find(|s| s.table.eq_ignore_ascii_case(&plan.table))
        else {
            warn!(table = %plan.table, "synthetic marker present but no matching statement");
            return;
        };

        let existing = match split_tuples(&stmt.values_block) {
            Ok(tuples) => tuples.len(),
            Err(e) => {
                warn!(table = %stmt.table, error = %e, "cannot count rows, synthetic padding skipped");
                return;
            }
        };

        match plan
            .augmenter
            .augment(&stmt.values_block, existing, target, &stmt.columns)
        {
            Ok(block) => stmt.values_block = block,
            Err(e) => {
                warn!(table = %stmt.table, error = %e, "synthetic padding skipped");
                return;
            }
        }
        info!(
            table = %stmt.table,
            existing,
            target,
            added = target.saturating_sub(existing),
            "padded statement with synthetic rows"
        );
    }

    fn import_statement(&mut self, stmt: &Statement) -> Result<(), ImportError> {
        let Some(table) = TargetTable::from_source(&stmt.table) else {
            return self.on_error(ErrorKind::UnknownTable, &stmt.table, "table not imported");
        };

        let tuples = match split_tuples(&stmt.values_block) {
            Ok(tuples) => tuples,
            Err(e) => return self.on_error(ErrorKind::from(&e), &stmt.table, e),
        };

        for (idx, tuple) in tuples.into_iter().enumerate() {
            let values = match parse_tuple(tuple) {
                Ok(values) => values,
                Err(e) => {
                    self.on_error(ErrorKind::from(&e), &format!("{} row {}", stmt.table, idx), e)?;
                    continue;
                }
            };

            let record = match self.mapper.map(&stmt.table, &stmt.columns, values) {
                Ok(record) => record,
                Err(e) => {
                    self.on_error(ErrorKind::from(&e), &format!("{} row {}", stmt.table, idx), e)?;
                    continue;
                }
            };

            match self.loader.insert(table, &record) {
                Ok(_) => self.summary.record_loaded(table),
                Err(e) => {
                    self.on_error(ErrorKind::from(&e), &format!("{} row {}", stmt.table, idx), e)?
                }
            }
        }

        Ok(())
    }

    /// Apply the policy table to one failure
    fn on_error(
        &mut self,
        kind: ErrorKind,
        location: &str,
        err: impl Display,
    ) -> Result<(), ImportError> {
        match kind.action() {
            Action::SkipAndContinue => {
                self.summary.record_skip(kind);
                warn!(kind = %kind, location, error = %err, "skipped");
                Ok(())
            }
            Action::AbortRun => Err(ImportError::Aborted {
                kind,
                message: err.to_string(),
            }),
        }
    }
}
