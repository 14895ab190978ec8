//! Run-level error policy.
//!
//! Every failure raised while importing is reduced to an [`ErrorKind`]; the
//! kind alone decides whether the run skips the affected unit or stops.

use crate::loader::LoadError;
use crate::parser::ParseError;
use crate::schema::MappingError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unbalanced parens (statement skipped) or unterminated quote (tuple skipped)
    StructuralParse,
    /// Statement for a table outside the import set
    UnknownTable,
    /// Tuple width differs from the column list
    ColumnCountMismatch,
    /// Store refused a record
    LoadRejected,
    /// Store is unreachable
    LoadUnavailable,
}

/// What the run does after an error of a given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SkipAndContinue,
    AbortRun,
}

impl ErrorKind {
    pub fn action(self) -> Action {
        match self {
            ErrorKind::StructuralParse
            | ErrorKind::UnknownTable
            | ErrorKind::ColumnCountMismatch
            | ErrorKind::LoadRejected => Action::SkipAndContinue,
            ErrorKind::LoadUnavailable => Action::AbortRun,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::StructuralParse => "structural_parse",
            ErrorKind::UnknownTable => "unknown_table",
            ErrorKind::ColumnCountMismatch => "column_count_mismatch",
            ErrorKind::LoadRejected => "load_rejected",
            ErrorKind::LoadUnavailable => "load_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&ParseError> for ErrorKind {
    fn from(_: &ParseError) -> Self {
        ErrorKind::StructuralParse
    }
}

impl From<&MappingError> for ErrorKind {
    fn from(err: &MappingError) -> Self {
        match err {
            MappingError::UnknownTable(_) => ErrorKind::UnknownTable,
            MappingError::ColumnCountMismatch { .. } => ErrorKind::ColumnCountMismatch,
        }
    }
}

impl From<&LoadError> for ErrorKind {
    fn from(err: &LoadError) -> Self {
        match err {
            LoadError::Rejected { .. } => ErrorKind::LoadRejected,
            LoadError::Unavailable(_) => ErrorKind::LoadUnavailable,
        }
    }
}
