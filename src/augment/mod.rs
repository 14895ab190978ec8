//! Synthetic row augmentation.
//!
//! Some hand-made dumps carry a comment announcing that the remaining rows
//! are synthetic padding up to a fixed total. When that marker is present the
//! importer asks [`SyntheticAugmenter`] to append generated tuples to the
//! statement's values block until it holds the announced number of rows.
//!
//! Generated rows:
//! - follow the statement's column order exactly
//! - use the same literal syntax as the dump (see [`Literal::to_sql`])
//! - never invent entity ids; `patient_id` cycles through ids already present
//! - carry strictly increasing timestamps starting after the last real row

mod generator;

pub use generator::{
    parse_timestamp, timestamp_at, ColumnGenerator, ColumnHistory, GenerationContext, Pick,
    TIMESTAMP_OUTPUT_FORMAT,
};

use crate::parser::{parse_tuple, split_tuples, Literal};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use thiserror::Error;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)synthetic\s+to\s+reach\s+(\d+)\s+rows").unwrap());

/// Row count announced by a synthetic-padding marker, if the dump has one
pub fn marker_target(dump: &str) -> Option<usize> {
    MARKER_RE
        .captures(dump)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Upper bound on rows generated for one statement
pub const MAX_SYNTHETIC_ROWS: usize = 100_000;

/// Why a statement could not be padded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    #[error("{needed} synthetic rows requested, limit is {limit}")]
    TooManyRows { needed: usize, limit: usize },
    #[error("timestamps for column {column} run past the supported date range")]
    TimestampOverflow { column: String },
}

/// Default first timestamp when the real rows carry none
pub fn default_anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

/// Timing of generated rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentOptions {
    /// Used when no real row has a parseable timestamp
    pub anchor: NaiveDateTime,
    /// Gap between consecutive rows
    pub step: Duration,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            step: Duration::days(1),
        }
    }
}

/// Pads a values block with generated tuples
#[derive(Debug)]
pub struct SyntheticAugmenter {
    rng: StdRng,
    options: AugmentOptions,
}

impl SyntheticAugmenter {
    /// Create an augmenter whose output is fully determined by `seed`
    pub fn new(seed: u64) -> Self {
        Self::with_options(seed, AugmentOptions::default())
    }

    pub fn with_options(seed: u64, options: AugmentOptions) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            options,
        }
    }

    /// Append `target - existing` generated tuples to `text`.
    ///
    /// `text` is a values block, optionally ending with the statement
    /// terminator, which is kept. Returns `text` unchanged when nothing is
    /// needed. Fails without generating anything when more than
    /// [`MAX_SYNTHETIC_ROWS`] rows are needed or a timestamp column would
    /// leave the representable range.
    pub fn augment(
        &mut self,
        text: &str,
        existing: usize,
        target: usize,
        columns: &[String],
    ) -> Result<String, AugmentError> {
        let needed = target.saturating_sub(existing);
        if needed == 0 {
            return Ok(text.to_string());
        }
        if needed > MAX_SYNTHETIC_ROWS {
            return Err(AugmentError::TooManyRows {
                needed,
                limit: MAX_SYNTHETIC_ROWS,
            });
        }

        let histories = collect_history(text, columns.len());
        let tuples = self.generate(needed, columns, &histories)?;

        let trimmed = text.trim_end();
        let (body, terminator) = match trimmed.strip_suffix(';') {
            Some(body) => (body.trim_end(), ";"),
            None => (trimmed, ""),
        };

        let separator = if body.ends_with(')') {
            ",\n"
        } else if body.is_empty() {
            ""
        } else {
            " "
        };

        let mut out = String::with_capacity(body.len() + tuples.len() * 64);
        out.push_str(body);
        out.push_str(separator);
        out.push_str(&tuples.join(",\n"));
        out.push_str(terminator);
        Ok(out)
    }

    /// Generate `count` tuple texts, each wrapped in parens
    fn generate(
        &mut self,
        count: usize,
        columns: &[String],
        histories: &[ColumnHistory],
    ) -> Result<Vec<String>, AugmentError> {
        let generators: Vec<ColumnGenerator> = columns
            .iter()
            .map(|c| ColumnGenerator::for_column(c))
            .collect();

        let step = self.options.step;
        let mut contexts = Vec::with_capacity(histories.len());
        for ((history, generator), column) in histories.iter().zip(&generators).zip(columns) {
            let start = match history.last_timestamp() {
                Some(last) => last.checked_add_signed(step),
                None => Some(self.options.anchor),
            };
            let start = match (*generator, start) {
                (ColumnGenerator::Timestamp, Some(start))
                    if timestamp_at(start, step, count - 1).is_some() =>
                {
                    start
                }
                (ColumnGenerator::Timestamp, _) => {
                    return Err(AugmentError::TimestampOverflow {
                        column: column.clone(),
                    })
                }
                (_, start) => start.unwrap_or(self.options.anchor),
            };
            contexts.push(GenerationContext {
                history,
                start,
                step,
            });
        }

        let tuples = (0..count)
            .map(|i| {
                let values: Vec<String> = generators
                    .iter()
                    .zip(&contexts)
                    .map(|(generator, ctx)| generator.generate(i, ctx, &mut self.rng).to_sql())
                    .collect();
                format!("({})", values.join(", "))
            })
            .collect();
        Ok(tuples)
    }
}

/// Per-column non-NULL values of the well-formed real rows
fn collect_history(text: &str, width: usize) -> Vec<ColumnHistory> {
    let mut histories = vec![ColumnHistory::default(); width];
    let block = text.trim_end().trim_end_matches(';');

    let Ok(tuples) = split_tuples(block) else {
        return histories;
    };

    for tuple in tuples {
        let Ok(values) = parse_tuple(tuple) else {
            continue;
        };
        if values.len() != width {
            continue;
        }
        for (history, value) in histories.iter_mut().zip(values) {
            if !matches!(value, Literal::Null) {
                history.values.push(value);
            }
        }
    }

    histories
}
