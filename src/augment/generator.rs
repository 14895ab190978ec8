//! Per-column value generators for synthetic rows.

use crate::parser::Literal;
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;

/// Formats accepted when reading timestamps back from real rows
const TIMESTAMP_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Format written into generated tuples
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A weighted categorical outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    Int(i64),
    Text(&'static str),
}

impl Pick {
    fn to_literal(self) -> Literal {
        match self {
            Pick::Int(n) => Literal::Integer(n),
            Pick::Text(s) => Literal::Text(s.to_string()),
        }
    }
}

const SEX_WEIGHTS: &[(Pick, u32)] = &[(Pick::Text("Nam"), 60), (Pick::Text("Nữ"), 40)];
const MOSTLY_ZERO: &[(Pick, u32)] = &[(Pick::Int(0), 2), (Pick::Int(1), 1)];
const COIN: &[(Pick, u32)] = &[(Pick::Int(0), 1), (Pick::Int(1), 1)];

/// How one column of a synthetic row is produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnGenerator {
    /// Uniform integer in `lo..=hi`
    Uniform(i64, i64),
    /// Uniform value in `lo..=hi` tenths, rendered with one decimal
    Tenths(i64, i64),
    Weighted(&'static [(Pick, u32)]),
    Constant(i64),
    /// One time step per generated row
    Timestamp,
    /// Cycle through entity ids already present in the real rows
    ExistingIds,
    /// Cycle through values of the real rows, NULL if there are none
    Reuse,
}

impl ColumnGenerator {
    /// Generator for a heart-record column name
    pub fn for_column(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "age" => ColumnGenerator::Uniform(30, 80),
            "cp" => ColumnGenerator::Uniform(0, 3),
            "trestbps" => ColumnGenerator::Uniform(100, 160),
            "chol" => ColumnGenerator::Uniform(150, 320),
            "restecg" => ColumnGenerator::Uniform(0, 2),
            "thalach" => ColumnGenerator::Uniform(90, 190),
            "slope" => ColumnGenerator::Uniform(0, 2),
            "ca" | "thal" => ColumnGenerator::Uniform(0, 3),
            "oldpeak" => ColumnGenerator::Tenths(0, 40),
            "sex" | "gender" => ColumnGenerator::Weighted(SEX_WEIGHTS),
            "fbs" | "target" | "prediction" => ColumnGenerator::Weighted(MOSTLY_ZERO),
            "exang" => ColumnGenerator::Weighted(COIN),
            "recorded_by" => ColumnGenerator::Constant(2),
            "recorded_at" | "prediction_date" | "created_at" => ColumnGenerator::Timestamp,
            "patient_id" => ColumnGenerator::ExistingIds,
            _ => ColumnGenerator::Reuse,
        }
    }
}

/// What the real rows tell us about one column
#[derive(Debug, Default, Clone)]
pub struct ColumnHistory {
    /// Non-NULL values in row order
    pub values: Vec<Literal>,
}

impl ColumnHistory {
    /// Distinct integer ids in order of first appearance
    pub fn distinct_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for v in &self.values {
            if let Some(id) = v.as_integer() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Latest parseable timestamp, scanning from the last row
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.values
            .iter()
            .rev()
            .filter_map(|v| v.as_text())
            .find_map(parse_timestamp)
    }
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Row-independent inputs for one generation pass
pub struct GenerationContext<'a> {
    pub history: &'a ColumnHistory,
    /// First synthetic timestamp
    pub start: NaiveDateTime,
    pub step: Duration,
}

impl ColumnGenerator {
    /// Produce the value for synthetic row `index`
    pub fn generate(&self, index: usize, ctx: &GenerationContext<'_>, rng: &mut StdRng) -> Literal {
        match *self {
            ColumnGenerator::Uniform(lo, hi) => Literal::Integer(rng.random_range(lo..=hi)),
            ColumnGenerator::Tenths(lo, hi) => {
                Literal::Float(rng.random_range(lo..=hi) as f64 / 10.0)
            }
            ColumnGenerator::Weighted(choices) => weighted_pick(choices, rng).to_literal(),
            ColumnGenerator::Constant(n) => Literal::Integer(n),
            ColumnGenerator::Timestamp => match timestamp_at(ctx.start, ctx.step, index) {
                Some(at) => Literal::Text(at.format(TIMESTAMP_OUTPUT_FORMAT).to_string()),
                None => Literal::Null,
            },
            ColumnGenerator::ExistingIds => {
                let ids = ctx.history.distinct_ids();
                if ids.is_empty() {
                    Literal::Integer((index % 5) as i64 + 1)
                } else {
                    Literal::Integer(ids[index % ids.len()])
                }
            }
            ColumnGenerator::Reuse => {
                let values = &ctx.history.values;
                if values.is_empty() {
                    Literal::Null
                } else {
                    values[index % values.len()].clone()
                }
            }
        }
    }
}

/// `start + step * index`, or `None` when it leaves chrono's range
pub fn timestamp_at(start: NaiveDateTime, step: Duration, index: usize) -> Option<NaiveDateTime> {
    let offset = step.checked_mul(i32::try_from(index).ok()?)?;
    start.checked_add_signed(offset)
}

fn weighted_pick(choices: &[(Pick, u32)], rng: &mut StdRng) -> Pick {
    let total: u32 = choices.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for (pick, weight) in choices {
        if roll < *weight {
            return *pick;
        }
        roll -= weight;
    }
    choices[choices.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_weighted_pick_respects_zero_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        let choices = [(Pick::Int(0), 0), (Pick::Int(1), 5)];
        for _ in 0..100 {
            assert_eq!(weighted_pick(&choices, &mut rng), Pick::Int(1));
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-11-01 08:00:00").is_some());
        assert!(parse_timestamp("2025-11-01T08:00:00").is_some());
        assert!(parse_timestamp("2025-11-01 08:00:00.123456").is_some());
        assert!(parse_timestamp("2025-11-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_timestamp_at_overflow_is_none() {
        let start = parse_timestamp("2025-11-01 08:00:00").unwrap();
        assert_eq!(
            timestamp_at(start, Duration::days(1), 2),
            parse_timestamp("2025-11-03 08:00:00")
        );
        assert!(timestamp_at(start, Duration::days(1_000_000), 100_000).is_none());
        assert!(timestamp_at(start, Duration::hours(1), usize::MAX).is_none());
    }

    #[test]
    fn test_distinct_ids_keep_first_seen_order() {
        let history = ColumnHistory {
            values: vec![
                Literal::Integer(3),
                Literal::Integer(1),
                Literal::Integer(3),
                Literal::Text("x".into()),
            ],
        };
        assert_eq!(history.distinct_ids(), vec![3, 1]);
    }

    #[test]
    fn test_unknown_column_reuses_history() {
        assert_eq!(ColumnGenerator::for_column("notes"), ColumnGenerator::Reuse);
        assert_eq!(ColumnGenerator::for_column("AGE"), ColumnGenerator::Uniform(30, 80));
    }
}
