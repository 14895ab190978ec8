//! Categorical coercion of sex/gender labels.

use crate::parser::Literal;

const MALE_LABELS: &[&str] = &["nam", "male"];
const FEMALE_LABELS: &[&str] = &["nữ", "nu", "female"];

/// Outcome of a coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Value matched a known label family or already was a code
    Exact(Literal),
    /// Value was not recognized; carries the best-effort result
    Fallback(Literal),
}

/// Map a sex label to `1` (male family) or `0` (female family).
///
/// Integer codes and NULL pass through. Anything else is parsed as an
/// integer if possible, otherwise left untouched; both count as fallbacks.
pub fn sex_code(value: &Literal) -> Coerced {
    match value {
        Literal::Null | Literal::Integer(_) => Coerced::Exact(value.clone()),
        Literal::Text(label) => {
            let normalized = label.trim().to_lowercase();
            if MALE_LABELS.contains(&normalized.as_str()) {
                Coerced::Exact(Literal::Integer(1))
            } else if FEMALE_LABELS.contains(&normalized.as_str()) {
                Coerced::Exact(Literal::Integer(0))
            } else if let Ok(n) = normalized.parse::<i64>() {
                Coerced::Fallback(Literal::Integer(n))
            } else {
                Coerced::Fallback(value.clone())
            }
        }
        Literal::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            Coerced::Fallback(Literal::Integer(*f as i64))
        }
        Literal::Float(_) => Coerced::Fallback(value.clone()),
    }
}
