//! Values-block tokenizer.
//!
//! Splits the text following `VALUES` into parenthesized tuples, splits each
//! tuple into raw literal tokens, and classifies every token into a typed
//! [`Literal`]. Knows nothing about tables or columns.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Structural failure while scanning a values block or a tuple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Parenthesis depth went negative or did not return to zero
    #[error("unbalanced parentheses in values block (depth {depth} at offset {offset})")]
    UnbalancedParens { depth: i64, offset: usize },
    /// A quote opened inside a tuple was never closed
    #[error("unterminated {quote} quote in tuple")]
    UnterminatedQuote { quote: char },
}

/// A single typed scalar extracted from a tuple
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Render back into the dump's literal syntax, so that
    /// `classify(&lit.to_sql()) == lit` for every non-NaN literal.
    pub fn to_sql(&self) -> String {
        match self {
            Literal::Null => "NULL".to_string(),
            Literal::Integer(n) => n.to_string(),
            Literal::Float(f) => {
                let s = f.to_string();
                if s.contains(['.', 'e', 'E']) || !f.is_finite() {
                    s
                } else {
                    format!("{}.0", s)
                }
            }
            Literal::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Split a values block into the interiors of its top-level tuples.
///
/// Depth is tracked on every paren regardless of quoting; literals in these
/// dumps never carry unbalanced parens. A leading `VALUES` keyword is
/// ignored. Input with no opening paren yields an empty list.
pub fn split_tuples(block: &str) -> Result<Vec<&str>, ParseError> {
    let body = strip_values_keyword(block.trim());
    let bytes = body.as_bytes();

    let mut tuples = Vec::new();
    let mut depth: i64 = 0;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedParens { depth, offset: i });
                }
                if depth == 0 {
                    tuples.push(body[start..i].trim());
                    // Skip separators before the next group
                    while i + 1 < bytes.len()
                        && matches!(bytes[i + 1], b',' | b' ' | b'\t' | b'\r' | b'\n')
                    {
                        i += 1;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    if depth != 0 {
        return Err(ParseError::UnbalancedParens {
            depth,
            offset: bytes.len(),
        });
    }

    Ok(tuples)
}

fn strip_values_keyword(block: &str) -> &str {
    match block.get(..6) {
        Some(head) if head.eq_ignore_ascii_case("VALUES") => &block[6..],
        _ => block,
    }
}

/// Split one tuple interior into trimmed raw literal tokens.
///
/// Commas inside `'...'` or `"..."` do not separate fields. A doubled active
/// quote character is an escape and is kept verbatim for [`classify`].
pub fn split_fields(tuple: &str) -> Result<Vec<String>, ParseError> {
    let chars: Vec<char> = tuple.chars().collect();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            Some(q) if c == q => {
                current.push(c);
                if chars.get(i + 1) == Some(&q) {
                    current.push(q);
                    i += 1;
                } else {
                    quote = None;
                }
            }
            _ => current.push(c),
        }
        i += 1;
    }

    if let Some(q) = quote {
        return Err(ParseError::UnterminatedQuote { quote: q });
    }

    if !current.is_empty() {
        fields.push(current.trim().to_string());
    }

    Ok(fields)
}

/// Classify a raw token into a [`Literal`]. Never fails.
pub fn classify(raw: &str) -> Literal {
    let token = raw.trim();

    if token.eq_ignore_ascii_case("NULL") {
        return Literal::Null;
    }

    // NVARCHAR prefix: keep the quote, drop the N
    let unprefixed = if token.starts_with("N'") || token.starts_with("n'") {
        &token[1..]
    } else {
        token
    };

    if unprefixed.len() >= 2 && unprefixed.starts_with('\'') && unprefixed.ends_with('\'') {
        let inner = &unprefixed[1..unprefixed.len() - 1];
        return Literal::Text(inner.replace("''", "'"));
    }

    // Integers take an optional `-` only; `+5` falls through to the float rule
    if !token.starts_with('+') {
        if let Ok(n) = token.parse::<i64>() {
            return Literal::Integer(n);
        }
    }

    if looks_numeric(token) {
        if let Ok(f) = token.parse::<f64>() {
            return Literal::Float(f);
        }
    }

    Literal::Text(token.to_string())
}

/// Guard against `f64::from_str` accepting words like `inf` or `NaN`
fn looks_numeric(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
}

/// Split and classify a tuple in one step
pub fn parse_tuple(tuple: &str) -> Result<Vec<Literal>, ParseError> {
    Ok(split_fields(tuple)?.iter().map(|f| classify(f)).collect())
}
