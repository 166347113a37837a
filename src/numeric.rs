//! Classification of the whitespace-delimited tokens that make up a raw
//! table row, and the right-to-left split that separates a row's
//! description from its period values.
//!
//! Accounting conventions handled here: negatives rendered in parentheses
//! (`(3,514)` = -3514), thousands separators, a leading `$`, and a family
//! of dash glyphs standing in for "no value this period".

use once_cell::sync::Lazy;
use regex::Regex;

/// Dash glyphs that extraction backends emit for an empty cell.
const DASH_GLYPHS: &[&str] = &["\u{2014}", "-", "--", "\u{2013}", "\u{2015}"];

static BRACKET_CONTENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d,]+$").unwrap());
static PLAIN_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());
static CELL_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[\d,]*\.?\d+$").unwrap());

/// One whitespace-delimited fragment of a row, tagged during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Part of the description.
    Text(String),
    /// A plain numeric value, commas stripped.
    Number(String),
    /// A bracketed negative, commas stripped, `-` prefixed.
    Negative(String),
    /// A dash placeholder; renders as an empty value slot.
    Empty,
}

impl Token {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Token::Text(_))
    }

    /// The value string this token contributes to a row's value list.
    pub fn into_value(self) -> String {
        match self {
            Token::Number(v) | Token::Negative(v) => v,
            Token::Empty => String::new(),
            Token::Text(t) => t,
        }
    }
}

/// Classify a single token. A leading `$` is not significant and is
/// stripped before classification.
pub fn classify_token(raw: &str) -> Token {
    let token = raw.trim().trim_start_matches('$');

    if token.is_empty() {
        return Token::Text(raw.trim().to_string());
    }

    if DASH_GLYPHS.contains(&token) {
        return Token::Empty;
    }

    // Bracketed negative: parens must delimit the whole token and wrap only
    // digits and commas.
    if token.starts_with('(') && token.ends_with(')') && token.len() > 2 {
        let inner = &token[1..token.len() - 1];
        if BRACKET_CONTENT_RE.is_match(inner) {
            return Token::Negative(format!("-{}", inner.replace(',', "")));
        }
        return Token::Text(raw.trim().to_string());
    }

    // Plain number: no parens allowed anywhere, commas tolerated.
    if !token.contains('(') && !token.contains(')') {
        let stripped = token.replace(',', "");
        if PLAIN_NUMBER_RE.is_match(&stripped) {
            return Token::Number(stripped);
        }
    }

    Token::Text(raw.trim().to_string())
}

/// A row split into description text and ordered period values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    pub description: String,
    pub values: Vec<String>,
}

/// Split a row's tokens into description and trailing values by scanning
/// right to left and stopping at the first non-numeric token.
///
/// Returns `None` when no numeric token trails the row, or when taking the
/// numeric suffix would leave no description at all; callers keep such rows
/// as text-only rather than dropping them.
pub fn split_row(tokens: &[&str]) -> Option<SplitRow> {
    if tokens.is_empty() {
        return None;
    }

    let mut split_at = tokens.len();
    let mut values_rev: Vec<String> = Vec::new();

    for (i, raw) in tokens.iter().enumerate().rev() {
        let token = classify_token(raw);
        if token.is_numeric() {
            values_rev.push(token.into_value());
            split_at = i;
        } else {
            break;
        }
    }

    if values_rev.is_empty() || split_at == 0 {
        return None;
    }

    values_rev.reverse();
    Some(SplitRow {
        description: tokens[..split_at].join(" "),
        values: values_rev,
    })
}

/// Whether a single raw grid cell holds a numeric value. Used by the row
/// merger to decide if a fragment row carries any numbers at all.
pub fn cell_is_numeric(cell: &str) -> bool {
    let value = cell.trim();
    if value.is_empty() {
        return false;
    }

    if value.starts_with('(') && value.ends_with(')') && value.len() > 2 {
        return BRACKET_CONTENT_RE.is_match(&value[1..value.len() - 1]);
    }

    let stripped = value.replace(',', "").replace('$', "");
    CELL_NUMBER_RE.is_match(&stripped)
}

/// Whether any token of a description line reads as numeric.
pub fn text_has_numeric_token(text: &str) -> bool {
    text.split_whitespace()
        .any(|token| classify_token(token).is_numeric())
}

/// Normalize a cell string to a float for validation arithmetic.
/// Parenthesized values are negative; `$` and commas are stripped;
/// anything unparsable contributes `0.0`.
pub fn normalize_amount(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "nan" {
        return 0.0;
    }

    let negative = trimmed.contains('(') && trimmed.contains(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')'))
        .collect();

    match cleaned.trim().parse::<f64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0.0,
    }
}
