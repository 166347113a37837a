//! Reconstruction of logical rows from the ragged grids that table
//! extraction backends emit.
//!
//! Two failure modes dominate real statement pages: long descriptions wrap
//! across several source rows that only carry numbers on the final line,
//! and short trailing words ("outstanding") land on a row of their own.
//! Two ordered passes target them independently: pass 1 merges long
//! numberless fragments *down* into the next row that carries values,
//! pass 2 merges short lowercase fragments *up* into the previous row.
//! Section header rows ("ASSETS", "Current liabilities:") are recognized
//! first and never participate in either merge.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractorConfig;
use crate::numeric::{cell_is_numeric, classify_token, split_row, Token};
use crate::schema::LogicalRow;

/// Last words that mark a phrase as grammatically unfinished, ruling it out
/// as a standalone section header.
const CONTINUATION_WORDS: &[&str] = &[
    "and", "or", "the", "of", "in", "to", "for", "with", "by", "from",
];

static ALL_CAPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\s]+$").unwrap());
static ASSETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)assets?$").unwrap());
static LIABILITIES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)liabilit(y|ies)$").unwrap());
static EQUITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)equity$").unwrap());

/// Whether a numberless description reads as a structural section label.
pub fn is_section_header(text: &str, config: &ExtractorConfig) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let starts_upper = text.chars().next().is_some_and(|c| c.is_uppercase());
    let words: Vec<&str> = text.split_whitespace().collect();

    if starts_upper {
        if text.ends_with(':') {
            return true;
        }

        // A short, complete, multi-word phrase stands alone as a header.
        if words.len() > 1
            && words.len() < config.word_tolerance
            && !text.ends_with(',')
            && !text.ends_with(';')
        {
            let last = words.last().unwrap_or(&"").to_lowercase();
            if !CONTINUATION_WORDS.contains(&last.as_str()) {
                return true;
            }
        }
    }

    // Structural balance-sheet labels.
    ALL_CAPS_RE.is_match(text)
        || ASSETS_RE.is_match(text)
        || LIABILITIES_RE.is_match(text)
        || EQUITY_RE.is_match(text)
}

/// Whether a pass-1 output row reads as a trailing fragment of the row
/// above it: short, and starting lowercase or entirely lowercase.
pub fn should_merge_up(text: &str, config: &ExtractorConfig) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let word_count = text.split_whitespace().count();
    if word_count >= config.word_tolerance {
        return false;
    }

    if text.chars().next().is_some_and(|c| c.is_lowercase()) {
        return true;
    }

    // Entirely lowercase (no uppercase letters, at least one letter).
    text.chars().any(|c| c.is_alphabetic()) && !text.chars().any(|c| c.is_uppercase())
}

/// A raw grid row reduced to one of three shapes before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowShape {
    /// Nothing usable in the row.
    Blank,
    /// A description plus at least one recognized value slot.
    Data(LogicalRow),
    /// Description text with no qualifying values.
    Text(String),
}

/// Reduce one raw row to its shape. Trailing placeholder cells are
/// stripped first. Multi-cell rows keep their first cell as the
/// description; single-cell rows are re-split token-wise from the right.
fn assess_row(cells: &[String]) -> RowShape {
    let mut trimmed: Vec<&str> = cells.iter().map(|c| c.trim()).collect();
    while trimmed.last().is_some_and(|c| c.is_empty()) {
        trimmed.pop();
    }
    if trimmed.is_empty() {
        return RowShape::Blank;
    }

    if trimmed.len() == 1 {
        let text = trimmed[0];
        let tokens: Vec<&str> = text.split_whitespace().collect();
        return match split_row(&tokens) {
            Some(split) => RowShape::Data(LogicalRow::new(split.description, split.values)),
            None => RowShape::Text(text.to_string()),
        };
    }

    let description = trimmed[0].to_string();
    let value_cells = &trimmed[1..];

    let any_numeric = value_cells
        .iter()
        .any(|cell| cell_is_numeric(cell) || matches!(classify_token(cell), Token::Empty));

    if !any_numeric {
        // Stray text in value columns folds into the description.
        let mut text = description;
        for cell in value_cells {
            if !cell.is_empty() {
                text.push(' ');
                text.push_str(cell);
            }
        }
        return RowShape::Text(text);
    }

    let values: Vec<String> = value_cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                String::new()
            } else {
                match classify_token(cell) {
                    token if token.is_numeric() => token.into_value(),
                    Token::Text(t) => t,
                    _ => String::new(),
                }
            }
        })
        .collect();

    if description.is_empty() {
        // Values with no description cannot anchor a line item; kept as a
        // data row so a preceding fragment can still claim them.
        return RowShape::Data(LogicalRow::new(String::new(), values));
    }

    RowShape::Data(LogicalRow::new(description, values))
}

/// Pass 1: walk the raw grid, emitting data rows and section headers as-is
/// and merging long numberless fragments down into the next valued row.
fn merge_down(grid: &[Vec<String>], config: &ExtractorConfig) -> Vec<LogicalRow> {
    let shapes: Vec<RowShape> = grid.iter().map(|cells| assess_row(cells)).collect();
    let mut out = Vec::with_capacity(shapes.len());
    let mut i = 0;

    while i < shapes.len() {
        match &shapes[i] {
            RowShape::Blank => {
                i += 1;
            }
            RowShape::Data(row) => {
                out.push(row.clone());
                i += 1;
            }
            RowShape::Text(text) => {
                if is_section_header(text, config) {
                    out.push(LogicalRow::text_only(text.clone()));
                    i += 1;
                    continue;
                }

                let word_count = text.split_whitespace().count();
                if word_count < config.word_tolerance {
                    // Short numberless text; pass 2 decides whether it
                    // belongs to the row above.
                    out.push(LogicalRow::text_only(text.clone()));
                    i += 1;
                    continue;
                }

                // Long wrapped description: scan forward for the row that
                // carries its values, stopping at the next section header.
                let mut description = text.clone();
                let mut merged = false;
                let mut j = i + 1;
                while j < shapes.len() {
                    match &shapes[j] {
                        RowShape::Blank => {}
                        RowShape::Text(t) => {
                            if is_section_header(t, config) {
                                break;
                            }
                            description.push(' ');
                            description.push_str(t);
                        }
                        RowShape::Data(row) => {
                            if !row.description.is_empty() {
                                description.push(' ');
                                description.push_str(&row.description);
                            }
                            debug!(
                                "merged {} fragment row(s) down into valued row at index {}",
                                j - i,
                                j
                            );
                            out.push(LogicalRow::new(description.clone(), row.values.clone()));
                            merged = true;
                            break;
                        }
                    }
                    j += 1;
                }

                if merged {
                    i = j + 1;
                } else {
                    // No valued row before the next header or end of table;
                    // keep the fragment itself, unconsumed rows follow.
                    out.push(LogicalRow::text_only(text.clone()));
                    i += 1;
                }
            }
        }
    }

    out
}

/// Pass 2: fold short lowercase continuation rows into the previous row's
/// description. Section headers are never extended, and rows carrying
/// values are never consumed.
fn merge_up(rows: Vec<LogicalRow>, config: &ExtractorConfig) -> Vec<LogicalRow> {
    let mut out: Vec<LogicalRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let mergeable = !row.has_values() && should_merge_up(&row.description, config);

        if mergeable {
            if let Some(prev) = out.last_mut() {
                let prev_is_header =
                    !prev.has_values() && is_section_header(&prev.description, config);
                if !prev_is_header {
                    debug!("merged trailing fragment '{}' up", row.description);
                    prev.description.push(' ');
                    prev.description.push_str(row.description.trim());
                    continue;
                }
            }
        }

        out.push(row);
    }

    out
}

/// Reconstruct logical rows from a normalized raw grid. Runs the two merge
/// passes in order; pass 2 operates on pass 1's already-merged output.
pub fn reconstruct_rows(grid: &[Vec<String>], config: &ExtractorConfig) -> Vec<LogicalRow> {
    let merged_down = merge_down(grid, config);
    let rows = merge_up(merged_down, config);
    debug!(
        "reconstructed {} logical rows from {} raw rows",
        rows.len(),
        grid.len()
    );
    rows
}
