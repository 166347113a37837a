//! Best-effort metadata extraction from a statement page's text: the
//! company name, the statement classification, the reporting periods
//! mentioned, and parenthetical unit-of-measure annotations.
//!
//! Each extractor is an ordered list of `(pattern, tag)` pairs evaluated by
//! a pure first-match function. Absence of any field is normal.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::schema::{Metadata, StatementType};

static COMPANY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Capitalized name carrying a legal-entity suffix.
        Regex::new(r"^([A-Z][A-Za-z&.,'\- ]+?\s(?i:inc|corp|llc|ltd)\.?)\s*$").unwrap(),
        // Name running into a "CONSOLIDATED ..." title on the same line.
        Regex::new(r"^([A-Z][A-Za-z&.,'\- ]+?)\s+CONSOLIDATED\b").unwrap(),
        // Bare all-caps line.
        Regex::new(r"^([A-Z][A-Z&.,'\- ]{2,})$").unwrap(),
    ]
});

static STATEMENT_PATTERNS: Lazy<Vec<(Regex, StatementType)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)statements?\s+of\s+(income|operations)|income\s+statements?")
                .unwrap(),
            StatementType::IncomeStatement,
        ),
        (
            Regex::new(r"(?i)balance\s+sheets?|statements?\s+of\s+financial\s+position").unwrap(),
            StatementType::BalanceSheet,
        ),
        (
            Regex::new(r"(?i)statements?\s+of\s+cash\s+flows?|cash\s+flow\s+statements?").unwrap(),
            StatementType::CashFlow,
        ),
        (
            Regex::new(
                r"(?i)statements?\s+of\s+(stockholders.?|shareholders.?)\s+equity|statements?\s+of\s+changes\s+in\s+equity",
            )
            .unwrap(),
            StatementType::Equity,
        ),
    ]
});

static PERIOD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(
            r"(?i)(three|six|nine|twelve)\s+months\s+ended\s+\w+\s+\d{1,2},\s+(19|20)\d{2}",
        )
        .unwrap(),
        Regex::new(r"(?i)(fiscal\s+)?years?\s+ended\s+\w+\s+\d{1,2},\s+(19|20)\d{2}").unwrap(),
        Regex::new(r"(?i)quarter\s+ended\s+\w+\s+\d{1,2},\s+(19|20)\d{2}").unwrap(),
        Regex::new(r"(?i)as\s+of\s+\w+\s+\d{1,2},\s+(19|20)\d{2}").unwrap(),
        Regex::new(
            r"(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+(19|20)\d{2}",
        )
        .unwrap(),
        Regex::new(r"\b(19|20)\d{2}\b").unwrap(),
    ]
});

static UNIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\(in\s+(thousands|millions|billions)[^)]*\)").unwrap(),
        Regex::new(r"(?i)\(amounts\s+in[^)]*\)").unwrap(),
        Regex::new(r"(?i)\([^)]{0,40}(?:US\$|USD|U\.S\.\s+dollars|dollars)[^)]*\)").unwrap(),
        Regex::new(r"(?i)\(unaudited\)").unwrap(),
    ]
});

/// First line near the top of the page that reads as a company name.
pub fn extract_company(page_text: &str) -> Option<String> {
    for line in page_text.lines().take(10) {
        let line = line.trim();
        if line.is_empty() || line.starts_with("CONSOLIDATED") {
            continue;
        }
        for pattern in COMPANY_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(line) {
                if let Some(name) = captures.get(1) {
                    return Some(name.as_str().trim().to_string());
                }
            }
        }
    }
    None
}

/// Classify the statement by its title text; first matching pattern wins.
pub fn classify_statement(text: &str) -> StatementType {
    for (pattern, statement_type) in STATEMENT_PATTERNS.iter() {
        if pattern.is_match(text) {
            return *statement_type;
        }
    }
    StatementType::Unknown
}

/// Union of all period phrases mentioned on the page, de-duplicated.
pub fn extract_period_phrases(page_text: &str) -> BTreeSet<String> {
    let mut periods = BTreeSet::new();
    for pattern in PERIOD_PATTERNS.iter() {
        for m in pattern.find_iter(page_text) {
            periods.insert(m.as_str().trim().to_string());
        }
    }
    periods
}

/// Union of all parenthetical unit/scale/currency/audit annotations.
pub fn extract_units(page_text: &str) -> BTreeSet<String> {
    let mut units = BTreeSet::new();
    for pattern in UNIT_PATTERNS.iter() {
        for m in pattern.find_iter(page_text) {
            units.insert(m.as_str().trim().to_string());
        }
    }
    units
}

/// Run every extractor over the page text.
pub fn parse_metadata(page_text: &str) -> Metadata {
    Metadata {
        company: extract_company(page_text),
        statement_type: classify_statement(page_text),
        periods: extract_period_phrases(page_text),
        units: extract_units(page_text),
    }
}
