//! Inference of reporting-period column headers from raw page text.
//!
//! Period labels ("Year Ended December 31, 2023") are rendered above the
//! table and usually do not survive grid extraction as cells, so they are
//! recovered from the page text independently and joined to the table by
//! the assembler. The layouts vary enough that recovery is layered: paired
//! prefix/date headers, a shared prefix over a bare year row, then
//! progressively blunter year scans.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bended\b|\bas of\b").unwrap());
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(as of|ended)\b").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+(19|20)\d{2}",
    )
    .unwrap()
});
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static BARE_YEARS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*((19|20)\d{2}[\s,]*)+$").unwrap());
static YEAR_ENDED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Year Ended December 31, ((19|20)\d{2})").unwrap());

/// Infer the period column headers from a statement page's text.
/// Returns `None` only when the page carries no year or date evidence at
/// all.
pub fn extract_periods(page_text: &str) -> Option<Vec<String>> {
    let lines: Vec<&str> = page_text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if !ANCHOR_RE.is_match(line) {
            continue;
        }

        // The anchor line plus up to two following lines form the header
        // material.
        let following: Vec<&str> = lines[i + 1..].iter().take(2).copied().collect();
        let mut material = line.to_string();
        for follow in &following {
            material.push(' ');
            material.push_str(follow);
        }

        if let Some(headers) = paired_prefix_headers(&material) {
            debug!("periods: paired prefix/date headers: {:?}", headers);
            return Some(headers);
        }

        if let Some(headers) = shared_prefix_over_year_row(line, &following) {
            debug!("periods: shared prefix over bare year row: {:?}", headers);
            return Some(headers);
        }

        if let Some(headers) = prefix_and_trailing_matches(&material) {
            debug!("periods: prefix with trailing years/dates: {:?}", headers);
            return Some(headers);
        }

        // Anchored but no year/date evidence in the header material; keep
        // scanning later lines rather than giving up on the page.
    }

    whole_page_fallback(page_text)
}

/// Multiple `As of`/`Ended` prefixes paired one-to-one with explicit dates:
/// one header per pair.
fn paired_prefix_headers(material: &str) -> Option<Vec<String>> {
    let prefixes: Vec<&str> = PREFIX_RE
        .find_iter(material)
        .map(|m| m.as_str())
        .collect();
    let dates: Vec<&str> = DATE_RE.find_iter(material).map(|m| m.as_str()).collect();

    if prefixes.len() >= 2 && prefixes.len() == dates.len() {
        Some(
            prefixes
                .iter()
                .zip(dates.iter())
                .map(|(prefix, date)| format!("{} {}", prefix, date))
                .collect(),
        )
    } else {
        None
    }
}

/// Anchor line and first follow-up line form a shared prefix; the second
/// follow-up line is nothing but 4-digit years, one per column.
fn shared_prefix_over_year_row(anchor: &str, following: &[&str]) -> Option<Vec<String>> {
    if following.len() != 2 || !BARE_YEARS_LINE_RE.is_match(following[1]) {
        return None;
    }

    let prefix = format!("{} {}", anchor.trim(), following[0].trim());
    let headers: Vec<String> = YEAR_RE
        .find_iter(following[1])
        .map(|year| format!("{} {}", prefix, year.as_str()))
        .collect();

    if headers.is_empty() {
        None
    } else {
        Some(headers)
    }
}

/// All years (or, failing that, explicit dates) anywhere in the header
/// material; the text before the first match is the shared prefix.
fn prefix_and_trailing_matches(material: &str) -> Option<Vec<String>> {
    let matches: Vec<(usize, &str)> = {
        let years: Vec<(usize, &str)> = YEAR_RE
            .find_iter(material)
            .map(|m| (m.start(), m.as_str()))
            .collect();
        if years.is_empty() {
            DATE_RE
                .find_iter(material)
                .map(|m| (m.start(), m.as_str()))
                .collect()
        } else {
            years
        }
    };

    let (first_start, _) = *matches.first()?;
    let prefix = material[..first_start].trim();

    Some(
        matches
            .iter()
            .map(|(_, text)| {
                if prefix.is_empty() {
                    text.to_string()
                } else {
                    format!("{} {}", prefix, text)
                }
            })
            .collect(),
    )
}

/// No "ended"/"as of" anchor anywhere: look for fully-spelled
/// "Year Ended December 31, YYYY" labels, then synthesize them from bare
/// years as a last resort.
fn whole_page_fallback(page_text: &str) -> Option<Vec<String>> {
    let spelled: Vec<String> = YEAR_ENDED_RE
        .find_iter(page_text)
        .map(|m| m.as_str().to_string())
        .collect();
    if !spelled.is_empty() {
        debug!("periods: whole-page spelled labels: {:?}", spelled);
        return Some(spelled);
    }

    let mut years: Vec<String> = Vec::new();
    for m in YEAR_RE.find_iter(page_text) {
        let year = m.as_str().to_string();
        if !years.contains(&year) {
            years.push(year);
        }
    }

    if years.len() >= 2 {
        let headers: Vec<String> = years
            .iter()
            .map(|year| format!("Year Ended December 31, {}", year))
            .collect();
        debug!("periods: synthesized labels from bare years: {:?}", headers);
        return Some(headers);
    }

    None
}
