//! Assembly of one `Statement` from a reconstructed row set, the period
//! headers inferred from page text, and the page metadata.

use log::debug;

use crate::config::ExtractorConfig;
use crate::metadata::{classify_statement, parse_metadata};
use crate::periods::extract_periods;
use crate::rows::reconstruct_rows;
use crate::schema::{LogicalRow, Statement};

/// Build a `Statement` from a located page and its normalized grid.
pub fn assemble_statement(
    title: &str,
    page_number: usize,
    page_text: &str,
    grid: &[Vec<String>],
    config: &ExtractorConfig,
) -> Statement {
    // Backends sometimes promote the first data row (the Revenues line) to
    // the table header. Grids arrive here with every row intact, so that
    // row stays first in the data, and the headers below come from the page
    // text or placeholders, never from a backend header.
    let mut rows = reconstruct_rows(grid, config);

    // Uniform value width across the statement; short rows pad with "".
    let value_width = rows.iter().map(|r| r.values.len()).max().unwrap_or(0);
    for row in &mut rows {
        row.values.resize(value_width, String::new());
    }

    let headers = build_headers(page_text, value_width, config);
    let rows = apply_row_filters(rows, &headers, config);

    let metadata = parse_metadata(page_text);
    let statement_type = classify_statement(title);

    debug!(
        "assembled '{}' from page {}: {} columns, {} rows",
        title,
        page_number,
        headers.len(),
        rows.len()
    );

    Statement {
        name: title.to_string(),
        statement_type,
        page_number,
        headers,
        rows,
        metadata,
    }
}

/// Period headers inferred from page text are applied only when enough of
/// them exist to cover the value columns (one short is tolerated, that
/// column keeps its placeholder). A partial mapping is never guessed.
fn build_headers(page_text: &str, value_width: usize, _config: &ExtractorConfig) -> Vec<String> {
    let mut headers = Vec::with_capacity(value_width + 1);
    headers.push("Description".to_string());
    for i in 1..=value_width {
        headers.push(format!("Value_{}", i));
    }

    if value_width == 0 {
        return headers;
    }

    if let Some(periods) = extract_periods(page_text) {
        if periods.len() + 1 >= value_width {
            for (i, period) in periods.into_iter().take(value_width).enumerate() {
                headers[i + 1] = period;
            }
        } else {
            debug!(
                "inferred {} period headers for {} value columns; keeping placeholders",
                periods.len(),
                value_width
            );
        }
    }

    headers
}

/// Drop rows that are artifacts of extraction rather than data: repeats of
/// the column headers captured as rows, and running page titles.
fn apply_row_filters(
    rows: Vec<LogicalRow>,
    headers: &[String],
    config: &ExtractorConfig,
) -> Vec<LogicalRow> {
    let header_words: Vec<String> = headers
        .iter()
        .flat_map(|h| h.split_whitespace())
        .map(|w| w.to_lowercase())
        .collect();

    rows.into_iter()
        .filter(|row| {
            let desc_lower = row.description.to_lowercase();
            if desc_lower.contains("consolidated statement") {
                debug!("dropping running page title row: '{}'", row.description);
                return false;
            }

            let words: Vec<&str> = desc_lower.split_whitespace().collect();
            if words.is_empty() {
                return true;
            }
            let overlapping = words
                .iter()
                .filter(|w| header_words.iter().any(|h| h == *w))
                .count();
            let overlap = overlapping as f64 / words.len() as f64;
            if overlap >= config.header_overlap_threshold {
                debug!(
                    "dropping header-repeat row: '{}' ({:.0}% overlap)",
                    row.description,
                    overlap * 100.0
                );
                return false;
            }

            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StatementType;

    fn cfg() -> ExtractorConfig {
        ExtractorConfig::default()
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    const INCOME_PAGE: &str = "Alphabet Inc.\nCONSOLIDATED STATEMENTS OF INCOME\n(In millions)\nYear Ended December 31, 2021 2022 2023\nRevenues 257,637 282,836 307,394";

    #[test]
    fn test_assembles_income_statement() {
        let statement = assemble_statement(
            "CONSOLIDATED STATEMENTS OF INCOME",
            48,
            INCOME_PAGE,
            &grid(&[
                &["Revenues", "257,637", "282,836", "307,394"],
                &["Costs and expenses:", "", "", ""],
                &["Cost of revenues", "110,939", "126,203", "133,332"],
            ]),
            &cfg(),
        );

        assert_eq!(statement.statement_type, StatementType::IncomeStatement);
        assert_eq!(statement.page_number, 48);
        assert_eq!(
            statement.headers,
            vec![
                "Description",
                "Year Ended December 31, 2021",
                "Year Ended December 31, 2022",
                "Year Ended December 31, 2023",
            ]
        );
        assert_eq!(statement.rows.len(), 3);
        assert_eq!(statement.rows[0].values, vec!["257637", "282836", "307394"]);
        // Section header padded to full width.
        assert_eq!(statement.rows[1].values, vec!["", "", ""]);
        assert_eq!(statement.metadata.company.as_deref(), Some("Alphabet Inc."));
    }

    #[test]
    fn test_placeholder_headers_when_periods_insufficient() {
        let statement = assemble_statement(
            "CONSOLIDATED BALANCE SHEETS",
            55,
            "CONSOLIDATED BALANCE SHEETS\nno period text here",
            &grid(&[&["Cash and cash equivalents", "1", "2", "3", "4"]]),
            &cfg(),
        );

        assert_eq!(
            statement.headers,
            vec!["Description", "Value_1", "Value_2", "Value_3", "Value_4"]
        );
    }

    #[test]
    fn test_one_missing_header_keeps_last_placeholder() {
        // Two inferred headers over three value columns: tolerated, the
        // uncovered column keeps its placeholder.
        let statement = assemble_statement(
            "CONSOLIDATED BALANCE SHEETS",
            55,
            "As of December 31, 2022 As of December 31, 2023",
            &grid(&[&["Cash", "1", "2", "3"]]),
            &cfg(),
        );

        assert_eq!(
            statement.headers,
            vec![
                "Description",
                "As of December 31, 2022",
                "As of December 31, 2023",
                "Value_3",
            ]
        );
    }

    #[test]
    fn test_drops_header_repeat_rows() {
        let statement = assemble_statement(
            "CONSOLIDATED STATEMENTS OF INCOME",
            48,
            INCOME_PAGE,
            &grid(&[
                &["Year Ended December 31,", "2021", "2022", "2023"],
                &["Revenues", "257,637", "282,836", "307,394"],
            ]),
            &cfg(),
        );

        assert_eq!(statement.rows.len(), 1);
        assert_eq!(statement.rows[0].description, "Revenues");
    }

    #[test]
    fn test_drops_running_page_title_rows() {
        let statement = assemble_statement(
            "CONSOLIDATED BALANCE SHEETS",
            55,
            "As of December 31, 2022 As of December 31, 2023",
            &grid(&[
                &["Consolidated Statements of Financial Position", "", ""],
                &["Cash and cash equivalents", "21,879", "24,048"],
            ]),
            &cfg(),
        );

        assert_eq!(statement.rows.len(), 1);
        assert_eq!(statement.rows[0].description, "Cash and cash equivalents");
    }

    #[test]
    fn test_promoted_revenues_row_survives_as_data() {
        let statement = assemble_statement(
            "CONSOLIDATED STATEMENTS OF INCOME",
            48,
            INCOME_PAGE,
            &grid(&[
                &["Revenues", "257,637", "282,836", "307,394"],
                &["Cost of revenues", "110,939", "126,203", "133,332"],
            ]),
            &cfg(),
        );

        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.rows[0].description, "Revenues");
        assert_eq!(statement.rows[0].values.len(), 3);
    }

    #[test]
    fn test_text_only_statement_has_description_header_only() {
        let statement = assemble_statement(
            "CONSOLIDATED BALANCE SHEETS",
            55,
            "nothing",
            &grid(&[&["ASSETS", "", ""]]),
            &cfg(),
        );

        assert_eq!(statement.headers, vec!["Description"]);
    }
}
