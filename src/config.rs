use serde::{Deserialize, Serialize};

/// Tunable thresholds for the extraction pipeline.
///
/// Every numeric threshold here came out of empirical tuning against real
/// report documents rather than a formal derivation, so they are carried as
/// configuration defaults instead of hard-coded constants. One immutable
/// instance is passed by reference into each pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Word-count boundary between a mergeable fragment and a standalone
    /// description. Rows shorter than this are candidates for merge-up;
    /// rows at or above it with no numbers are candidates for merge-down.
    pub word_tolerance: usize,

    /// Pages with at least this many words are dense prose, never a
    /// statement page.
    pub prose_word_limit: usize,

    /// Fraction of a row's words that must also appear in the column
    /// headers for the row to be dropped as a mis-captured header repeat.
    pub header_overlap_threshold: f64,

    /// Absolute tolerance (in currency units) when reconciling a re-summed
    /// balance-sheet total against the reported total.
    pub balance_tolerance: f64,

    /// First page (1-indexed) considered when locating a statement. Front
    /// matter and tables of contents live below this.
    pub min_page: usize,

    /// Statement titles searched, in document order.
    pub statement_titles: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            word_tolerance: 15,
            prose_word_limit: 350,
            header_overlap_threshold: 0.5,
            balance_tolerance: 1000.0,
            min_page: 10,
            statement_titles: vec![
                "CONSOLIDATED STATEMENTS OF INCOME".to_string(),
                "CONSOLIDATED BALANCE SHEETS".to_string(),
                "CONSOLIDATED STATEMENTS OF CASH FLOWS".to_string(),
            ],
        }
    }
}
