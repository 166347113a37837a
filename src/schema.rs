use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One page of extracted text, as produced by the external PDF reader.
/// `number` is 1-indexed to match how report pages are referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A row of raw cell strings as emitted by a table extraction backend.
/// Cells may be absent; column alignment is not guaranteed.
pub type RawRow = Vec<Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
    Equity,
    Unknown,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::IncomeStatement => "income_statement",
            StatementType::BalanceSheet => "balance_sheet",
            StatementType::CashFlow => "cash_flow",
            StatementType::Equity => "equity",
            StatementType::Unknown => "unknown",
        }
    }
}

/// A reconstructed line item: one description plus one value per period
/// column. A row with all-empty values and a header-like description is a
/// section header (e.g. "ASSETS") and is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRow {
    pub description: String,
    pub values: Vec<String>,
}

impl LogicalRow {
    pub fn new(description: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            description: description.into(),
            values,
        }
    }

    /// A text-only row carries no values at all.
    pub fn text_only(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            values: Vec::new(),
        }
    }

    pub fn has_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_empty())
    }
}

/// Document-level metadata recovered from a statement page's text. Every
/// field is best-effort; absence is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub company: Option<String>,
    pub statement_type: StatementType,
    pub periods: BTreeSet<String>,
    pub units: BTreeSet<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            company: None,
            statement_type: StatementType::Unknown,
            periods: BTreeSet::new(),
            units: BTreeSet::new(),
        }
    }
}

/// One assembled financial statement. Row order is preserved from the page
/// top-to-bottom; the validation engine depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// The located title text, e.g. "CONSOLIDATED BALANCE SHEETS".
    pub name: String,
    pub statement_type: StatementType,
    #[serde(rename = "pageNumber")]
    pub page_number: usize,
    /// First header is always "Description"; the rest are period columns.
    pub headers: Vec<String>,
    pub rows: Vec<LogicalRow>,
    pub metadata: Metadata,
}

impl Statement {
    /// Header names of the value columns (everything but the description).
    pub fn value_columns(&self) -> &[String] {
        if self.headers.is_empty() {
            &[]
        } else {
            &self.headers[1..]
        }
    }

    /// The row-map shape (`[{header -> cell}]`) consumed by spreadsheet and
    /// JSON renderers downstream.
    pub fn table_data(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut map = BTreeMap::new();
                map.insert("Description".to_string(), row.description.clone());
                for (i, col) in self.value_columns().iter().enumerate() {
                    let cell = row.values.get(i).cloned().unwrap_or_default();
                    map.insert(col.clone(), cell);
                }
                map
            })
            .collect()
    }
}

/// An independently re-summed total compared against the statement's own
/// reported total row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub calculated: f64,
    pub reported: f64,
    pub difference: f64,
    pub matches: bool,
}

impl Reconciliation {
    pub fn empty() -> Self {
        Self {
            calculated: 0.0,
            reported: 0.0,
            difference: 0.0,
            matches: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    pub assets: Reconciliation,
    pub liabilities_equity: Reconciliation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub failed_checks: usize,
    /// Percentage, rounded to one decimal.
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub checklist_results: BTreeMap<String, bool>,
    pub summary: ValidationSummary,
    pub balance_sheet_totals: Option<BalanceSheetTotals>,
}

/// The document-level outcome: however many statements assembled, plus the
/// validation checklist over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub statements: Vec<Statement>,
    pub validation: ValidationResult,
}

impl DocumentResult {
    /// Serialize the result in the wire shape downstream consumers expect.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
