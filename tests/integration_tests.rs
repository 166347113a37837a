use financial_statement_extractor::*;
use std::collections::HashMap;

/// Serves one fixed grid per page number, standing in for the external
/// table extractors.
struct FixtureBackend {
    grids: HashMap<usize, Vec<RawRow>>,
}

impl TableBackend for FixtureBackend {
    fn name(&self) -> &str {
        "fixture"
    }

    fn extract_tables(&self, page: &Page) -> std::result::Result<Vec<RawRow>, BackendError> {
        self.grids
            .get(&page.number)
            .cloned()
            .ok_or_else(|| BackendError::new("no table on page"))
    }
}

/// Always fails, exercising the backend fallthrough in every scenario.
struct BrokenBackend;

impl TableBackend for BrokenBackend {
    fn name(&self) -> &str {
        "broken"
    }

    fn extract_tables(&self, _page: &Page) -> std::result::Result<Vec<RawRow>, BackendError> {
        Err(BackendError::new("extractor binary not found"))
    }
}

fn raw(cells: &[&str]) -> RawRow {
    cells.iter().map(|c| Some(c.to_string())).collect()
}

fn income_grid() -> Vec<RawRow> {
    vec![
        raw(&["Revenues", "282,836", "307,394"]),
        raw(&["Costs and expenses:", "", ""]),
        raw(&["Cost of revenues", "126,203", "133,332"]),
        raw(&["Research and development", "39,500", "45,427"]),
        raw(&["Sales and marketing", "26,567", "27,917"]),
        raw(&["General and administrative", "15,724", "16,425"]),
        raw(&["Total costs and expenses", "208,000", "223,101"]),
        raw(&["Income from operations", "74,842", "84,293"]),
        raw(&["Other income (expense), net", "(3,514)", "1,894"]),
        raw(&["Provision for income taxes", "11,356", "11,922"]),
        raw(&["Net income", "59,972", "73,795"]),
        raw(&["Basic net income per share", "4.59", "5.84"]),
    ]
}

fn balance_grid() -> Vec<RawRow> {
    vec![
        raw(&["ASSETS", "", ""]),
        raw(&["Current assets:", "", ""]),
        raw(&["Cash and cash equivalents", "21,879", "24,048"]),
        raw(&["Marketable securities", "91,883", "86,868"]),
        raw(&["Accounts receivable, net", "40,258", "47,964"]),
        raw(&["Other current assets", "10,775", "12,650"]),
        raw(&["Total current assets", "164,795", "171,530"]),
        raw(&["Property and equipment, net", "112,668", "134,345"]),
        raw(&["Goodwill", "28,960", "29,198"]),
        raw(&["Other non-current assets", "58,841", "115,183"]),
        raw(&["Total assets", "365,264", "450,256"]),
        raw(&["LIABILITIES AND STOCKHOLDERS' EQUITY", "", ""]),
        raw(&["Current liabilities:", "", ""]),
        raw(&["Accounts payable", "5,128", "7,493"]),
        raw(&["Accrued expenses and other current liabilities", "64,045", "46,168"]),
        raw(&["Total current liabilities", "69,173", "53,661"]),
        raw(&["Long-term debt", "14,701", "13,253"]),
        raw(&["Other long-term liabilities", "24,715", "104,036"]),
        raw(&["Commitments and contingencies", "", ""]),
        raw(&["Stockholders' equity:", "", ""]),
        // A wrapped description: the line item's values arrive two source
        // rows later.
        raw(&[
            "Class A and Class B common stock and additional paid-in capital, \
             300,000 shares authorized and par value of $0.001 per share for \
             each class issued",
            "",
            "",
        ]),
        raw(&["and outstanding", "68,715", "76,534"]),
        raw(&["Retained earnings", "195,563", "211,247"]),
        raw(&["Accumulated other comprehensive loss", "(7,603)", "(8,475)"]),
        raw(&["Total stockholders' equity", "256,675", "279,306"]),
        raw(&["Total liabilities and stockholders' equity", "365,264", "450,256"]),
    ]
}

fn cash_flow_grid() -> Vec<RawRow> {
    vec![
        raw(&["Operating activities", "", ""]),
        raw(&["Net income", "59,972", "73,795"]),
        raw(&["Depreciation and amortization", "13,475", "11,946"]),
        raw(&["Stock-based compensation expense", "19,362", "22,460"]),
        raw(&["Net cash provided by operating activities", "91,495", "101,746"]),
        raw(&["Investing activities", "", ""]),
        raw(&["Purchases of property and equipment", "(31,485)", "(32,251)"]),
        raw(&["Net cash used in investing activities", "(20,298)", "(27,063)"]),
        raw(&["Financing activities", "", ""]),
        raw(&["Proceeds from issuance of debt", "1,238", "\u{2014}"]),
        raw(&["Repayments of debt", "(1,196)", "(2,100)"]),
        raw(&["Repurchases of capital stock", "(59,296)", "(61,504)"]),
        raw(&["Net cash used in financing activities", "(69,757)", "(72,093)"]),
        raw(&["Cash and cash equivalents at beginning of period", "20,945", "21,879"]),
        raw(&["Cash and cash equivalents at end of period", "21,879", "24,048"]),
    ]
}

fn annual_report_pages() -> Vec<Page> {
    let prose_page = format!(
        "Management discussion of CONSOLIDATED STATEMENTS OF INCOME results {}",
        "word ".repeat(400)
    );
    vec![
        Page::new(
            12,
            "INDEX\nCONSOLIDATED STATEMENTS OF INCOME .... 48\nCONSOLIDATED BALANCE SHEETS .... 55",
        ),
        Page::new(47, prose_page),
        Page::new(
            48,
            "Alphabet Inc.\nCONSOLIDATED STATEMENTS OF INCOME\n(In millions, except per share amounts)\nYear Ended December 31, 2022 2023",
        ),
        Page::new(
            55,
            "Alphabet Inc.\nCONSOLIDATED BALANCE SHEETS\n(In millions)\nAs of December 31, 2022 As of December 31, 2023\nASSETS",
        ),
        Page::new(
            60,
            "Alphabet Inc.\nCONSOLIDATED STATEMENTS OF CASH FLOWS\n(In millions)\nYear Ended December 31, 2022 2023",
        ),
    ]
}

fn annual_report_backends() -> Vec<Box<dyn TableBackend>> {
    let mut grids = HashMap::new();
    grids.insert(48, income_grid());
    grids.insert(55, balance_grid());
    grids.insert(60, cash_flow_grid());
    vec![Box::new(BrokenBackend), Box::new(FixtureBackend { grids })]
}

#[test]
fn test_full_annual_report_extraction() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    assert_eq!(result.statements.len(), 3);

    let income = &result.statements[0];
    assert_eq!(income.statement_type, StatementType::IncomeStatement);
    // The index page (12) and the prose page (47) are both skipped.
    assert_eq!(income.page_number, 48);
    assert_eq!(
        income.headers,
        vec![
            "Description",
            "Year Ended December 31, 2022",
            "Year Ended December 31, 2023",
        ]
    );
    assert_eq!(income.rows[0].description, "Revenues");
    assert_eq!(income.rows[0].values, vec!["282836", "307394"]);
    assert_eq!(income.metadata.company.as_deref(), Some("Alphabet Inc."));
    assert!(income
        .metadata
        .units
        .contains("(In millions, except per share amounts)"));

    let balance = &result.statements[1];
    assert_eq!(balance.statement_type, StatementType::BalanceSheet);
    assert_eq!(balance.page_number, 55);
    assert_eq!(
        balance.headers,
        vec![
            "Description",
            "As of December 31, 2022",
            "As of December 31, 2023",
        ]
    );

    let cash_flow = &result.statements[2];
    assert_eq!(cash_flow.statement_type, StatementType::CashFlow);
    assert_eq!(cash_flow.page_number, 60);
}

#[test]
fn test_wrapped_description_rebuilt_with_its_values() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let balance = &result.statements[1];
    let stock_row = balance
        .rows
        .iter()
        .find(|row| row.description.starts_with("Class A and Class B"))
        .unwrap();

    assert!(stock_row.description.ends_with("issued and outstanding"));
    assert_eq!(stock_row.values, vec!["68715", "76534"]);

    // Section headers survive the merges untouched.
    assert!(balance
        .rows
        .iter()
        .any(|row| row.description == "Stockholders' equity:" && !row.has_values()));
}

#[test]
fn test_negatives_and_dashes_normalized() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let income = &result.statements[0];
    let other = income
        .rows
        .iter()
        .find(|row| row.description.starts_with("Other income"))
        .unwrap();
    assert_eq!(other.values, vec!["-3514", "1894"]);

    let cash_flow = &result.statements[2];
    let proceeds = cash_flow
        .rows
        .iter()
        .find(|row| row.description.starts_with("Proceeds from issuance"))
        .unwrap();
    assert_eq!(proceeds.values, vec!["1238", ""]);
}

#[test]
fn test_balance_sheet_reconciliation() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let totals = result.validation.balance_sheet_totals.unwrap();
    assert!(totals.assets.matches);
    assert_eq!(totals.assets.reported, 815520.0);
    assert_eq!(totals.assets.calculated, 815520.0);

    assert!(totals.liabilities_equity.matches);
    assert_eq!(totals.liabilities_equity.reported, 815520.0);
}

#[test]
fn test_corrupted_cell_fails_reconciliation() {
    let mut grids = HashMap::new();
    grids.insert(48, income_grid());
    let mut bad_balance = balance_grid();
    // One flipped digit in marketable securities.
    bad_balance[3] = raw(&["Marketable securities", "91,883", "88,868"]);
    grids.insert(55, bad_balance);
    grids.insert(60, cash_flow_grid());
    let backends: Vec<Box<dyn TableBackend>> = vec![Box::new(FixtureBackend { grids })];

    let result = extract_document(
        &annual_report_pages(),
        &backends,
        &ExtractorConfig::default(),
    )
    .unwrap();

    let totals = result.validation.balance_sheet_totals.unwrap();
    assert!(!totals.assets.matches);
    assert_eq!(totals.assets.difference, 2000.0);
    assert!(totals.liabilities_equity.matches);
}

#[test]
fn test_validation_checklist_over_full_document() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let checks = &result.validation.checklist_results;
    assert_eq!(result.validation.summary.total_checks, 33);

    assert!(checks["balance_sheet_1_equation"]);
    assert!(checks["balance_sheet_3_cash_share"]);
    assert!(checks["income_statement_2_gross_margin"]);
    assert!(checks["income_statement_6_tax_rate"]);
    assert!(checks["cash_flow_1_operating_positive"]);
    assert!(checks["cash_flow_8_cash_rollforward"]);
    assert!(checks["cross_statement_5_debt_in_both"]);
    assert!(checks["cross_statement_8_sbc_visible"]);

    // Depreciation is not itemized on this income statement, and the cash
    // flow statement has no tax row.
    assert!(!checks["cross_statement_2_depreciation_in_both"]);
    assert!(!checks["cross_statement_7_tax_in_both"]);

    assert_eq!(result.validation.summary.passed_checks, 31);
    assert_eq!(result.validation.summary.failed_checks, 2);
    assert_eq!(result.validation.summary.pass_rate, 93.9);
}

#[test]
fn test_partial_document_still_extracts_and_validates() {
    // Only the balance sheet page exists.
    let pages = vec![Page::new(
        55,
        "Alphabet Inc.\nCONSOLIDATED BALANCE SHEETS\nAs of December 31, 2022 As of December 31, 2023",
    )];
    let mut grids = HashMap::new();
    grids.insert(55, balance_grid());
    let backends: Vec<Box<dyn TableBackend>> = vec![Box::new(FixtureBackend { grids })];

    let result = extract_document(&pages, &backends, &ExtractorConfig::default()).unwrap();

    assert_eq!(result.statements.len(), 1);
    assert!(result.validation.checklist_results["balance_sheet_1_equation"]);
    // Missing statements fail their whole group.
    assert!(!result.validation.checklist_results["income_statement_1_revenue_positive"]);
    assert!(!result.validation.checklist_results["cash_flow_1_operating_positive"]);
}

#[test]
fn test_document_without_statements_errors() {
    let pages = vec![Page::new(20, "nothing resembling a statement")];
    let backends: Vec<Box<dyn TableBackend>> = vec![Box::new(BrokenBackend)];

    let err = extract_document(&pages, &backends, &ExtractorConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::NoStatements));
}

#[test]
fn test_json_wire_shape() {
    let result = extract_document(
        &annual_report_pages(),
        &annual_report_backends(),
        &ExtractorConfig::default(),
    )
    .unwrap();

    let json = result.to_json().unwrap();
    assert!(json.contains("\"pageNumber\": 48"));
    assert!(json.contains("\"statement_type\": \"balance_sheet\""));
    assert!(json.contains("\"checklist_results\""));
    assert!(json.contains("\"total_checks\": 33"));
    assert!(json.contains("\"pass_rate\""));
    assert!(json.contains("\"balance_sheet_totals\""));
    assert!(json.contains("\"liabilities_equity\""));

    let table = result.statements[0].table_data();
    assert_eq!(table[0]["Description"], "Revenues");
    assert_eq!(table[0]["Year Ended December 31, 2023"], "307394");
}
