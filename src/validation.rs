//! Plausibility checks over assembled statements.
//!
//! The checklist runs 33 checks in four groups: balance-sheet structure,
//! income-statement ratios, cash-flow coherence, and cross-statement
//! consistency. Checks are heuristics over extracted text, so each one
//! states its absence default explicitly: a ratio that cannot be computed
//! because the line item is genuinely optional (inventory, dividends)
//! passes, while a missing row the statement cannot do without (retained
//! earnings, revenue) fails. A missing statement fails its whole group.
//!
//! Alongside the checklist, the balance-sheet totals are re-summed from
//! their line items and reconciled against the reported total rows.

use log::{debug, info};
use std::collections::BTreeMap;

use crate::config::ExtractorConfig;
use crate::numeric::normalize_amount;
use crate::schema::{
    BalanceSheetTotals, LogicalRow, Reconciliation, Statement, ValidationResult,
    ValidationSummary,
};

/// Section labels never counted toward the re-summed asset total.
const ASSET_SECTION_LABELS: &[&str] = &[
    "assets",
    "current assets:",
    "liabilities and stockholders' equity",
];

/// Section labels never counted toward the re-summed liabilities+equity
/// total.
const LIABILITY_SECTION_LABELS: &[&str] = &["current liabilities:", "stockholders' equity:"];

pub struct StatementValidator<'a> {
    statements: &'a [Statement],
    config: &'a ExtractorConfig,
}

impl<'a> StatementValidator<'a> {
    pub fn new(statements: &'a [Statement], config: &'a ExtractorConfig) -> Self {
        Self { statements, config }
    }

    /// Run the full checklist and the balance-sheet reconciliation.
    pub fn validate(&self) -> ValidationResult {
        let mut checks = BTreeMap::new();

        self.balance_sheet_checks(&mut checks);
        self.income_statement_checks(&mut checks);
        self.cash_flow_checks(&mut checks);
        self.cross_statement_checks(&mut checks);

        let total_checks = checks.len();
        let passed_checks = checks.values().filter(|&&passed| passed).count();
        let failed_checks = total_checks - passed_checks;
        let pass_rate = if total_checks == 0 {
            0.0
        } else {
            (passed_checks as f64 / total_checks as f64 * 1000.0).round() / 10.0
        };

        let balance_sheet_totals = self.get_statement("BALANCE").map(|bs| BalanceSheetTotals {
            assets: self.reconcile_assets(bs),
            liabilities_equity: self.reconcile_liabilities_equity(bs),
        });

        info!(
            "validation: {}/{} checks passed ({}%)",
            passed_checks, total_checks, pass_rate
        );

        ValidationResult {
            checklist_results: checks,
            summary: ValidationSummary {
                total_checks,
                passed_checks,
                failed_checks,
                pass_rate,
            },
            balance_sheet_totals,
        }
    }

    // -- statement and row lookup ------------------------------------------

    /// Match a statement by uppercase substring in either direction, so
    /// both "BALANCE" and a full title locate the same statement.
    fn get_statement(&self, name: &str) -> Option<&Statement> {
        let needle = name.to_uppercase();
        self.statements.iter().find(|statement| {
            let title = statement.name.to_uppercase();
            title.contains(&needle) || needle.contains(&title)
        })
    }

    fn find_row<'s>(&self, statement: &'s Statement, keywords: &[&str]) -> Option<&'s LogicalRow> {
        statement.rows.iter().find(|row| {
            let desc = row.description.to_lowercase();
            keywords.iter().any(|keyword| desc.contains(keyword))
        })
    }

    /// Sum of every row whose description matches a keyword.
    fn sum_rows(&self, statement: &Statement, keywords: &[&str]) -> Option<f64> {
        let mut found = false;
        let mut sum = 0.0;
        for row in &statement.rows {
            let desc = row.description.to_lowercase();
            if keywords.iter().any(|keyword| desc.contains(keyword)) {
                found = true;
                sum += row_total(row);
            }
        }
        found.then_some(sum)
    }

    // -- balance sheet ------------------------------------------------------

    fn balance_sheet_checks(&self, checks: &mut BTreeMap<String, bool>) {
        let keys = [
            "balance_sheet_1_equation",
            "balance_sheet_2_current_ratio",
            "balance_sheet_3_cash_share",
            "balance_sheet_4_receivables_share",
            "balance_sheet_5_inventory_share",
            "balance_sheet_6_ppe_share",
            "balance_sheet_7_goodwill_share",
            "balance_sheet_8_debt_share",
            "balance_sheet_9_retained_earnings",
        ];

        let Some(bs) = self.get_statement("BALANCE") else {
            fail_group(checks, &keys);
            return;
        };

        let total_assets = self
            .find_row(bs, &["total assets"])
            .map(row_total)
            .unwrap_or(0.0);
        let total_le = self
            .find_row(
                bs,
                &[
                    "total liabilities and stockholders",
                    "total liabilities and shareholders",
                    "total liabilities and equity",
                ],
            )
            .map(row_total)
            .unwrap_or(0.0);

        checks.insert(
            keys[0].to_string(),
            total_assets != 0.0
                && total_le != 0.0
                && (total_assets - total_le).abs() < self.config.balance_tolerance,
        );

        let current_assets = self.find_row(bs, &["total current assets"]).map(row_total);
        let current_liabilities = self
            .find_row(bs, &["total current liabilities"])
            .map(row_total);
        checks.insert(
            keys[1].to_string(),
            match (current_assets, current_liabilities) {
                (Some(ca), Some(cl)) if cl != 0.0 => ca / cl >= 1.0,
                _ => false,
            },
        );

        let share = |row: Option<&LogicalRow>| -> Option<f64> {
            if total_assets == 0.0 {
                return None;
            }
            row.map(|r| row_total(r) / total_assets)
        };

        // Cash is never optional; too little or too much of the balance
        // sheet in cash both read as extraction trouble.
        checks.insert(
            keys[2].to_string(),
            share(self.find_row(bs, &["cash and cash equivalents", "cash and equivalents"]))
                .is_some_and(|s| (0.05..=0.3).contains(&s)),
        );
        checks.insert(
            keys[3].to_string(),
            share(self.find_row(bs, &["accounts receivable", "receivables"]))
                .is_some_and(|s| s <= 0.2),
        );
        // Optional line items pass when absent.
        checks.insert(
            keys[4].to_string(),
            share(self.find_row(bs, &["inventor"])).is_none_or(|s| s <= 0.3),
        );
        checks.insert(
            keys[5].to_string(),
            share(self.find_row(bs, &["property and equipment", "property, plant"]))
                .is_none_or(|s| s <= 0.6),
        );
        checks.insert(
            keys[6].to_string(),
            share(self.find_row(bs, &["goodwill"])).is_none_or(|s| s <= 0.4),
        );

        let debt = self.sum_rows(bs, &["long-term debt", "short-term debt", "notes payable"]);
        checks.insert(
            keys[7].to_string(),
            match debt {
                Some(d) if total_assets != 0.0 => d.abs() / total_assets <= 0.7,
                Some(_) => false,
                None => true,
            },
        );

        checks.insert(
            keys[8].to_string(),
            self.find_row(bs, &["retained earnings", "accumulated deficit"])
                .is_some_and(|row| row_total(row) >= 0.0),
        );
    }

    // -- income statement ---------------------------------------------------

    fn income_statement_checks(&self, checks: &mut BTreeMap<String, bool>) {
        let keys = [
            "income_statement_1_revenue_positive",
            "income_statement_2_gross_margin",
            "income_statement_3_opex_share",
            "income_statement_4_operating_margin",
            "income_statement_5_interest_coverage",
            "income_statement_6_tax_rate",
            "income_statement_7_net_income_positive",
            "income_statement_8_eps_present",
        ];

        let Some(is) = self.get_statement("INCOME") else {
            fail_group(checks, &keys);
            return;
        };

        let revenue = self
            .find_row(is, &["total revenue", "revenues", "revenue", "net sales"])
            .map(row_total)
            .unwrap_or(0.0);
        checks.insert(keys[0].to_string(), revenue > 0.0);

        let cost = self
            .find_row(is, &["cost of revenue", "cost of sales", "cost of goods"])
            .map(row_total);
        checks.insert(
            keys[1].to_string(),
            match cost {
                Some(c) if revenue > 0.0 => {
                    let margin = (revenue - c) / revenue;
                    (0.1..=0.9).contains(&margin)
                }
                _ => false,
            },
        );

        let opex = self.sum_rows(
            is,
            &[
                "research and development",
                "sales and marketing",
                "selling, general",
                "general and administrative",
            ],
        );
        checks.insert(
            keys[2].to_string(),
            match opex {
                Some(o) if revenue > 0.0 => o / revenue <= 0.8,
                Some(_) => false,
                None => true,
            },
        );

        let operating_income = self
            .find_row(
                is,
                &["income from operations", "operating income", "loss from operations"],
            )
            .map(row_total);
        checks.insert(
            keys[3].to_string(),
            match operating_income {
                Some(oi) if revenue > 0.0 => {
                    let margin = oi / revenue;
                    (-0.2..=0.5).contains(&margin)
                }
                _ => false,
            },
        );

        let interest = self.find_row(is, &["interest expense"]).map(row_total);
        checks.insert(
            keys[4].to_string(),
            match (operating_income, interest) {
                (Some(oi), Some(i)) if i != 0.0 => oi / i.abs() >= 1.5,
                (_, None) => true,
                _ => false,
            },
        );

        let tax = self
            .find_row(
                is,
                &["provision for income taxes", "income tax expense", "income tax provision"],
            )
            .map(row_total);
        let net_income = self
            .find_row(is, &["net income", "net loss"])
            .map(row_total)
            .unwrap_or(0.0);
        checks.insert(
            keys[5].to_string(),
            match tax {
                Some(t) if t + net_income != 0.0 => {
                    let rate = t / (t + net_income);
                    (0.1..=0.5).contains(&rate)
                }
                _ => false,
            },
        );

        checks.insert(keys[6].to_string(), net_income > 0.0);
        checks.insert(keys[7].to_string(), self.find_row(is, &["per share"]).is_some());
    }

    // -- cash flow ------------------------------------------------------------

    fn cash_flow_checks(&self, checks: &mut BTreeMap<String, bool>) {
        let keys = [
            "cash_flow_1_operating_positive",
            "cash_flow_2_operating_exceeds_net_income",
            "cash_flow_3_capex_within_operating",
            "cash_flow_4_free_cash_flow_positive",
            "cash_flow_5_dividends_within_operating",
            "cash_flow_6_repurchases_within_operating",
            "cash_flow_7_debt_activity_within_operating",
            "cash_flow_8_cash_rollforward",
        ];

        let Some(cf) = self.get_statement("CASH FLOW") else {
            fail_group(checks, &keys);
            return;
        };

        let operating = self
            .find_row(
                cf,
                &["net cash provided by operating activities", "cash provided by operating"],
            )
            .map(row_total)
            .unwrap_or(0.0);
        checks.insert(keys[0].to_string(), operating > 0.0);

        // The statement's own reconciliation starts from net income; a cash
        // flow statement without that row cannot pass this check.
        let net_income = self.find_row(cf, &["net income", "net loss"]).map(row_total);
        checks.insert(
            keys[1].to_string(),
            net_income.is_some_and(|ni| operating > ni),
        );

        let capex = self
            .find_row(
                cf,
                &["purchases of property and equipment", "capital expenditures"],
            )
            .map(|row| row_total(row).abs());
        checks.insert(
            keys[2].to_string(),
            capex.is_none_or(|c| c <= operating),
        );
        checks.insert(
            keys[3].to_string(),
            operating - capex.unwrap_or(0.0) > 0.0,
        );

        let within = |amount: Option<f64>, cap: f64| -> bool {
            match amount {
                Some(a) if operating > 0.0 => a.abs() <= cap * operating,
                Some(_) => false,
                None => true,
            }
        };
        checks.insert(
            keys[4].to_string(),
            within(self.sum_rows(cf, &["dividends"]), 0.5),
        );
        checks.insert(
            keys[5].to_string(),
            within(self.sum_rows(cf, &["repurchase", "treasury stock"]), 0.7),
        );
        checks.insert(
            keys[6].to_string(),
            within(
                self.sum_rows(cf, &["proceeds from debt", "repayments of debt", "issuance of debt"]),
                1.0,
            ),
        );

        let begin = self
            .find_row(cf, &["beginning of period", "beginning of year"])
            .map(row_total);
        let end = self
            .find_row(cf, &["end of period", "end of year"])
            .map(row_total);
        checks.insert(
            keys[7].to_string(),
            match (begin, end) {
                (Some(b), Some(e)) => (e - b).abs() < 1_000_000.0,
                _ => false,
            },
        );
    }

    // -- cross statement -------------------------------------------------------

    fn cross_statement_checks(&self, checks: &mut BTreeMap<String, bool>) {
        let keys = [
            "cross_statement_1_earnings_retained",
            "cross_statement_2_depreciation_in_both",
            "cross_statement_3_distributions_visible",
            "cross_statement_4_capex_and_ppe",
            "cross_statement_5_debt_in_both",
            "cross_statement_6_working_capital_rows",
            "cross_statement_7_tax_in_both",
            "cross_statement_8_sbc_visible",
        ];

        let is = self.get_statement("INCOME");
        let bs = self.get_statement("BALANCE");
        let cf = self.get_statement("CASH FLOW");

        let has_row = |statement: Option<&Statement>, keywords: &[&str]| -> bool {
            statement.is_some_and(|s| self.find_row(s, keywords).is_some())
        };

        let net_income = is
            .and_then(|s| self.find_row(s, &["net income", "net loss"]))
            .map(row_total)
            .unwrap_or(0.0);
        let retained = bs
            .and_then(|s| self.find_row(s, &["retained earnings"]))
            .map(row_total)
            .unwrap_or(0.0);
        checks.insert(keys[0].to_string(), net_income > 0.0 && retained > 0.0);

        checks.insert(
            keys[1].to_string(),
            has_row(is, &["depreciation"]) && has_row(cf, &["depreciation"]),
        );
        checks.insert(
            keys[2].to_string(),
            has_row(cf, &["dividends"]) || has_row(bs, &["retained earnings"]),
        );
        checks.insert(
            keys[3].to_string(),
            has_row(cf, &["purchases of property and equipment", "capital expenditures"])
                && has_row(bs, &["property and equipment", "property, plant"]),
        );
        checks.insert(
            keys[4].to_string(),
            has_row(bs, &["debt", "notes payable"]) && has_row(cf, &["debt", "notes payable"]),
        );
        checks.insert(
            keys[5].to_string(),
            has_row(bs, &["current assets"]) && has_row(bs, &["current liabilities"]),
        );
        checks.insert(
            keys[6].to_string(),
            has_row(is, &["income tax", "provision for income taxes"])
                && has_row(cf, &["income tax", "taxes"]),
        );
        checks.insert(
            keys[7].to_string(),
            has_row(is, &["stock-based compensation", "share-based compensation"])
                || has_row(cf, &["stock-based compensation", "share-based compensation"]),
        );
    }

    // -- balance sheet reconciliation -------------------------------------------

    /// Re-sum the asset line items above the reported "Total assets" row.
    /// Subtotal rows and section labels are skipped; only positive row
    /// totals count, so contra-asset allowances folded into other lines do
    /// not double-subtract.
    fn reconcile_assets(&self, bs: &Statement) -> Reconciliation {
        let Some(total_idx) = bs
            .rows
            .iter()
            .position(|row| row.description.to_lowercase().contains("total assets"))
        else {
            return Reconciliation::empty();
        };

        let reported = row_total(&bs.rows[total_idx]);
        let mut calculated = 0.0;

        for row in &bs.rows[..total_idx] {
            let desc = row.description.to_lowercase();
            if desc.is_empty()
                || desc.contains("total")
                || ASSET_SECTION_LABELS.contains(&desc.trim())
            {
                continue;
            }
            let value = row_total(row);
            if value > 0.0 {
                debug!("assets: summing '{}' = {}", row.description, value);
                calculated += value;
            }
        }

        let difference = calculated - reported;
        debug!(
            "assets: calculated {} vs reported {} (difference {})",
            calculated, reported, difference
        );
        Reconciliation {
            calculated,
            reported,
            difference,
            matches: difference.abs() < self.config.balance_tolerance,
        }
    }

    /// Re-sum liabilities and equity line items. The section starts after
    /// the "LIABILITIES AND STOCKHOLDERS' EQUITY" label and runs to the
    /// reported grand-total row. Negative rows (accumulated losses) are
    /// included, unlike the asset pass.
    fn reconcile_liabilities_equity(&self, bs: &Statement) -> Reconciliation {
        let start = bs.rows.iter().position(|row| {
            let desc = row.description.to_lowercase();
            !desc.starts_with("total")
                && (desc.contains("liabilities and stockholders")
                    || desc.contains("liabilities and shareholders")
                    || desc.contains("liabilities and equity"))
        });
        let Some(start) = start else {
            return Reconciliation::empty();
        };

        let total_idx = bs.rows[start + 1..]
            .iter()
            .position(|row| {
                let desc = row.description.to_lowercase();
                desc.contains("total liabilities and stockholders")
                    || desc.contains("total liabilities and shareholders")
                    || desc.contains("total liabilities and equity")
            })
            .map(|offset| start + 1 + offset);
        let Some(total_idx) = total_idx else {
            return Reconciliation::empty();
        };

        let reported = row_total(&bs.rows[total_idx]);
        let mut calculated = 0.0;

        for row in &bs.rows[start + 1..total_idx] {
            let desc = row.description.to_lowercase();
            if desc.is_empty()
                || desc.contains("total")
                || desc.contains("commitments and contingencies")
                || LIABILITY_SECTION_LABELS.contains(&desc.trim())
            {
                continue;
            }
            let value = row_total(row);
            if value != 0.0 {
                debug!("liabilities+equity: summing '{}' = {}", row.description, value);
                calculated += value;
            }
        }

        let difference = calculated - reported;
        debug!(
            "liabilities+equity: calculated {} vs reported {} (difference {})",
            calculated, reported, difference
        );
        Reconciliation {
            calculated,
            reported,
            difference,
            matches: difference.abs() < self.config.balance_tolerance,
        }
    }
}

/// Sum of a row's values across all period columns; blank and unparsable
/// cells contribute zero.
fn row_total(row: &LogicalRow) -> f64 {
    row.values.iter().map(|v| normalize_amount(v)).sum()
}

fn fail_group(checks: &mut BTreeMap<String, bool>, keys: &[&str]) {
    for key in keys {
        checks.insert(key.to_string(), false);
    }
}

/// Run the checklist over whatever statements were assembled.
pub fn validate_statements(
    statements: &[Statement],
    config: &ExtractorConfig,
) -> ValidationResult {
    StatementValidator::new(statements, config).validate()
}
