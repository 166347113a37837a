//! # Financial Statement Extractor
//!
//! A library for reconstructing financial statements from the ragged table
//! grids that PDF table extractors emit, and validating the result against
//! basic accounting identities.
//!
//! ## Core Concepts
//!
//! - **Page**: extracted text of one report page, used to locate statements
//!   and to recover the period headers and metadata the grid loses
//! - **Table Backend**: an interchangeable upstream table extractor, tried
//!   in preference order until one yields a usable grid
//! - **Logical Row**: one line item (description + one value per period),
//!   rebuilt from fragment rows by two merge passes
//! - **Validation**: a 33-point checklist over the assembled statements,
//!   plus re-summed balance-sheet totals reconciled against the reported
//!   total rows
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_statement_extractor::*;
//!
//! let pages: Vec<Page> = read_report_pages();
//! let backends: Vec<Box<dyn TableBackend>> = vec![Box::new(MyLatticeBackend)];
//!
//! let result = extract_document(&pages, &backends, &ExtractorConfig::default())?;
//! for statement in &result.statements {
//!     println!("{} on page {}", statement.name, statement.page_number);
//! }
//! println!("pass rate: {}%", result.validation.summary.pass_rate);
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod grid;
pub mod locator;
pub mod metadata;
pub mod numeric;
pub mod periods;
pub mod rows;
pub mod schema;
pub mod validation;

pub use assembler::assemble_statement;
pub use config::ExtractorConfig;
pub use error::{ExtractError, Result};
pub use grid::{extract_grid, BackendError, TableBackend};
pub use locator::find_page;
pub use metadata::{classify_statement, parse_metadata};
pub use numeric::{classify_token, normalize_amount, split_row, SplitRow, Token};
pub use periods::extract_periods;
pub use rows::reconstruct_rows;
pub use schema::*;
pub use validation::{validate_statements, StatementValidator};

use log::{info, warn};

pub struct StatementExtractor {
    config: ExtractorConfig,
}

impl StatementExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Locate and assemble one statement by its title text.
    pub fn extract_statement(
        &self,
        pages: &[Page],
        backends: &[Box<dyn TableBackend>],
        title: &str,
    ) -> Result<Statement> {
        let page_number = find_page(pages, title, self.config.min_page, &self.config)
            .ok_or_else(|| ExtractError::StatementNotFound {
                title: title.to_string(),
                min_page: self.config.min_page,
            })?;

        let page = pages
            .iter()
            .find(|p| p.number == page_number)
            .ok_or_else(|| ExtractError::StatementNotFound {
                title: title.to_string(),
                min_page: self.config.min_page,
            })?;

        let grid = extract_grid(page, backends)
            .ok_or(ExtractError::AllBackendsFailed { page: page_number })?;

        Ok(assemble_statement(
            title,
            page_number,
            &page.text,
            &grid,
            &self.config,
        ))
    }

    /// Sweep the configured statement titles in order, assembling whichever
    /// are found. A statement that cannot be located or extracted is logged
    /// and skipped; the sweep fails only when nothing at all is assembled.
    pub fn extract(
        &self,
        pages: &[Page],
        backends: &[Box<dyn TableBackend>],
    ) -> Result<Vec<Statement>> {
        info!(
            "extracting {} statement(s) from {} page(s)",
            self.config.statement_titles.len(),
            pages.len()
        );

        let mut statements = Vec::new();
        for title in &self.config.statement_titles {
            match self.extract_statement(pages, backends, title) {
                Ok(statement) => {
                    info!(
                        "extracted '{}' from page {} ({} rows)",
                        statement.name,
                        statement.page_number,
                        statement.rows.len()
                    );
                    statements.push(statement);
                }
                Err(err) => {
                    warn!("skipping '{}': {}", title, err);
                }
            }
        }

        if statements.is_empty() {
            return Err(ExtractError::NoStatements);
        }

        Ok(statements)
    }

    /// Extract the document and run the validation checklist over it.
    pub fn extract_and_validate(
        &self,
        pages: &[Page],
        backends: &[Box<dyn TableBackend>],
    ) -> Result<DocumentResult> {
        let statements = self.extract(pages, backends)?;
        let validation = validate_statements(&statements, &self.config);
        Ok(DocumentResult {
            statements,
            validation,
        })
    }
}

/// Convenience wrapper over [`StatementExtractor::extract_and_validate`].
pub fn extract_document(
    pages: &[Page],
    backends: &[Box<dyn TableBackend>],
    config: &ExtractorConfig,
) -> Result<DocumentResult> {
    StatementExtractor::new(config.clone()).extract_and_validate(pages, backends)
}
