//! Normalization boundary between the external table extraction backends
//! and the row classifier.
//!
//! Three interchangeable backends exist upstream (a stream-mode lattice
//! detector, a text-layout table reader, a generic text-grid reader). Each
//! may fail outright or come back empty (a missing optional system tool
//! is the common case), so they are tried in a fixed preference order and
//! the first one to produce a non-empty grid wins. No semantic
//! interpretation happens here; cells are only normalized to plain strings.

use log::{debug, warn};
use thiserror::Error;

use crate::schema::{Page, RawRow};

/// Why a backend produced nothing. Treated as "try the next backend",
/// never surfaced as a document-level failure on its own.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One table extraction backend. Implementations wrap the out-of-scope
/// extractors; the core only consumes their raw cell grids.
pub trait TableBackend {
    fn name(&self) -> &str;

    fn extract_tables(&self, page: &Page) -> std::result::Result<Vec<RawRow>, BackendError>;
}

/// Run the backends in preference order, returning the first non-empty
/// grid with its cells normalized (`None` and whitespace collapse to `""`).
/// Returns `None` when every backend fails or comes back empty.
pub fn extract_grid(page: &Page, backends: &[Box<dyn TableBackend>]) -> Option<Vec<Vec<String>>> {
    for backend in backends {
        match backend.extract_tables(page) {
            Ok(raw_rows) => {
                let grid = normalize(raw_rows);
                if grid.iter().any(|row| row.iter().any(|c| !c.is_empty())) {
                    debug!(
                        "page {}: backend '{}' produced {} rows",
                        page.number,
                        backend.name(),
                        grid.len()
                    );
                    return Some(grid);
                }
                debug!(
                    "page {}: backend '{}' produced no usable rows, trying next",
                    page.number,
                    backend.name()
                );
            }
            Err(err) => {
                warn!(
                    "page {}: backend '{}' unavailable ({}), trying next",
                    page.number,
                    backend.name(),
                    err
                );
            }
        }
    }

    None
}

fn normalize(raw_rows: Vec<RawRow>) -> Vec<Vec<String>> {
    raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(|c| c.trim().to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}
