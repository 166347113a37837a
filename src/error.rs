use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No financial statements could be extracted from the document")]
    NoStatements,

    #[error("Statement '{title}' not found after page {min_page}")]
    StatementNotFound { title: String, min_page: usize },

    #[error("All table extraction backends failed for page {page}")]
    AllBackendsFailed { page: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
