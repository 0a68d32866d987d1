use std::path::PathBuf;
use std::time::Duration;

use assess_common::error::CommonError;
use assess_common::openai::OpenAiClientError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Embedding(#[from] CommonError),
}

/// Failure of a single oracle call. Always absorbed by the strategy that made the call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle transport failure: {0}")]
    Transport(String),

    #[error("oracle returned an empty response")]
    Empty,
}

impl From<OpenAiClientError> for OracleError {
    fn from(err: OpenAiClientError) -> Self {
        match err {
            OpenAiClientError::EmptyCompletion => OracleError::Empty,
            other => OracleError::Transport(other.to_string()),
        }
    }
}

/// The only error `recommend` surfaces: the request itself was unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
