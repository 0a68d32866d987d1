/// Error types shared across the recommender crates.
///
/// These errors represent failures in infrastructure components (embedding model
/// initialization and inference). Application-specific errors are defined in each
/// crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("embedding error: {0}")]
    Embedding(String),
}
