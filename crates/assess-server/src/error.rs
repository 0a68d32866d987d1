use assess_common::openai::OpenAiClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Oracle(#[from] OpenAiClientError),

    #[error("config error: {0}")]
    Config(String),

    #[error("usage: {0}")]
    Usage(String),
}
