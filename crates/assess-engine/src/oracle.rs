/// The text-completion seam behind the oracle-backed strategy.
use async_trait::async_trait;

use crate::error::OracleError;
use assess_common::openai::OpenAiClient;

/// Sends a prompt to a language model and returns its raw, untrusted reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        OpenAiClient::complete(self, prompt).await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.config().default_timeout)
            } else {
                OracleError::from(e)
            }
        })
    }

    fn model_name(&self) -> &str {
        &self.config().model
    }
}
