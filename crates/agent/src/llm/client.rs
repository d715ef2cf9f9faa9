use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure, including the request timeout.
    #[error("LLM network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not carry a completion.
    #[error("LLM response error: {0}")]
    Response(String),
}

/// Stateless text completion: given a prompt, return the model's text.
///
/// No structured output is assumed; callers extract JSON from the raw text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
