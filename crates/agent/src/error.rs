use crate::llm::LlmError;
use thiserror::Error;

/// Errors that abort a whole run. They never leave `AgentPipeline::run`;
/// their display text becomes the `Failure` message.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No usable plan could be recovered from the model.
    #[error("decomposition failed")]
    Decomposition(String),

    #[error("workflow error: {0}")]
    Llm(#[from] LlmError),

    /// A panic caught at the pipeline boundary.
    #[error("workflow error: {0}")]
    Internal(String),
}
