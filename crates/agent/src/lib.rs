pub mod error;
pub mod extract;
pub mod guard;
pub mod pipeline;
pub mod prompts;

pub mod llm {
    mod client;
    pub mod openai;

    pub use client::{LlmClient, LlmError};
}

pub mod stages {
    pub mod compliance;
    pub mod decomposition;
    pub mod sql_generation;
    pub mod synthesis;
}

pub use llm::{LlmClient, LlmError, openai::OpenAiCompatClient};
pub use pipeline::AgentPipeline;
