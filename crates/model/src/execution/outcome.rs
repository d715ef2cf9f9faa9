use crate::execution::step::StepResult;
use serde::{Deserialize, Serialize};

pub const NO_SUMMARY: &str = "No summary generated";

/// Narrative answer assembled by insight synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub steps: Vec<StepResult>,
}

/// Terminal value of one pipeline run. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PipelineOutcome {
    Success(InsightReport),
    Failure { error: String },
}

impl PipelineOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        PipelineOutcome::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&InsightReport> {
        match self {
            PipelineOutcome::Success(report) => Some(report),
            PipelineOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Success(_) => None,
            PipelineOutcome::Failure { error } => Some(error),
        }
    }

    pub fn steps(&self) -> &[StepResult] {
        self.report().map(|r| r.steps.as_slice()).unwrap_or(&[])
    }
}
