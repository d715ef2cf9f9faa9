use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("plan contains no steps")]
    Empty,

    #[error("duplicate step id {0}")]
    DuplicateStep(u32),

    #[error("step {0} has an empty description")]
    EmptyDescription(u32),
}
