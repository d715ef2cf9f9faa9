use crate::{
    error::PipelineError,
    extract::{Extracted, extract_json},
    llm::LlmClient,
    prompts,
};
use model::execution::plan::{Plan, Step};
use serde_json::Value;
use tracing::{info, warn};

/// Asks the model for a plan. Transport errors abort the run as workflow
/// errors; anything unusable in the answer is a decomposition failure.
pub async fn decompose(llm: &dyn LlmClient, question: &str) -> Result<Plan, PipelineError> {
    let raw = llm.complete(&prompts::decomposition(question)).await?;
    let plan = parse_plan(&raw).map_err(|detail| {
        warn!(%detail, "Could not recover a plan from model output");
        PipelineError::Decomposition(detail)
    })?;
    info!(steps = plan.len(), "Question decomposed");
    Ok(plan)
}

pub fn parse_plan(raw: &str) -> Result<Plan, String> {
    let map = match extract_json(raw) {
        Extracted::Parsed(map) => map,
        Extracted::Unparsed => return Err("no JSON object in output".into()),
    };

    let steps = match map.get("steps") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err("missing or empty `steps` array".into()),
    };

    let steps = steps
        .iter()
        .map(|item| serde_json::from_value::<Step>(item.clone()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("malformed step: {e}"))?;

    Plan::new(steps).map_err(|e| e.to_string())
}
