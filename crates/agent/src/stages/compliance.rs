use crate::{
    extract::{extract_json, string_field},
    guard,
    llm::{LlmClient, LlmError},
    prompts,
};
use model::execution::{plan::Step, step::ComplianceVerdict};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const UNKNOWN_VIOLATION: &str = "unknown safety violation";

/// Reviews `sql` for `step`. Statements failing the deterministic guard are
/// rejected without a model call. A transport error is returned to the caller,
/// which must treat it as a failed audit.
pub async fn review(llm: &dyn LlmClient, sql: &str, step: &Step) -> Result<ComplianceVerdict, LlmError> {
    if let Err(violation) = guard::screen(sql) {
        info!(step_id = step.id, %violation, "SQL rejected by guard");
        return Ok(ComplianceVerdict::reject(&violation.to_string()));
    }

    let raw = llm.complete(&prompts::compliance(sql, &step.description)).await?;
    let verdict = parse_verdict(&extract_json(&raw).into_map());
    debug!(step_id = step.id, allowed = verdict.allowed, reason = %verdict.reason, "Compliance verdict");
    Ok(verdict)
}

/// Anything other than an explicit `allowed: true` is a rejection.
pub fn parse_verdict(map: &Map<String, Value>) -> ComplianceVerdict {
    let allowed = match map.get("allowed") {
        Some(Value::Bool(flag)) => Some(*flag),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    };
    let reason = string_field(map, "reason").filter(|r| !r.is_empty());

    match allowed {
        Some(true) => ComplianceVerdict::allow(reason.as_deref().unwrap_or("approved")),
        Some(false) => ComplianceVerdict::reject(reason.as_deref().unwrap_or(UNKNOWN_VIOLATION)),
        None => ComplianceVerdict::reject(UNKNOWN_VIOLATION),
    }
}
