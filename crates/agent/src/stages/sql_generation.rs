use crate::{
    extract::{extract_json, string_field},
    llm::{LlmClient, LlmError},
    prompts,
};
use model::execution::{plan::Step, step::GeneratedSql};
use tracing::debug;

/// SQL for one step, or `None` when the model produced nothing usable.
pub async fn generate_sql(llm: &dyn LlmClient, step: &Step) -> Result<Option<GeneratedSql>, LlmError> {
    let raw = llm.complete(&prompts::sql_generation(&step.description)).await?;
    let generated = parse_generated(&raw);
    debug!(step_id = step.id, sql = ?generated.as_ref().map(|g| &g.sql), "SQL generated");
    Ok(generated)
}

pub fn parse_generated(raw: &str) -> Option<GeneratedSql> {
    let map = extract_json(raw).into_map();
    let sql = string_field(&map, "sql")?;
    let explanation = string_field(&map, "explanation").unwrap_or_default();
    GeneratedSql::new(&sql, &explanation)
}
