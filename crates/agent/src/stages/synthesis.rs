use crate::{
    extract::{Extracted, extract_json, string_field, string_list},
    llm::LlmClient,
    prompts,
};
use model::execution::outcome::{InsightReport, NO_SUMMARY};
use tracing::warn;

/// Narrative over the transcript. Never fails: a model error or an unusable
/// answer degrades to placeholder text so the step trace still reaches the caller.
pub async fn synthesize(llm: &dyn LlmClient, question: &str, transcript: &str) -> InsightReport {
    match llm.complete(&prompts::synthesis(question, transcript)).await {
        Ok(raw) => parse_report(&raw),
        Err(error) => {
            warn!(%error, "Insight synthesis failed, returning placeholder report");
            parse_report("")
        }
    }
}

pub fn parse_report(raw: &str) -> InsightReport {
    let extracted = extract_json(raw);
    if !extracted.is_parsed() && !raw.is_empty() {
        warn!("Insight synthesis returned no JSON object");
    }
    let map = match extracted {
        Extracted::Parsed(map) => map,
        Extracted::Unparsed => Default::default(),
    };

    InsightReport {
        summary: string_field(&map, "summary")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string()),
        key_insights: string_list(&map, "key_insights"),
        recommendations: string_list(&map, "recommendations"),
        steps: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_report() {
        let report = parse_report(
            r#"{"summary": "Mean BMI is 27.4", "key_insights": ["overweight range"], "recommendations": ["diet review"]}"#,
        );
        assert_eq!(report.summary, "Mean BMI is 27.4");
        assert_eq!(report.key_insights, vec!["overweight range"]);
        assert_eq!(report.recommendations, vec!["diet review"]);
    }

    #[test]
    fn missing_fields_default() {
        let report = parse_report(r#"{"key_insights": ["x"]}"#);
        assert_eq!(report.summary, NO_SUMMARY);
        assert_eq!(report.key_insights, vec!["x"]);
        assert!(report.recommendations.is_empty());

        let report = parse_report("the model rambled");
        assert_eq!(report.summary, NO_SUMMARY);
        assert!(report.key_insights.is_empty());
    }
}
