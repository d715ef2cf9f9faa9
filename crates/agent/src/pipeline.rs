//! The question-answering pipeline: decomposition, then for each step SQL
//! generation, compliance review and execution, then insight synthesis.
//!
//! Failures local to one step are recorded in that step's result and the run
//! moves on. Only decomposition failures, model transport errors during
//! decomposition and panics end a run early, and all of them are returned as
//! `PipelineOutcome::Failure`; `run` itself never errors or unwinds.

use crate::{
    error::PipelineError,
    llm::LlmClient,
    stages::{
        compliance::review, decomposition::decompose, sql_generation::generate_sql,
        synthesis::synthesize,
    },
};
use federation::QueryExecutor;
use futures::FutureExt;
use model::execution::{
    outcome::{InsightReport, PipelineOutcome},
    plan::Step,
    step::StepResult,
};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};
use tracing::{error, info, warn};

pub const NO_SQL_GENERATED: &str = "no SQL generated";

pub struct AgentPipeline {
    llm: Arc<dyn LlmClient>,
}

impl AgentPipeline {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        AgentPipeline { llm }
    }

    pub async fn run(
        &self,
        question: &str,
        executor: &dyn QueryExecutor,
        include_uploaded: bool,
    ) -> PipelineOutcome {
        info!(question, include_uploaded, "Pipeline run started");

        let attempt = AssertUnwindSafe(self.run_stages(question, executor, include_uploaded))
            .catch_unwind()
            .await;

        let err = match attempt {
            Ok(Ok(report)) => {
                info!(steps = report.steps.len(), "Pipeline run finished");
                return PipelineOutcome::Success(report);
            }
            Ok(Err(err)) => err,
            Err(payload) => PipelineError::Internal(panic_message(payload.as_ref())),
        };

        match &err {
            PipelineError::Decomposition(detail) => error!(%detail, "Pipeline aborted: {err}"),
            _ => error!("Pipeline aborted: {err}"),
        }
        PipelineOutcome::failure(err.to_string())
    }

    async fn run_stages(
        &self,
        question: &str,
        executor: &dyn QueryExecutor,
        include_uploaded: bool,
    ) -> Result<InsightReport, PipelineError> {
        let plan = decompose(self.llm.as_ref(), question).await?;

        let mut steps = Vec::with_capacity(plan.len());
        let mut transcript = String::new();
        for step in &plan {
            let result = self.attempt_step(step, executor, include_uploaded).await;
            transcript.push_str(&result.transcript());
            steps.push(result);
        }

        let mut report = synthesize(self.llm.as_ref(), question, &transcript).await;
        report.steps = steps;
        Ok(report)
    }

    async fn attempt_step(
        &self,
        step: &Step,
        executor: &dyn QueryExecutor,
        include_uploaded: bool,
    ) -> StepResult {
        let llm = self.llm.as_ref();

        let generated = match generate_sql(llm, step).await {
            Ok(Some(generated)) => generated,
            Ok(None) => {
                warn!(step_id = step.id, "No SQL generated");
                return StepResult::failed(step, "", NO_SQL_GENERATED);
            }
            Err(error) => {
                warn!(step_id = step.id, %error, "SQL generation call failed");
                return StepResult::failed(step, "", &format!("{NO_SQL_GENERATED}: {error}"));
            }
        };
        let sql = generated.sql.as_str();

        match review(llm, sql, step).await {
            Ok(verdict) if verdict.allowed => {}
            Ok(verdict) => {
                info!(step_id = step.id, reason = %verdict.reason, "Step blocked by compliance review");
                return StepResult::blocked(step, sql, &verdict.reason);
            }
            Err(error) => {
                warn!(step_id = step.id, %error, "Compliance audit failed, treating as rejection");
                return StepResult::failed(step, sql, &format!("compliance audit error: {error}"));
            }
        }

        match executor.execute(sql, include_uploaded).await {
            Ok(data) => {
                info!(step_id = step.id, rows = data.row_count(), "Step executed");
                StepResult::success(step, sql, data)
            }
            Err(error) => {
                warn!(step_id = step.id, %error, "Step execution failed");
                StepResult::failed(step, sql, &error.to_string())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use federation::error::FederationError;
    use model::{
        core::value::Value,
        execution::{outcome::NO_SUMMARY, step::StepStatus},
        records::table::Table,
    };
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<&str, LlmError>>) -> Arc<Self> {
            Arc::new(ScriptedLlm {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Response("script exhausted".into())))
        }
    }

    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
        panic: bool,
    }

    #[async_trait]
    impl QueryExecutor for CountingExecutor {
        async fn execute(&self, _sql: &str, _include_uploaded: bool) -> Result<Table, FederationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic {
                panic!("engine exploded");
            }
            Ok(avg_bmi())
        }
    }

    fn avg_bmi() -> Table {
        Table::from_rows(&["avg_bmi"], vec![vec![Value::Float(27.4)]])
    }

    const ONE_STEP: &str =
        r#"{"steps": [{"step_id": 1, "description": "Average BMI of CKD patients", "needed_columns": ["bmi"]}]}"#;
    const CKD_SQL: &str =
        r#"{"sql": "SELECT AVG(bmi) AS avg_bmi FROM patients WHERE chronic_kidney_disease = 1", "explanation": "mean"}"#;
    const ALLOW: &str = r#"{"allowed": true, "reason": "aggregate"}"#;
    const INSIGHT: &str =
        r#"{"summary": "CKD patients average a BMI of 27.4", "key_insights": ["overweight"], "recommendations": ["weight management"]}"#;

    #[tokio::test]
    async fn answers_single_step_question() {
        let llm = ScriptedLlm::new(vec![Ok(ONE_STEP), Ok(CKD_SQL), Ok(ALLOW), Ok(INSIGHT)]);
        let executor = CountingExecutor::default();

        let outcome = AgentPipeline::new(llm.clone())
            .run("What is the average BMI of patients with chronic kidney disease?", &executor, false)
            .await;

        let report = outcome.report().unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].status, StepStatus::Success);
        assert_eq!(report.steps[0].data, avg_bmi());
        assert_eq!(
            report.steps[0].sql,
            "SELECT AVG(bmi) AS avg_bmi FROM patients WHERE chronic_kidney_disease = 1"
        );
        assert_eq!(report.summary, "CKD patients average a BMI of 27.4");
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn unusable_plan_stops_before_generation() {
        let llm = ScriptedLlm::new(vec![Ok("I am not sure what you mean.")]);
        let executor = CountingExecutor::default();

        let outcome = AgentPipeline::new(llm.clone()).run("?", &executor, false).await;

        assert_eq!(outcome.error(), Some("decomposition failed"));
        assert_eq!(llm.calls(), 1);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn decomposition_transport_error_is_workflow_error() {
        let llm = ScriptedLlm::new(vec![Err(LlmError::Api {
            status: 503,
            message: "overloaded".into(),
        })]);
        let outcome = AgentPipeline::new(llm)
            .run("q", &CountingExecutor::default(), false)
            .await;

        let error = outcome.error().unwrap();
        assert!(error.starts_with("workflow error:"), "{error}");
        assert!(error.contains("503"));
    }

    #[tokio::test]
    async fn audit_error_never_reaches_executor() {
        let llm = ScriptedLlm::new(vec![
            Ok(ONE_STEP),
            Ok(CKD_SQL),
            Err(LlmError::Response("timeout".into())),
            Ok(INSIGHT),
        ]);
        let executor = CountingExecutor::default();

        let outcome = AgentPipeline::new(llm).run("q", &executor, false).await;

        let step = &outcome.steps()[0];
        assert_eq!(step.status, StepStatus::Failed);
        assert!(step.detail.starts_with("compliance audit error"));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn rejection_and_guard_block_steps() {
        let plan = r#"{"steps": [
            {"step_id": 1, "description": "list everything"},
            {"step_id": 2, "description": "count smokers"}
        ]}"#;
        let llm = ScriptedLlm::new(vec![
            Ok(plan),
            Ok(r#"{"sql": "SELECT * FROM patients"}"#),
            Ok(r#"{"sql": "SELECT COUNT(*) AS n FROM patients WHERE smoking = 1"}"#),
            Ok(r#"{"allowed": false, "reason": "not relevant"}"#),
            Ok(INSIGHT),
        ]);
        let executor = CountingExecutor::default();

        let outcome = AgentPipeline::new(llm.clone()).run("q", &executor, false).await;

        let steps = outcome.steps();
        assert_eq!(steps[0].status, StepStatus::Blocked);
        assert_eq!(steps[0].detail, "wildcard projection is not allowed");
        assert_eq!(steps[1].status, StepStatus::Blocked);
        assert_eq!(steps[1].detail, "not relevant");
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
        // guard-blocked step skips the compliance call
        assert_eq!(llm.calls(), 5);
    }

    #[tokio::test]
    async fn missing_sql_fails_step_and_run_continues() {
        let plan = r#"{"steps": [
            {"step_id": 2, "description": "second"},
            {"step_id": 1, "description": "first"}
        ]}"#;
        let llm = ScriptedLlm::new(vec![
            Ok(plan),
            Ok("no idea"),
            Ok(CKD_SQL),
            Ok(ALLOW),
            Ok("not json"),
        ]);
        let executor = CountingExecutor::default();

        let outcome = AgentPipeline::new(llm).run("q", &executor, true).await;

        let report = outcome.report().unwrap();
        let ids: Vec<u32> = report.steps.iter().map(|s| s.step_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert_eq!(report.steps[0].detail, NO_SQL_GENERATED);
        assert_eq!(report.steps[1].status, StepStatus::Success);
        assert_eq!(report.summary, NO_SUMMARY);
        assert!(report.key_insights.is_empty());
    }

    #[tokio::test]
    async fn synthesis_sees_every_attempt() {
        let plan = r#"{"steps": [
            {"step_id": 1, "description": "avg bmi"},
            {"step_id": 2, "description": "drop it"}
        ]}"#;
        let llm = ScriptedLlm::new(vec![
            Ok(plan),
            Ok(CKD_SQL),
            Ok(ALLOW),
            Ok(r#"{"sql": "DROP TABLE patients"}"#),
            Ok(INSIGHT),
        ]);

        AgentPipeline::new(llm.clone())
            .run("q", &CountingExecutor::default(), false)
            .await;

        let prompts = llm.prompts.lock().unwrap();
        let synthesis = prompts.last().unwrap();
        assert!(synthesis.contains("Step 1: avg bmi"));
        assert!(synthesis.contains("27.4"));
        assert!(synthesis.contains("Step 2 (drop it) BLOCKED"));
    }

    #[tokio::test]
    async fn panic_becomes_workflow_error() {
        let llm = ScriptedLlm::new(vec![Ok(ONE_STEP), Ok(CKD_SQL), Ok(ALLOW)]);
        let executor = CountingExecutor {
            panic: true,
            ..Default::default()
        };

        let outcome = AgentPipeline::new(llm).run("q", &executor, false).await;

        assert_eq!(outcome.error(), Some("workflow error: engine exploded"));
    }
}
