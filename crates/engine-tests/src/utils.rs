#![allow(dead_code)]

use agent::{LlmClient, LlmError};
use async_trait::async_trait;
use connectors::sql::{analytic::context::AnalyticContext, base::error::DbError, base::remote::RemoteStore};
use federation::{QueryExecutor, error::FederationError};
use model::{core::value::Value, records::table::Table};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const CKD_QUESTION: &str = "What is the average BMI of patients with chronic kidney disease?";
pub const CKD_SQL: &str = "SELECT AVG(bmi) AS avg_bmi FROM patients WHERE chronic_kidney_disease = 1";

/// Remote `patients` rows:
/// (patient_number, age, bmi, sex, smoking, ckd, adrenal_and_thyroid, bp_abnormality, stress).
/// The two kidney-disease patients average a BMI of 27.4.
pub const SEED_PATIENTS: [(i64, i64, f64, i64, i64, i64, i64, i64, i64); 6] = [
    (1, 45, 25.0, 0, 1, 1, 0, 1, 2),
    (2, 52, 29.8, 1, 0, 1, 1, 1, 3),
    (3, 38, 22.1, 1, 0, 0, 0, 0, 1),
    (4, 61, 31.5, 0, 1, 0, 0, 1, 3),
    (5, 29, 20.4, 1, 0, 0, 1, 0, 2),
    (6, 57, 27.0, 0, 1, 0, 0, 1, 2),
];

/// Remote `activity` rows: (patient_number, day_number, physical_activity).
pub const SEED_ACTIVITY: [(i64, i64, i64); 6] = [
    (1, 1, 4200),
    (1, 2, 3900),
    (2, 1, 8100),
    (3, 1, 12000),
    (4, 1, 2500),
    (4, 2, 3100),
];

/// LLM double answering from a queue of canned replies and recording every prompt.
/// An exhausted queue answers with a response error.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(ScriptedLlm {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Replies where `None` stands for a transport failure.
    pub fn with_failures(replies: &[Option<&str>]) -> Arc<Self> {
        Arc::new(ScriptedLlm {
            replies: Mutex::new(
                replies
                    .iter()
                    .map(|r| match r {
                        Some(text) => Ok(text.to_string()),
                        None => Err(LlmError::Api {
                            status: 500,
                            message: "upstream unavailable".into(),
                        }),
                    })
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
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

/// Remote store served by an in-memory DuckDB database seeded with the
/// canonical tables. Records every statement it receives.
pub struct SeededRemote {
    context: Mutex<AnalyticContext>,
    statements: Mutex<Vec<String>>,
}

impl SeededRemote {
    pub fn new() -> Arc<Self> {
        let mut context = AnalyticContext::in_memory().unwrap();
        context.register("patients", &seed_patients()).unwrap();
        context.register("activity", &seed_activity()).unwrap();
        Arc::new(SeededRemote {
            context: Mutex::new(context),
            statements: Mutex::new(Vec::new()),
        })
    }

    /// Adds a table that exists only on the remote side.
    pub fn add_table(&self, name: &str, table: &Table) {
        self.context.lock().unwrap().register(name, table).unwrap();
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for SeededRemote {
    async fn execute(&self, sql: &str) -> Result<Table, DbError> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.context.lock().unwrap().query(sql)
    }
}

/// Remote store answering every statement with the same table.
pub struct FixedRemote {
    table: Table,
    statements: Mutex<Vec<String>>,
}

impl FixedRemote {
    pub fn new(table: Table) -> Arc<Self> {
        Arc::new(FixedRemote {
            table,
            statements: Mutex::new(Vec::new()),
        })
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for FixedRemote {
    async fn execute(&self, sql: &str) -> Result<Table, DbError> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(self.table.clone())
    }
}

/// Remote store that is unreachable.
#[derive(Default)]
pub struct FailingRemote {
    pub calls: AtomicUsize,
}

#[async_trait]
impl RemoteStore for FailingRemote {
    async fn execute(&self, _sql: &str) -> Result<Table, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DbError::Unknown("connection refused".into()))
    }
}

/// Executor wrapper counting how often the pipeline reaches execution.
pub struct CountingExecutor<E> {
    inner: E,
    calls: AtomicUsize,
}

impl<E: QueryExecutor> CountingExecutor<E> {
    pub fn new(inner: E) -> Self {
        CountingExecutor {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for CountingExecutor<E> {
    async fn execute(&self, sql: &str, include_uploaded: bool) -> Result<Table, FederationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(sql, include_uploaded).await
    }
}

pub fn seed_patients() -> Table {
    Table::from_rows(
        &[
            "patient_number",
            "age",
            "bmi",
            "sex",
            "smoking",
            "chronic_kidney_disease",
            "adrenal_and_thyroid_disorders",
            "blood_pressure_abnormality",
            "level_of_stress",
        ],
        SEED_PATIENTS
            .iter()
            .map(|&(id, age, bmi, sex, smoking, ckd, adrenal, bp, stress)| {
                vec![
                    Value::Int(id),
                    Value::Int(age),
                    Value::Float(bmi),
                    Value::Int(sex),
                    Value::Int(smoking),
                    Value::Int(ckd),
                    Value::Int(adrenal),
                    Value::Int(bp),
                    Value::Int(stress),
                ]
            })
            .collect(),
    )
}

pub fn seed_activity() -> Table {
    Table::from_rows(
        &["patient_number", "day_number", "physical_activity"],
        SEED_ACTIVITY
            .iter()
            .map(|&(id, day, steps)| vec![Value::Int(id), Value::Int(day), Value::Int(steps)])
            .collect(),
    )
}

pub fn avg_bmi_table(avg: f64) -> Table {
    Table::from_rows(&["avg_bmi"], vec![vec![Value::Float(avg)]])
}

/// Decomposition reply with one step per description, ids starting at 1.
pub fn plan_reply(descriptions: &[&str]) -> String {
    let steps: Vec<serde_json::Value> = descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| serde_json::json!({"step_id": i + 1, "description": d, "needed_columns": []}))
        .collect();
    format!("<think>splitting the question</think>\n```json\n{}\n```", serde_json::json!({"steps": steps}))
}

pub fn sql_reply(sql: &str) -> String {
    serde_json::json!({"sql": sql, "explanation": "generated"}).to_string()
}

pub const ALLOW_REPLY: &str = r#"{"allowed": true, "reason": "aggregate query, relevant"}"#;

pub const INSIGHT_REPLY: &str = r#"{"summary": "Patients with chronic kidney disease have an average BMI of 27.4.", "key_insights": ["The CKD cohort sits in the overweight range."], "recommendations": ["Offer weight-management counselling to CKD patients."]}"#;

/// Numeric cell as f64, panicking with context when absent.
pub fn cell_f64(table: &Table, row: usize, column: &str) -> f64 {
    table
        .value(row, column)
        .and_then(Value::as_f64)
        .unwrap_or_else(|| panic!("no numeric value at row {row}, column {column}"))
}
