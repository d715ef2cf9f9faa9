use crate::{execution::plan::Step, records::table::Table};
use serde::{Deserialize, Serialize};

/// SQL produced for one step. Never empty, never ends with a statement separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSql {
    pub sql: String,
    pub explanation: String,
}

impl GeneratedSql {
    /// Normalizes `sql` (trim, drop trailing `;`); `None` when nothing is left.
    pub fn new(sql: &str, explanation: &str) -> Option<Self> {
        let sql = sql.trim().trim_end_matches(';').trim_end();
        if sql.is_empty() {
            return None;
        }
        Some(GeneratedSql {
            sql: sql.to_string(),
            explanation: explanation.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub allowed: bool,
    pub reason: String,
}

impl ComplianceVerdict {
    pub fn allow(reason: &str) -> Self {
        ComplianceVerdict {
            allowed: true,
            reason: reason.to_string(),
        }
    }

    pub fn reject(reason: &str) -> Self {
        ComplianceVerdict {
            allowed: false,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Blocked,
    Failed,
}

/// Outcome of attempting one step; the ordered sequence of these is the run's trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: u32,
    pub description: String,
    pub sql: String,
    pub data: Table,
    pub status: StepStatus,
    pub detail: String,
}

impl StepResult {
    pub fn success(step: &Step, sql: &str, data: Table) -> Self {
        StepResult {
            step_id: step.id,
            description: step.description.clone(),
            sql: sql.to_string(),
            data,
            status: StepStatus::Success,
            detail: String::new(),
        }
    }

    pub fn blocked(step: &Step, sql: &str, reason: &str) -> Self {
        Self::unsuccessful(step, sql, StepStatus::Blocked, reason)
    }

    pub fn failed(step: &Step, sql: &str, detail: &str) -> Self {
        Self::unsuccessful(step, sql, StepStatus::Failed, detail)
    }

    fn unsuccessful(step: &Step, sql: &str, status: StepStatus, detail: &str) -> Self {
        StepResult {
            step_id: step.id,
            description: step.description.clone(),
            sql: sql.to_string(),
            data: Table::empty(),
            status,
            detail: detail.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    /// Text block describing this attempt, fed to insight synthesis.
    pub fn transcript(&self) -> String {
        match self.status {
            StepStatus::Success => format!(
                "Step {}: {}\nSQL: {}\nResult Data:\n{}\n\n",
                self.step_id, self.description, self.sql, self.data
            ),
            StepStatus::Blocked => format!(
                "Step {} ({}) BLOCKED by compliance review: {}\n\n",
                self.step_id, self.description, self.detail
            ),
            StepStatus::Failed => format!(
                "Step {} ({}) Failed: {}\n\n",
                self.step_id, self.description, self.detail
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn step() -> Step {
        Step {
            id: 1,
            description: "Average BMI of CKD patients".into(),
            needed_columns: vec!["bmi".into()],
        }
    }

    #[test]
    fn generated_sql_is_normalized() {
        let generated = GeneratedSql::new("  SELECT 1;; \n", "one").unwrap();
        assert_eq!(generated.sql, "SELECT 1");
        assert!(GeneratedSql::new(" ; ", "").is_none());
    }

    #[test]
    fn transcript_includes_result_data() {
        let data = Table::from_rows(&["avg_bmi"], vec![vec![Value::Float(27.4)]]);
        let result = StepResult::success(&step(), "SELECT AVG(bmi) AS avg_bmi FROM patients", data);
        let text = result.transcript();
        assert!(text.starts_with("Step 1: Average BMI of CKD patients\nSQL: SELECT AVG"));
        assert!(text.contains("avg_bmi\n   27.4"));
    }

    #[test]
    fn failed_steps_carry_no_data() {
        let result = StepResult::failed(&step(), "", "no SQL generated");
        assert!(result.data.is_empty());
        assert!(result.transcript().contains("Failed: no SQL generated"));
    }
}
