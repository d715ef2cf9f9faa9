use crate::execution::errors::PlanError;
use serde::{Deserialize, Deserializer, Serialize, de};

/// One analytical unit of a decomposed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(alias = "step_id", deserialize_with = "integral_id")]
    pub id: u32,
    pub description: String,
    #[serde(default)]
    pub needed_columns: Vec<String>,
}

/// Accepts `1`, `1.0` and `"1"`; rejects fractions, negatives and non-numbers.
fn integral_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(u64),
        Float(f64),
        Text(String),
    }

    fn from_float(v: f64) -> Option<u32> {
        (v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v)).then_some(v as u32)
    }

    let id = match RawId::deserialize(deserializer)? {
        RawId::Int(v) => u32::try_from(v).ok(),
        RawId::Float(v) => from_float(v),
        RawId::Text(s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_float))
        }
    };
    id.ok_or_else(|| de::Error::custom("step id must be a non-negative integer"))
}

/// Ordered, non-empty sequence of steps with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Validates and orders the steps ascending by id.
    pub fn new(mut steps: Vec<Step>) -> Result<Self, PlanError> {
        if steps.is_empty() {
            return Err(PlanError::Empty);
        }

        steps.sort_by_key(|s| s.id);
        for pair in steps.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(PlanError::DuplicateStep(pair[0].id));
            }
        }
        if let Some(step) = steps.iter().find(|s| s.description.trim().is_empty()) {
            return Err(PlanError::EmptyDescription(step.id));
        }

        Ok(Plan { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
