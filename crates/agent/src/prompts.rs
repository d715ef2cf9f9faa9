//! Prompt templates for the four generative stages.

pub const SCHEMA: &str = "\
Table `patients`:
- patient_number (INT, key shared with `activity`)
- age, bmi, sex (0 = male, 1 = female), pregnancy, smoking (0 = no, 1 = yes)
- alcohol_consumption_per_day, salt_content_in_the_diet
- blood_pressure_abnormality (0/1), chronic_kidney_disease (0/1), adrenal_and_thyroid_disorders (0/1)
- level_of_hemoglobin, genetic_pedigree_coefficient
- level_of_stress (1 = low, 2 = normal, 3 = high)

Table `activity`:
- patient_number (INT)
- day_number, physical_activity";

pub fn decomposition(question: &str) -> String {
    format!(
        "You are a senior healthcare data analyst.
Split the user's question into simple, independent analytical steps, each answerable by one SQL query.

User question: {question}

Data schema:
{SCHEMA}

Instructions:
1. If the question asks about several things, give each its own step.
2. Each step must produce one specific dataset or metric.
3. List the columns each step needs.

Respond with ONLY a JSON object of this shape, with no text outside it:
{{\"steps\": [{{\"step_id\": 1, \"description\": \"...\", \"needed_columns\": [\"...\"]}}]}}"
    )
}

/// Deliberately carries only the one step's description.
pub fn sql_generation(step_description: &str) -> String {
    format!(
        "You are a PostgreSQL expert. Write one SQL query for the task below.

Task: {step_description}

Database schema:
{SCHEMA}

Constraints:
1. Address ONLY this task, nothing else the user may have asked.
2. Never use `SELECT *` or `alias.*`; select specific columns or aggregates.
3. Aggregate (AVG, COUNT, SUM, ...) unless the task explicitly asks to list rows.
4. Join the tables with `LEFT JOIN` on `patient_number` when both are needed.
5. Standard PostgreSQL syntax, a single statement.

Respond with ONLY a JSON object, no markdown:
{{\"sql\": \"...\", \"explanation\": \"...\"}}"
    )
}

pub fn compliance(sql: &str, step_description: &str) -> String {
    format!(
        "You are a strict HIPAA and GDPR compliance officer.
Review this SQL query for a healthcare analytics application.

SQL query: {sql}
Task description: {step_description}

Rules:
1. No modification: reject any DROP, DELETE, INSERT, UPDATE, TRUNCATE, ALTER or GRANT.
2. Privacy: `SELECT *` is forbidden. Personally identifying data is forbidden.
   `patient_number` may be used for joins or cohort identification; aggregates are preferred.
3. Relevance: the query must answer the task description.

Respond with ONLY a JSON object:
{{\"allowed\": true or false, \"reason\": \"...\"}}"
    )
}

pub fn synthesis(question: &str, transcript: &str) -> String {
    format!(
        "You are a chief medical officer and data scientist.
Answer the user's question from the analytical results below.

User question: {question}

Analytical steps and results:
{transcript}

Instructions:
1. summary: a direct, data-backed answer to the question.
2. key_insights: notable trends, correlations or alarming figures.
3. recommendations: clinical or lifestyle interventions suggested by the risk factors found.
Keep a professional, evidence-based tone.

Respond with ONLY a JSON object:
{{\"summary\": \"...\", \"key_insights\": [\"...\"], \"recommendations\": [\"...\"]}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_holds_only_the_step() {
        let prompt = sql_generation("Average BMI of smokers");
        assert!(prompt.contains("Task: Average BMI of smokers"));
        assert!(prompt.contains("LEFT JOIN"));
        assert!(prompt.contains("{\"sql\": \"...\""));
    }

    #[test]
    fn decomposition_prompt_embeds_schema() {
        let prompt = decomposition("How active are smokers?");
        assert!(prompt.contains("How active are smokers?"));
        assert!(prompt.contains("physical_activity"));
    }
}
