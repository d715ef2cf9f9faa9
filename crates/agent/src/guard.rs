//! Deterministic screening of generated SQL, applied before the compliance
//! model is consulted. A statement that fails here never reaches the model
//! or the executor.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref MUTATING_KEYWORD: Regex = Regex::new(
        r"(?i)\b(DROP|DELETE|INSERT|UPDATE|TRUNCATE|ALTER|GRANT|CREATE|REVOKE|MERGE)\b"
    )
    .unwrap();
    static ref SELECT_STAR: Regex = Regex::new(r"(?i)\bSELECT\s+(?:DISTINCT\s+|ALL\s+)?\*").unwrap();
    static ref QUALIFIED_STAR: Regex = Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\s*\.\s*\*").unwrap();
    static ref STRING_LITERAL: Regex = Regex::new(r"'(?:[^']|'')*'").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("statement contains forbidden keyword {0}")]
    MutatingKeyword(String),

    #[error("wildcard projection is not allowed")]
    WildcardProjection,

    #[error("multiple statements are not allowed")]
    MultipleStatements,
}

/// Screens `sql`. The contents of string literals are not inspected.
pub fn screen(sql: &str) -> Result<(), GuardViolation> {
    let stripped = STRING_LITERAL.replace_all(sql, "''");
    let sql: &str = &stripped;
    if let Some(found) = MUTATING_KEYWORD.find(sql) {
        return Err(GuardViolation::MutatingKeyword(
            found.as_str().to_ascii_uppercase(),
        ));
    }
    if SELECT_STAR.is_match(sql) || QUALIFIED_STAR.is_match(sql) {
        return Err(GuardViolation::WildcardProjection);
    }
    if sql.trim().trim_end_matches(';').contains(';') {
        return Err(GuardViolation::MultipleStatements);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_aggregates() {
        assert_eq!(
            screen("SELECT AVG(bmi) AS avg_bmi FROM patients WHERE chronic_kidney_disease = 1"),
            Ok(())
        );
        assert_eq!(screen("SELECT COUNT(*) AS n FROM patients"), Ok(()));
        assert_eq!(
            screen("SELECT p.sex, AVG(a.physical_activity) FROM patients p LEFT JOIN activity a \
                    ON p.patient_number = a.patient_number GROUP BY p.sex"),
            Ok(())
        );
    }

    #[test]
    fn rejects_mutating_keywords() {
        assert_eq!(
            screen("drop table patients"),
            Err(GuardViolation::MutatingKeyword("DROP".into()))
        );
        assert!(matches!(
            screen("UPDATE patients SET bmi = 0"),
            Err(GuardViolation::MutatingKeyword(_))
        ));
    }

    #[test]
    fn keyword_inside_identifier_is_fine() {
        assert_eq!(screen("SELECT COUNT(last_update) FROM patients"), Ok(()));
        assert_eq!(screen("SELECT created_at_day FROM activity LIMIT 5"), Ok(()));
    }

    #[test]
    fn rejects_wildcards() {
        assert_eq!(
            screen("SELECT * FROM patients"),
            Err(GuardViolation::WildcardProjection)
        );
        assert_eq!(
            screen("SELECT DISTINCT * FROM patients"),
            Err(GuardViolation::WildcardProjection)
        );
        assert_eq!(
            screen("SELECT p.* FROM patients p"),
            Err(GuardViolation::WildcardProjection)
        );
    }

    #[test]
    fn string_literals_are_not_screened() {
        assert_eq!(
            screen("SELECT COUNT(patient_number) FROM patients WHERE note = 'update; pending'"),
            Ok(())
        );
        assert_eq!(
            screen("SELECT sex FROM patients WHERE label = 'it''s a.* drop'"),
            Ok(())
        );
        assert_eq!(
            screen("SELECT sex FROM patients WHERE label = 'x'; DELETE FROM patients"),
            Err(GuardViolation::MutatingKeyword("DELETE".into()))
        );
    }

    #[test]
    fn rejects_statement_chains() {
        assert_eq!(
            screen("SELECT 1; SELECT 2"),
            Err(GuardViolation::MultipleStatements)
        );
        assert_eq!(screen("SELECT 1;"), Ok(()));
    }
}
