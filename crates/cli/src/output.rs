use crate::error::CliError;
use connectors::session::entry::TableEntry;
use model::{
    execution::{
        outcome::{InsightReport, PipelineOutcome},
        step::StepStatus,
    },
    records::table::Table,
};
use std::fmt::Write;

pub fn print_outcome(outcome: &PipelineOutcome, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        PipelineOutcome::Success(report) => print!("{}", render_report(report)),
        PipelineOutcome::Failure { error } => return Err(CliError::Pipeline(error.clone())),
    }
    Ok(())
}

pub fn render_report(report: &InsightReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", report.summary);

    if !report.key_insights.is_empty() {
        let _ = writeln!(out, "Key insights:");
        for insight in &report.key_insights {
            let _ = writeln!(out, "  - {insight}");
        }
        let _ = writeln!(out);
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "Recommendations:");
        for rec in &report.recommendations {
            let _ = writeln!(out, "  - {rec}");
        }
        let _ = writeln!(out);
    }

    for step in &report.steps {
        let status = match step.status {
            StepStatus::Success => "ok",
            StepStatus::Blocked => "blocked",
            StepStatus::Failed => "failed",
        };
        let _ = writeln!(out, "[{status}] Step {}: {}", step.step_id, step.description);
        if !step.sql.is_empty() {
            let _ = writeln!(out, "  SQL: {}", step.sql);
        }
        match step.status {
            StepStatus::Success => {
                let _ = writeln!(out, "{}\n", step.data);
            }
            _ => {
                let _ = writeln!(out, "  {}\n", step.detail);
            }
        }
    }
    out
}

/// A query result as aligned text, or as an array of JSON records.
pub fn render_table(table: &Table, as_json: bool) -> Result<String, CliError> {
    if as_json {
        return Ok(serde_json::to_string_pretty(&table.to_records())?);
    }
    Ok(table.to_string())
}

pub fn print_sources(entries: &[TableEntry]) {
    if entries.is_empty() {
        println!("No session tables registered.");
        return;
    }
    println!("{:<24} {:<10} {:>8}  Columns", "Name", "Kind", "Rows");
    for entry in entries {
        println!(
            "{:<24} {:<10} {:>8}  {}",
            entry.name,
            entry.kind.to_string(),
            entry.row_count,
            entry.columns.join(", ")
        );
    }
}
