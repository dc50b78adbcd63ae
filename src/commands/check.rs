//! Check command implementation
//!
//! Verifies the registries themselves and every stored expression against
//! them. Any finding makes the command exit non-zero.

use console::Style;
use serde::Serialize;

use super::helpers::Context;
use crate::collection::LoadIssue;
use crate::error::{LibraryError, Result};
use crate::schema::Violation;

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    records: usize,
    registry: Vec<Violation>,
    files: &'a [LoadIssue],
}

/// Run check command
pub fn run(context: &Context) -> Result<()> {
    let library = context.open_library()?;
    let report = CheckReport {
        records: library.list().len(),
        registry: library.registries().integrity_issues(),
        files: library.load_issues(),
    };

    context.emit(&report, print_report)?;

    let count = report.registry.len() + report.files.len();
    if count > 0 {
        return Err(LibraryError::CheckFailed { count });
    }
    Ok(())
}

fn print_report(report: &CheckReport<'_>) {
    for violation in &report.registry {
        println!(
            "{} {violation}",
            Style::new().bold().red().apply_to("registry")
        );
    }
    for issue in report.files {
        println!(
            "{} {}",
            Style::new().bold().red().apply_to(&issue.file),
            issue.message
        );
    }
    if report.registry.is_empty() && report.files.is_empty() {
        println!(
            "{} {} expressions checked",
            Style::new().bold().green().apply_to("OK"),
            report.records
        );
    }
}
