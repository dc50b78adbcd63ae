//! List command implementation

use console::Style;

use super::helpers::Context;
use crate::error::Result;
use crate::record::Summary;

/// Run list command
pub fn run(context: &Context) -> Result<()> {
    let library = context.open_library()?;
    context.emit(&library.list(), |summaries| print_summaries(summaries))
}

fn print_summaries(summaries: &[Summary]) {
    if summaries.is_empty() {
        println!("No expressions found.");
        return;
    }

    println!("Expressions ({}):", summaries.len());
    println!();
    for summary in summaries {
        println!(
            "  {} {}",
            Style::new().bold().yellow().apply_to(&summary.title),
            Style::new().dim().apply_to(format!("({})", summary.slug))
        );
        println!("    {}", summary.description);
        println!(
            "    {} {}",
            Style::new().cyan().apply_to(&summary.id),
            Style::new().dim().apply_to(&summary.date_added)
        );
    }
}
