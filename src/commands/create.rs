//! Create command implementation

use console::Style;

use super::helpers::{Context, print_sync, read_request};
use crate::cli::CreateArgs;
use crate::error::Result;
use crate::library::WriteOutcome;

/// Run create command
pub fn run(context: &Context, args: &CreateArgs) -> Result<()> {
    let request = read_request(args.file.as_deref())?;
    let mut library = context.open_library()?;
    let outcome = library.create(request)?;
    context.emit(&outcome, print_outcome)
}

fn print_outcome(outcome: &WriteOutcome) {
    println!(
        "{} {} {}",
        Style::new().bold().green().apply_to("Created"),
        outcome.slug,
        Style::new().dim().apply_to(format!("({})", outcome.id))
    );
    print_sync(&outcome.sync);
}
