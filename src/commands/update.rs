//! Update command implementation

use console::Style;

use super::helpers::{Context, print_sync, read_request};
use crate::cli::UpdateArgs;
use crate::error::Result;

/// Run update command
pub fn run(context: &Context, args: &UpdateArgs) -> Result<()> {
    let changes = read_request(args.file.as_deref())?;
    let mut library = context.open_library()?;
    let outcome = library.update(&args.id, changes)?;

    context.emit(&outcome, |outcome| {
        println!(
            "{} {} {}",
            Style::new().bold().green().apply_to("Updated"),
            outcome.slug,
            Style::new().dim().apply_to(format!("({})", outcome.id))
        );
        print_sync(&outcome.sync);
    })
}
