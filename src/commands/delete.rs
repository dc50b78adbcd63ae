//! Delete command implementation

use console::Style;
use inquire::Confirm;

use super::helpers::{Context, print_sync};
use crate::cli::DeleteArgs;
use crate::error::Result;

/// Run delete command
pub fn run(context: &Context, args: &DeleteArgs) -> Result<()> {
    let mut library = context.open_library()?;
    let entry = library.read(&args.id)?;

    if !args.yes && !confirm(&entry.record.title, &entry.slug)? {
        println!("Delete cancelled.");
        return Ok(());
    }

    let outcome = library.delete(&args.id)?;
    context.emit(&outcome, |outcome| {
        println!(
            "{} {} {}",
            Style::new().bold().green().apply_to("Deleted"),
            outcome.slug,
            Style::new().dim().apply_to(format!("({})", outcome.id))
        );
        print_sync(&outcome.sync);
    })
}

fn confirm(title: &str, slug: &str) -> Result<bool> {
    println!("\nThe expression '{title}' ({slug}) will be deleted.\n");
    Ok(Confirm::new("Proceed with delete?")
        .with_default(false)
        .with_help_message("Type 'y' to confirm, or press Enter to cancel")
        .prompt()?)
}
