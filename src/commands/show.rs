//! Show command implementation

use console::Style;

use super::helpers::{Context, label};
use crate::cli::ShowArgs;
use crate::error::Result;
use crate::record::Entry;

/// Run show command
pub fn run(context: &Context, args: &ShowArgs) -> Result<()> {
    let library = context.open_library()?;
    let entry = library.read(&args.id)?;
    context.emit(&entry, print_entry)
}

fn print_entry(entry: &Entry) {
    let record = &entry.record;

    println!("{}", Style::new().bold().yellow().apply_to(&record.title));
    println!("  {} {}", label("Id:"), record.id);
    println!("  {} {}", label("Slug:"), entry.slug);
    println!("  {} {}", label("Description:"), record.description);
    match &record.last_updated {
        Some(updated) => println!(
            "  {} {} (updated {updated})",
            label("Added:"),
            record.date_added
        ),
        None => println!("  {} {}", label("Added:"), record.date_added),
    }
    println!("  {} {}", label("After Effects:"), record.ae_version);
    println!(
        "  {} {}",
        label("Types:"),
        record.expression_types.join(", ")
    );
    println!(
        "  {} {} / {}",
        label("Applies to:"),
        record.layer_type,
        record.property_type
    );
    println!("  {} {}", label("Complexity:"), record.complexity);
    if !record.projects.is_empty() {
        println!("  {} {}", label("Projects:"), record.projects.join(", "));
    }
    if !record.tags.is_empty() {
        println!("  {} {}", label("Tags:"), record.tags.join(", "));
    }
    if let Some(validated_by) = &record.validated_by {
        println!("  {} {validated_by}", label("Validation:"));
    }

    println!();
    for line in record.code.lines() {
        println!("    {}", Style::new().cyan().apply_to(line));
    }

    println!();
    for annotation in &record.annotations {
        println!(
            "  {} {}",
            Style::new().bold().apply_to(format!("[{}]", annotation.lines)),
            annotation.title
        );
        for line in annotation.description.lines() {
            println!("      {line}");
        }
    }

    if let Some(notes) = &record.notes {
        println!();
        println!("{notes}");
    }
}
