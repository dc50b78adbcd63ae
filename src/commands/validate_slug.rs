//! Validate-slug command implementation

use super::helpers::Context;
use crate::cli::ValidateSlugArgs;
use crate::error::Result;

/// Run validate-slug command
pub fn run(context: &Context, args: &ValidateSlugArgs) -> Result<()> {
    let library = context.open_library()?;
    let check = library.check_slug(&args.slug, args.exclude_id.as_deref());

    context.emit(&check, |check| {
        if check.exists {
            println!("Slug '{}' is taken", check.slug);
        } else {
            println!("Slug '{}' is available", check.slug);
        }
    })
}
