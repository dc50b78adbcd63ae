//! exprlib - expression library authoring tool
//!
//! Edits the frontmatter records of a static expression-snippet site,
//! validates them against the site's registries, and publishes changes
//! through git.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collection;
mod commands;
mod config;
mod deploy;
mod error;
mod frontmatter;
mod git;
mod library;
mod path_utils;
mod record;
mod schema;
mod slug;
mod version;

use cli::{Cli, Commands};
use commands::helpers::Context;

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "exprlib=debug" } else { "exprlib=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = Context {
        root: cli.root,
        no_sync: cli.no_sync,
        json: cli.json,
    };

    let result = match &cli.command {
        Commands::List => commands::list::run(&context),
        Commands::Create(args) => commands::create::run(&context, args),
        Commands::Show(args) => commands::show::run(&context, args),
        Commands::Update(args) => commands::update::run(&context, args),
        Commands::Delete(args) => commands::delete::run(&context, args),
        Commands::ValidateSlug(args) => commands::validate_slug::run(&context, args),
        Commands::Version(args) => commands::version::run(&context, args),
        Commands::Deploy(args) => commands::deploy::run(&context, args),
        Commands::Check => commands::check::run(&context),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        if context.json {
            println!("{}", e.to_json());
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
