//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// exprlib - expression library authoring tool
///
/// Create, edit and publish the expression snippets of a static site.
#[derive(Parser, Debug)]
#[command(
    name = "exprlib",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Authoring tool for a library of expression snippets",
    long_about = "exprlib edits the library of expression snippets behind a static site. Each \
                  snippet is one frontmatter file in the content directory; every change is validated against \
                  the category and project registries, written atomically, and optionally \
                  committed and pushed.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  exprlib list\n    \
                  exprlib create --file loop-wiggle.json\n    \
                  exprlib show expr-m5x1k2ab --json\n    \
                  exprlib deploy push --new-version 1.4.0-dev"
)]
pub struct Cli {
    /// Site root (defaults to current directory)
    #[arg(long, short = 'r', global = true, env = "EXPRLIB_ROOT")]
    pub root: Option<PathBuf>,

    /// Do not commit and push after create, update or delete
    #[arg(long, global = true, env = "EXPRLIB_NO_SYNC")]
    pub no_sync: bool,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List expression summaries
    List,

    /// Create an expression from a JSON request
    Create(CreateArgs),

    /// Show one expression
    Show(ShowArgs),

    /// Update an expression with a JSON change set
    Update(UpdateArgs),

    /// Delete an expression
    Delete(DeleteArgs),

    /// Check whether a slug is already taken
    ValidateSlug(ValidateSlugArgs),

    /// Show or change the site version
    Version(VersionArgs),

    /// Inspect or publish repository changes
    Deploy(DeployArgs),

    /// Check registries and every stored expression
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the create command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Create from a file:\n    exprlib create --file loop-wiggle.json\n\n\
                  Create from stdin:\n    cat loop-wiggle.json | exprlib create\n\n\
                  Create without committing:\n    exprlib create --file loop-wiggle.json --no-sync")]
pub struct CreateArgs {
    /// JSON request file (reads stdin when omitted)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Expression id (expr-...)
    pub id: String,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Rename an expression:\n    echo '{\"slug\": \"loop-wiggle-v2\"}' | exprlib update expr-m5x1k2ab\n\n\
                  Clear the notes:\n    echo '{\"notes\": null}' | exprlib update expr-m5x1k2ab")]
pub struct UpdateArgs {
    /// Expression id (expr-...)
    pub id: String,

    /// JSON change set file (reads stdin when omitted)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Delete with confirmation:\n    exprlib delete expr-m5x1k2ab\n\n\
                  Delete without confirmation:\n    exprlib delete expr-m5x1k2ab -y")]
pub struct DeleteArgs {
    /// Expression id (expr-...)
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the validate-slug command
#[derive(Parser, Debug)]
pub struct ValidateSlugArgs {
    pub slug: String,

    /// Ignore the expression with this id (when renaming it)
    #[arg(long)]
    pub exclude_id: Option<String>,
}

#[derive(Parser, Debug)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub action: VersionAction,
}

#[derive(Subcommand, Debug)]
pub enum VersionAction {
    /// Print the version file
    Show,

    /// Change the public and/or local version
    Set(VersionSetArgs),
}

#[derive(Parser, Debug)]
pub struct VersionSetArgs {
    #[arg(long)]
    pub public: Option<String>,

    #[arg(long)]
    pub local: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DeployArgs {
    #[command(subcommand)]
    pub action: DeployAction,
}

#[derive(Subcommand, Debug)]
pub enum DeployAction {
    /// Show working tree changes, branch tracking and recent commits
    Status,

    /// Stage everything, commit and push
    Push(DeployPushArgs),
}

#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Publish pending changes:\n    exprlib deploy push\n\n\
                  Publish as a new version:\n    exprlib deploy push --new-version 1.4.0-dev -m \"Release 1.4.0\"")]
pub struct DeployPushArgs {
    /// Commit message (defaults to a timestamp)
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Set the local version to this and the public version to it without `-dev`
    #[arg(long)]
    pub new_version: Option<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    exprlib completions bash > ~/.bash_completion.d/exprlib\n\n\
                  Generate zsh completions:\n    exprlib completions zsh > ~/.zfunc/_exprlib")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
