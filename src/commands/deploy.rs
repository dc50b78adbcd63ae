//! Deploy command implementation

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use super::helpers::{Context, label};
use crate::cli::{DeployAction, DeployArgs, DeployPushArgs};
use crate::deploy::{self, DeployOptions, DeployStatus};
use crate::error::Result;

/// Run deploy command
pub fn run(context: &Context, args: &DeployArgs) -> Result<()> {
    let site = context.site()?;
    match &args.action {
        DeployAction::Status => {
            let report = deploy::status(&site)?;
            context.emit(&report, print_status)
        }
        DeployAction::Push(push) => {
            let spinner = (!context.json).then(|| spinner(push));
            let result = deploy::push(
                &site,
                DeployOptions {
                    message: push.message.clone(),
                    new_version: push.new_version.clone(),
                },
            );
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let outcome = result?;
            context.emit(&outcome, |outcome| {
                println!(
                    "{} {}",
                    Style::new().bold().green().apply_to(&outcome.message),
                    Style::new().dim().apply_to(format!("({})", outcome.commit_message))
                );
            })
        }
    }
}

fn spinner(args: &DeployPushArgs) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(match &args.new_version {
        Some(version) => format!("Deploying {version}..."),
        None => "Deploying...".to_string(),
    });
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_status(report: &DeployStatus) {
    let status = &report.status;

    let branch = status.current.as_deref().unwrap_or("(detached)");
    match &status.tracking {
        Some(tracking) => println!(
            "{} {branch} -> {tracking} (ahead {}, behind {})",
            label("Branch:"),
            status.ahead,
            status.behind
        ),
        None => println!("{} {branch}", label("Branch:")),
    }
    println!(
        "{} {} (local {}, {} deploys)",
        label("Version:"),
        report.version.public,
        report.version.local,
        report.version.deploy_count
    );
    println!();

    if status.is_clean {
        println!("{}", Style::new().green().apply_to("Working tree clean"));
    } else {
        print_paths("Staged", &status.staged);
        print_paths("Modified", &status.modified);
        print_paths("Created", &status.created);
        print_paths("Deleted", &status.deleted);
        print_paths("Untracked", &status.not_added);
    }

    if !report.recent_commits.is_empty() {
        println!();
        println!("{}", label("Recent commits:"));
        for commit in &report.recent_commits {
            println!(
                "  {} {} {}",
                Style::new().yellow().apply_to(&commit.hash),
                commit.message,
                Style::new().dim().apply_to(format!("({}, {})", commit.author, commit.date))
            );
        }
    }
}

fn print_paths(heading: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    println!("{}", label(&format!("{heading}:")));
    for path in paths {
        println!("  {path}");
    }
}
