//! Shared plumbing for command implementations

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use console::Style;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::Site;
use crate::error::{LibraryError, Result};
use crate::git::{ContentSync, DisabledSync, GitSync, SyncStatus};
use crate::library::Library;

/// Global options every command runs with
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub root: Option<PathBuf>,
    pub no_sync: bool,
    pub json: bool,
}

impl Context {
    pub fn site(&self) -> Result<Site> {
        let root = match &self.root {
            Some(path) => path.clone(),
            None => std::env::current_dir().map_err(|e| LibraryError::IoError {
                message: format!("Failed to get current directory: {e}"),
            })?,
        };
        Site::open(&root)
    }

    /// Open the library with the sync collaborator the flags and config ask for
    pub fn open_library(&self) -> Result<Library> {
        let site = self.site()?;
        let sync: Box<dyn ContentSync> = if self.no_sync || !site.config.auto_sync {
            Box::new(DisabledSync)
        } else {
            Box::new(GitSync::new(&site))
        };
        let library = Library::open(&site, sync)?;
        for issue in library.load_issues() {
            tracing::warn!(file = %issue.file, "{}", issue.message);
        }
        Ok(library)
    }

    /// Print `value` as JSON, or run the human formatter
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Read a JSON object from `file`, or from stdin when no file is given
pub fn read_request(file: Option<&Path>) -> Result<Mapping> {
    let text = match file {
        Some(path) => fs::read_to_string(path).map_err(|e| LibraryError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_request(&text)
}

pub fn parse_request(text: &str) -> Result<Mapping> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    if !json.is_object() {
        return Err(LibraryError::InvalidRequest {
            reason: "request must be a JSON object".to_string(),
        });
    }
    match serde_yaml::to_value(json) {
        Ok(Value::Mapping(fields)) => Ok(fields),
        _ => Err(LibraryError::InvalidRequest {
            reason: "request could not be converted".to_string(),
        }),
    }
}

pub fn print_sync(status: &SyncStatus) {
    if !status.attempted {
        println!("  {}", Style::new().dim().apply_to("Sync skipped"));
    } else if status.success {
        println!("  {}", Style::new().green().apply_to("Synced"));
    } else {
        println!(
            "  {} {}",
            Style::new().bold().yellow().apply_to("Sync failed:"),
            status.error.as_deref().unwrap_or("unknown error")
        );
    }
}

pub fn label(text: &str) -> console::StyledObject<&str> {
    Style::new().bold().apply_to(text)
}
