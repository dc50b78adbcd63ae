//! Error types and handling for exprlib
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use crate::schema::Violation;

/// Main error type for library operations
#[derive(Error, Diagnostic, Debug)]
pub enum LibraryError {
    // Record errors
    #[error("Expression not found: {id}")]
    #[diagnostic(
        code(exprlib::record::not_found),
        help("Run 'exprlib list' to see the ids of stored expressions")
    )]
    NotFound { id: String },

    #[error("Slug already exists: {slug}")]
    #[diagnostic(
        code(exprlib::record::duplicate_slug),
        help("Pick another slug or pass an explicit one with the request")
    )]
    DuplicateSlug { slug: String },

    #[error("Validation failed: {}", crate::schema::join_violations(.violations))]
    #[diagnostic(code(exprlib::record::validation_failed))]
    Validation { violations: Vec<Violation> },

    #[error("Malformed record {path}: {reason}")]
    #[diagnostic(
        code(exprlib::record::malformed),
        help("The file must start with a '---' header block closed by another '---' line")
    )]
    MalformedRecord { path: String, reason: String },

    #[error("Library check found {count} issue(s)")]
    #[diagnostic(
        code(exprlib::record::check_failed),
        help("Fix the files listed above, or the registries they refer to")
    )]
    CheckFailed { count: usize },

    #[error("Invalid request: {reason}")]
    #[diagnostic(
        code(exprlib::request::invalid),
        help("Requests are JSON objects using the stored header keys (title, code, annotations, ...)")
    )]
    InvalidRequest { reason: String },

    // Version control errors
    #[error("Sync failed: {message}")]
    #[diagnostic(code(exprlib::git::sync_failed))]
    Sync { message: String },

    #[error("No changes to commit")]
    #[diagnostic(code(exprlib::git::nothing_to_commit))]
    NothingToCommit,

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(exprlib::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(
        code(exprlib::git::open_failed),
        help("Run exprlib from inside the site's git checkout or pass --root")
    )]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to push to '{remote}': {reason}")]
    #[diagnostic(code(exprlib::git::push_failed))]
    GitPushFailed { remote: String, reason: String },

    // Configuration errors
    #[error("Failed to load registry: {path}")]
    #[diagnostic(
        code(exprlib::registry::load_failed),
        help("Check that the categories and projects JSON files exist and are valid")
    )]
    RegistryLoadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(exprlib::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to parse version file: {path}")]
    #[diagnostic(code(exprlib::version::parse_failed))]
    VersionParseFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(exprlib::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(exprlib::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(exprlib::fs::io_error))]
    IoError { message: String },
}

impl LibraryError {
    /// Machine-checkable error kind, stable across message wording changes
    pub fn kind(&self) -> &'static str {
        match self {
            LibraryError::NotFound { .. } => "not_found",
            LibraryError::DuplicateSlug { .. } => "duplicate_slug",
            LibraryError::Validation { .. } => "validation",
            LibraryError::MalformedRecord { .. } => "malformed_record",
            LibraryError::CheckFailed { .. } => "check_failed",
            LibraryError::InvalidRequest { .. } => "invalid_request",
            LibraryError::Sync { .. } => "sync",
            LibraryError::NothingToCommit => "nothing_to_commit",
            LibraryError::GitOperationFailed { .. }
            | LibraryError::GitOpenFailed { .. }
            | LibraryError::GitPushFailed { .. } => "git",
            LibraryError::RegistryLoadFailed { .. }
            | LibraryError::ConfigParseFailed { .. }
            | LibraryError::VersionParseFailed { .. } => "config",
            LibraryError::FileReadFailed { .. }
            | LibraryError::FileWriteFailed { .. }
            | LibraryError::IoError { .. } => "io",
        }
    }

    /// JSON body used by `--json` output for failed commands
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let LibraryError::Validation { violations } = self {
            body["violations"] = serde_json::json!(violations);
        }
        body
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for LibraryError {
    fn from(err: serde_yaml::Error) -> Self {
        LibraryError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::InvalidRequest {
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for LibraryError {
    fn from(err: git2::Error) -> Self {
        LibraryError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

impl From<inquire::InquireError> for LibraryError {
    fn from(err: inquire::InquireError) -> Self {
        LibraryError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, LibraryError>;
