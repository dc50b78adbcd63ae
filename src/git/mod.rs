//! Git operations for publishing content changes
//!
//! This module handles:
//! - Staging content paths and committing them
//! - Pushing to the configured remote
//! - Reporting repository status for deploys
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (GIT_SSH_COMMAND, etc.)

mod auth;
mod error;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Oid, PushOptions, RemoteCallbacks, Repository, Signature};

use crate::error::{LibraryError, Result};
use crate::path_utils::to_forward_slashes;

pub use auth::setup_auth_callbacks;
pub use error::interpret_git_error;
pub use status::{CommitInfo, RepoStatus};
pub use sync::{ContentSync, DisabledSync, GitSync, SyncStatus};

/// Identity used when neither the repository nor the user config names one
const FALLBACK_NAME: &str = "exprlib";
const FALLBACK_EMAIL: &str = "exprlib@localhost";

/// Open the repository containing `path`
pub fn open(path: &Path) -> Result<Repository> {
    Repository::discover(path).map_err(|e| LibraryError::GitOpenFailed {
        path: path.display().to_string(),
        reason: e.message().to_string(),
    })
}

/// Get the symbolic name of HEAD (e.g., "main", "master")
///
/// Returns None when HEAD is detached or the branch has no commits yet.
pub fn head_branch(repo: &Repository) -> Option<String> {
    match repo.head() {
        Ok(head) if head.is_branch() => head.shorthand().map(str::to_string),
        Ok(_) => None,
        // Unborn branch: HEAD still names it symbolically
        Err(_) => repo
            .find_reference("HEAD")
            .ok()
            .and_then(|r| r.symbolic_target().map(str::to_string))
            .and_then(|target| target.strip_prefix("refs/heads/").map(str::to_string)),
    }
}

/// Turn paths under the working tree into index pathspecs
pub fn pathspecs(repo: &Repository, paths: &[PathBuf]) -> Result<Vec<String>> {
    let workdir = repo.workdir().ok_or_else(|| LibraryError::GitOperationFailed {
        message: "repository has no working tree".to_string(),
    })?;
    let workdir = dunce::canonicalize(workdir)?;

    paths
        .iter()
        .map(|path| {
            let relative =
                path.strip_prefix(&workdir)
                    .map_err(|_| LibraryError::GitOperationFailed {
                        message: format!(
                            "{} is outside the repository at {}",
                            path.display(),
                            workdir.display()
                        ),
                    })?;
            Ok(to_forward_slashes(relative))
        })
        .collect()
}

/// Stage additions, modifications and deletions under the given pathspecs
pub fn stage(repo: &Repository, specs: &[String]) -> Result<()> {
    let mut index = repo.index()?;
    index.add_all(specs.iter().map(String::as_str), IndexAddOption::DEFAULT, None)?;
    index.update_all(specs.iter().map(String::as_str), None)?;
    index.write()?;
    Ok(())
}

/// Stage everything in the working tree, like `git add .`
pub fn stage_all(repo: &Repository) -> Result<()> {
    stage(repo, &[".".to_string()])
}

/// True if the index differs from HEAD
pub fn has_staged_changes(repo: &Repository) -> Result<bool> {
    let index = repo.index()?;
    let head_tree = match repo.head() {
        Ok(head) => Some(head.peel_to_tree()?),
        Err(_) => None,
    };
    let diff = repo.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
    Ok(diff.deltas().len() > 0)
}

/// Commit the current index on HEAD
pub fn commit(repo: &Repository, message: &str) -> Result<Oid> {
    let signature = repo
        .signature()
        .or_else(|_| Signature::now(FALLBACK_NAME, FALLBACK_EMAIL))?;

    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    let oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )?;
    tracing::info!(commit = %oid, "{message}");
    Ok(oid)
}

/// Push a local branch to the same branch on `remote_name`
pub fn push(repo: &Repository, remote_name: &str, branch: &str) -> Result<()> {
    let push_failed = |reason: String| LibraryError::GitPushFailed {
        remote: remote_name.to_string(),
        reason,
    };

    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|e| push_failed(interpret_git_error(&e)))?;

    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);
    callbacks.push_update_reference(|refname, status| match status {
        Some(reason) => Err(git2::Error::from_str(&format!(
            "{refname} rejected: {reason}"
        ))),
        None => Ok(()),
    });

    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);

    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    remote
        .push(&[refspec.as_str()], Some(&mut options))
        .map_err(|e| push_failed(interpret_git_error(&e)))?;

    tracing::info!(remote = remote_name, branch, "pushed");
    Ok(())
}
