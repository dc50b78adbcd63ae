//! Publishing the whole working tree
//!
//! Unlike the per-record sync, a deploy stages everything, may bump the site
//! version first, and fails loudly when there is nothing to publish.

use chrono::Local;
use serde::Serialize;

use crate::config::Site;
use crate::error::{LibraryError, Result};
use crate::git::{self, CommitInfo, RepoStatus, status::recent_commits};
use crate::version::{self, VersionInfo};

/// Repository state shown before a deploy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployStatus {
    pub status: RepoStatus,
    pub recent_commits: Vec<CommitInfo>,
    pub version: VersionInfo,
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub message: Option<String>,
    pub new_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub success: bool,
    pub message: String,
    pub commit_message: String,
}

pub fn status(site: &Site) -> Result<DeployStatus> {
    let repo = git::open(&site.root)?;
    Ok(DeployStatus {
        status: RepoStatus::read(&repo)?,
        recent_commits: recent_commits(&repo)?,
        version: VersionInfo::load(&site.version_path())?,
    })
}

/// Commit every change in the working tree and push it to the configured branch
pub fn push(site: &Site, options: DeployOptions) -> Result<DeployOutcome> {
    let repo = git::open(&site.root)?;

    if let Some(new_version) = options.new_version.as_deref().filter(|v| !v.is_empty()) {
        let info = version::update_file(&site.version_path(), |info| info.release(new_version))?;
        tracing::info!(public = %info.public, local = %info.local, "version bumped");
    }

    git::stage_all(&repo)?;
    if !git::has_staged_changes(&repo)? {
        return Err(LibraryError::NothingToCommit);
    }

    let commit_message = options
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(default_message);
    git::commit(&repo, &commit_message)?;
    git::push(&repo, &site.config.remote, &site.config.branch)?;

    Ok(DeployOutcome {
        success: true,
        message: "Deployed successfully".to_string(),
        commit_message,
    })
}

fn default_message() -> String {
    format!("Update: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::git::fixtures::{add_bare_remote, init_repo};
    use std::fs;
    use tempfile::TempDir;

    fn site_in(path: &std::path::Path) -> Site {
        Site::with_config(dunce::canonicalize(path).unwrap(), SiteConfig::default())
    }

    #[test]
    fn test_push_without_changes_fails() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(&temp.path().join("site"));
        add_bare_remote(&repo, &temp.path().join("remote.git"));
        let site = site_in(&temp.path().join("site"));

        let err = push(&site, DeployOptions::default()).unwrap_err();
        assert!(matches!(err, LibraryError::NothingToCommit));
        assert_eq!(err.to_string(), "No changes to commit");
    }

    #[test]
    fn test_push_with_new_version() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(&temp.path().join("site"));
        let bare = add_bare_remote(&repo, &temp.path().join("remote.git"));
        let site = site_in(&temp.path().join("site"));

        let outcome = push(
            &site,
            DeployOptions {
                message: None,
                new_version: Some("1.5.0-dev".to_string()),
            },
        )
        .unwrap();
        assert!(outcome.success);
        assert!(outcome.commit_message.starts_with("Update: "));

        let info = VersionInfo::load(&site.version_path()).unwrap();
        assert_eq!(info.public, "1.5.0");
        assert_eq!(info.local, "1.5.0-dev");
        assert_eq!(info.deploy_count, 1);

        let head = repo.head().unwrap().target();
        assert_eq!(bare.find_reference("refs/heads/main").unwrap().target(), head);
    }

    #[test]
    fn test_push_stages_untracked_and_deleted() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(&temp.path().join("site"));
        add_bare_remote(&repo, &temp.path().join("remote.git"));
        let site = site_in(&temp.path().join("site"));
        fs::remove_file(site.root.join("README.md")).unwrap();
        fs::write(site.root.join("new.txt"), "x").unwrap();

        push(
            &site,
            DeployOptions {
                message: Some("Tidy".to_string()),
                new_version: None,
            },
        )
        .unwrap();

        let status = RepoStatus::read(&repo).unwrap();
        assert!(status.is_clean);
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("Tidy"));
    }

    #[test]
    fn test_status_reports_changes_and_version() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let site = site_in(temp.path());
        fs::write(site.root.join("draft.mdx"), "x").unwrap();

        let report = status(&site).unwrap();
        assert!(!report.status.is_clean);
        assert_eq!(report.status.not_added, vec!["draft.mdx"]);
        assert_eq!(report.recent_commits.len(), 1);
        assert_eq!(report.version.deploy_count, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["recentCommits"][0]["message"], "Initial commit");
        assert_eq!(json["status"]["current"], "main");
    }
}
