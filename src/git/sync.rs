//! Best-effort publishing after content writes
//!
//! A sync never fails the operation that triggered it. Its result is reported
//! next to the operation's own result, and a failed push leaves the content
//! change on disk as the authoritative state.

use std::path::PathBuf;

use serde::Serialize;

use super::{commit, has_staged_changes, head_branch, open, pathspecs, push, stage};
use crate::config::Site;
use crate::error::{LibraryError, Result};
use crate::version;

/// Outcome of a sync attempt, attached to every write result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub attempted: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncStatus {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn succeeded() -> Self {
        Self {
            attempted: true,
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            attempted: true,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Receives a notification after every persisted content change
pub trait ContentSync {
    fn sync(&self, message: &str) -> SyncStatus;
}

/// Sync turned off by configuration or `--no-sync`
pub struct DisabledSync;

impl ContentSync for DisabledSync {
    fn sync(&self, _message: &str) -> SyncStatus {
        SyncStatus::skipped()
    }
}

/// Stages the content directory and version file, commits, and pushes
pub struct GitSync {
    root: PathBuf,
    paths: Vec<PathBuf>,
    version_file: PathBuf,
    remote: String,
    branch: String,
}

impl GitSync {
    pub fn new(site: &Site) -> Self {
        Self {
            root: site.root.clone(),
            paths: vec![site.content_dir(), site.version_path()],
            version_file: site.version_path(),
            remote: site.config.remote.clone(),
            branch: site.config.branch.clone(),
        }
    }

    fn publish(&self, message: &str) -> Result<()> {
        let repo = open(&self.root)?;
        let specs = pathspecs(&repo, &self.paths)?;
        stage(&repo, &specs)?;

        if !has_staged_changes(&repo)? {
            tracing::debug!("nothing staged, skipping commit");
            return Ok(());
        }

        commit(&repo, message)?;
        let branch = head_branch(&repo).unwrap_or_else(|| self.branch.clone());
        push(&repo, &self.remote, &branch)?;

        version::update_file(&self.version_file, version::VersionInfo::record_deploy)?;
        Ok(())
    }
}

impl ContentSync for GitSync {
    fn sync(&self, message: &str) -> SyncStatus {
        match self.publish(message) {
            Ok(()) => SyncStatus::succeeded(),
            Err(e) => {
                let error = LibraryError::Sync {
                    message: e.to_string(),
                };
                tracing::warn!(%error, "content change kept locally");
                SyncStatus::failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{add_bare_remote, init_repo};
    use super::*;
    use crate::config::SiteConfig;
    use crate::version::VersionInfo;
    use std::fs;
    use tempfile::TempDir;

    fn site_in(path: &std::path::Path) -> Site {
        Site::with_config(dunce::canonicalize(path).unwrap(), SiteConfig::default())
    }

    fn write_record(site: &Site, name: &str) {
        fs::create_dir_all(site.content_dir()).unwrap();
        fs::write(site.content_dir().join(name), "---\nid: \"expr-1\"\n---\n").unwrap();
    }

    #[test]
    fn test_sync_commits_and_pushes() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(&temp.path().join("site"));
        let bare = add_bare_remote(&repo, &temp.path().join("remote.git"));
        let site = site_in(&temp.path().join("site"));
        write_record(&site, "one.mdx");

        let status = GitSync::new(&site).sync("Add expression: One");
        assert_eq!(status, SyncStatus::succeeded());

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message(), Some("Add expression: One"));
        let pushed = bare.find_reference("refs/heads/main").unwrap().target();
        assert_eq!(pushed, Some(head.id()));

        let info = VersionInfo::load(&site.version_path()).unwrap();
        assert_eq!(info.deploy_count, 1);
        assert!(info.last_deployed.is_some());
    }

    #[test]
    fn test_sync_without_changes_succeeds_without_commit() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        let site = site_in(temp.path());
        let before = repo.head().unwrap().target();

        let status = GitSync::new(&site).sync("Update expression: Nothing");
        assert!(status.success);
        assert_eq!(repo.head().unwrap().target(), before);
        assert!(!site.version_path().exists());
    }

    #[test]
    fn test_push_failure_is_reported_not_raised() {
        let temp = TempDir::new().unwrap();
        let repo = init_repo(temp.path());
        let site = site_in(temp.path());
        write_record(&site, "one.mdx");

        let status = GitSync::new(&site).sync("Add expression: One");
        assert!(status.attempted);
        assert!(!status.success);
        assert!(status.error.unwrap().contains("origin"));
        // Committed locally, content untouched
        assert_eq!(
            repo.head().unwrap().peel_to_commit().unwrap().message(),
            Some("Add expression: One")
        );
        assert!(site.content_dir().join("one.mdx").exists());
    }

    #[test]
    fn test_sync_outside_repository_fails_softly() {
        let temp = TempDir::new().unwrap();
        let site = site_in(temp.path());
        let status = GitSync::new(&site).sync("Add expression: One");
        assert!(status.attempted && !status.success);
    }

    #[test]
    fn test_disabled_sync_is_not_attempted() {
        let status = DisabledSync.sync("Add expression: One");
        assert!(!status.attempted);
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("error").is_none());
    }
}
