//! Working tree status for `deploy status`

use chrono::{DateTime, Utc};
use git2::{BranchType, Repository, Status, StatusOptions};
use serde::Serialize;

use super::head_branch;
use crate::error::Result;

const RECENT_COMMITS: usize = 5;

/// Changed paths grouped the way a deploy review reads them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    pub is_clean: bool,
    /// Anything with changes in the index
    pub staged: Vec<String>,
    pub modified: Vec<String>,
    /// Untracked files
    #[serde(rename = "not_added")]
    pub not_added: Vec<String>,
    /// New files in the index
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    /// Current branch
    pub current: Option<String>,
    /// Upstream of the current branch, e.g. `origin/main`
    pub tracking: Option<String>,
    pub ahead: usize,
    pub behind: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Abbreviated hash
    pub hash: String,
    pub message: String,
    pub date: String,
    pub author: String,
}

impl RepoStatus {
    pub fn read(repo: &Repository) -> Result<Self> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let mut status = Self::default();
        for entry in repo.statuses(Some(&mut options))?.iter() {
            let Some(path) = entry.path().map(str::to_string) else {
                continue;
            };
            let flags = entry.status();

            if flags.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                status.staged.push(path.clone());
            }
            if flags.intersects(Status::INDEX_MODIFIED | Status::WT_MODIFIED) {
                status.modified.push(path.clone());
            }
            if flags.contains(Status::WT_NEW) {
                status.not_added.push(path.clone());
            }
            if flags.contains(Status::INDEX_NEW) {
                status.created.push(path.clone());
            }
            if flags.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
                status.deleted.push(path);
            }
        }

        status.is_clean = status.staged.is_empty()
            && status.modified.is_empty()
            && status.not_added.is_empty()
            && status.deleted.is_empty();
        status.current = head_branch(repo);
        if let Some(branch) = status.current.clone() {
            status.read_tracking(repo, &branch);
        }

        Ok(status)
    }

    fn read_tracking(&mut self, repo: &Repository, branch: &str) {
        let Ok(local) = repo.find_branch(branch, BranchType::Local) else {
            return;
        };
        let Ok(upstream) = local.upstream() else {
            return;
        };
        self.tracking = upstream.name().ok().flatten().map(str::to_string);

        if let (Some(local_oid), Some(upstream_oid)) = (local.get().target(), upstream.get().target())
        {
            if let Ok((ahead, behind)) = repo.graph_ahead_behind(local_oid, upstream_oid) {
                self.ahead = ahead;
                self.behind = behind;
            }
        }
    }
}

/// The most recent commits reachable from HEAD, newest first
pub fn recent_commits(repo: &Repository) -> Result<Vec<CommitInfo>> {
    if repo.head().is_err() {
        return Ok(Vec::new());
    }

    let mut walk = repo.revwalk()?;
    walk.push_head()?;

    let mut commits = Vec::with_capacity(RECENT_COMMITS);
    for oid in walk.take(RECENT_COMMITS) {
        let commit = repo.find_commit(oid?)?;
        let hash = commit.id().to_string();
        let date = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        commits.push(CommitInfo {
            hash: hash[..7].to_string(),
            message: commit.summary().unwrap_or_default().to_string(),
            date,
            author: commit.author().name().unwrap_or_default().to_string(),
        });
    }
    Ok(commits)
}
