//! Site configuration (`exprlib.yaml`)
//!
//! Every key is optional; a site without the file uses the default layout:
//!
//! ```text
//! <root>/
//! ├── exprlib.yaml                  # optional overrides
//! └── src/
//!     ├── content/expressions/      # one <slug>.mdx per record
//!     └── data/
//!         ├── categories.json
//!         ├── projects.json
//!         └── version.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Configuration filename, looked up at the site root
pub const CONFIG_FILE: &str = "exprlib.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    /// Directory holding one file per record, relative to the root
    pub content_dir: PathBuf,

    /// Record file extension, without the dot
    pub extension: String,

    pub categories: PathBuf,
    pub projects: PathBuf,
    pub version_file: PathBuf,

    /// Remote that deploys and auto-sync push to
    pub remote: String,

    /// Branch that `deploy push` publishes
    pub branch: String,

    /// Commit and push after every create, update and delete
    pub auto_sync: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("src/content/expressions"),
            extension: "mdx".to_string(),
            categories: PathBuf::from("src/data/categories.json"),
            projects: PathBuf::from("src/data/projects.json"),
            version_file: PathBuf::from("src/data/version.json"),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            auto_sync: true,
        }
    }
}

impl SiteConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A site root together with its resolved configuration
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    /// Open a site, reading `exprlib.yaml` when present
    pub fn open(root: &Path) -> Result<Self> {
        let root = dunce::canonicalize(root).map_err(|e| LibraryError::FileReadFailed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        let config_path = root.join(CONFIG_FILE);

        let config = if config_path.is_file() {
            let yaml =
                fs::read_to_string(&config_path).map_err(|e| LibraryError::FileReadFailed {
                    path: config_path.display().to_string(),
                    reason: e.to_string(),
                })?;
            SiteConfig::from_yaml(&yaml).map_err(|e| LibraryError::ConfigParseFailed {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            tracing::debug!(path = %config_path.display(), "no site config, using defaults");
            SiteConfig::default()
        };

        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.content_dir)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.root.join(&self.config.categories)
    }

    pub fn projects_path(&self) -> PathBuf {
        self.root.join(&self.config.projects)
    }

    pub fn version_path(&self) -> PathBuf {
        self.root.join(&self.config.version_file)
    }
}
