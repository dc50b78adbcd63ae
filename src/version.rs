//! Site version metadata (`version.json`)

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LibraryError, Result};
use crate::path_utils::write_atomic;

const DEV_SUFFIX: &str = "-dev";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Version shown on the published site
    pub public: String,
    /// Working version, usually `<public>-dev`
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<String>,
    #[serde(default)]
    pub deploy_count: u64,
    /// Keys this tool does not manage, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            public: "0.0.0".to_string(),
            local: format!("0.0.0{DEV_SUFFIX}"),
            last_deployed: None,
            deploy_count: 0,
            extra: Map::new(),
        }
    }
}

/// Fields a `version set` may change
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionUpdate {
    pub public: Option<String>,
    pub local: Option<String>,
}

impl VersionInfo {
    /// Read the version file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| LibraryError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| LibraryError::VersionParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the version file as pretty JSON, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }

    pub fn apply(&mut self, update: VersionUpdate) {
        if let Some(public) = update.public {
            self.public = public;
        }
        if let Some(local) = update.local {
            self.local = local;
        }
    }

    /// Move to a new version: `local` takes it verbatim, `public` drops `-dev`
    pub fn release(&mut self, new_version: &str) {
        self.local = new_version.to_string();
        self.public = public_from_local(new_version).to_string();
        self.record_deploy();
    }

    /// Count a deploy and stamp the time
    pub fn record_deploy(&mut self) {
        self.deploy_count += 1;
        self.last_deployed = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}

pub fn public_from_local(version: &str) -> &str {
    version.strip_suffix(DEV_SUFFIX).unwrap_or(version)
}

/// Load, modify and save the version file in one step
pub fn update_file(path: &Path, change: impl FnOnce(&mut VersionInfo)) -> Result<VersionInfo> {
    let mut info = VersionInfo::load(path)?;
    change(&mut info);
    info.save(path)?;
    Ok(info)
}
