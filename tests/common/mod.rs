//! Common test utilities for exprlib integration tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

pub const CATEGORIES_JSON: &str = r##"{
  "expressionTypes": [
    { "id": "loop", "label": "Loop", "icon": "↻", "description": "Repeating motion" },
    { "id": "math", "label": "Math", "icon": "∑", "description": "Numeric helpers" }
  ],
  "layerTypes": [
    { "id": "shape", "label": "Shape", "icon": "◆" },
    { "id": "text", "label": "Text", "icon": "T" }
  ],
  "propertyTypes": [
    { "id": "position", "label": "Position" },
    { "id": "opacity", "label": "Opacity" }
  ],
  "complexityLevels": [
    { "id": 1, "label": "Basic", "icon": "▁", "color": "#4caf50", "blocks": 1, "description": "One-liners" },
    { "id": 2, "label": "Medium", "icon": "▃", "color": "#8bc34a", "blocks": 2, "description": "A few lines" },
    { "id": 3, "label": "Advanced", "icon": "▅", "color": "#ff9800", "blocks": 3, "description": "Several parts" },
    { "id": 4, "label": "Expert", "icon": "▇", "color": "#f44336", "blocks": 4, "description": "Rigs" }
  ]
}"##;

pub const PROJECTS_JSON: &str = r#"{
  "projects": [
    { "id": "brand-refresh", "name": "Brand Refresh", "client": "Acme", "year": 2024, "description": "Logo animations" }
  ]
}"#;

pub const CONTENT_DIR: &str = "src/content/expressions";

/// A site checkout with registries in place
pub struct TestSite {
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestSite {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path())
            .expect("Failed to canonicalize temp dir")
            .join("site");
        let site = Self { temp, path };
        site.write_file("src/data/categories.json", CATEGORIES_JSON);
        site.write_file("src/data/projects.json", PROJECTS_JSON);
        fs::create_dir_all(site.path.join(CONTENT_DIR)).expect("Failed to create content dir");
        site
    }

    /// Same as `new`, plus a git repository with a bare `origin` it can push to
    #[allow(dead_code)]
    pub fn with_git() -> Self {
        let site = Self::new();
        site.write_file(&format!("{CONTENT_DIR}/.gitkeep"), "");
        site.write_file(
            "src/data/version.json",
            "{\n  \"public\": \"1.0.0\",\n  \"local\": \"1.0.0-dev\",\n  \"deployCount\": 0\n}\n",
        );

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(&site.path, &opts).expect("Failed to init repo");
        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        let mut index = repo.index().unwrap();
        index
            .add_all(["."], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        let remote = site.remote_path();
        Repository::init_bare(&remote).expect("Failed to init bare remote");
        repo.remote("origin", &remote.to_string_lossy()).unwrap();
        site
    }

    #[allow(dead_code)]
    pub fn remote_path(&self) -> PathBuf {
        self.temp.path().join("remote.git")
    }

    #[allow(dead_code)]
    pub fn repo(&self) -> Repository {
        Repository::open(&self.path).expect("Failed to open repo")
    }

    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    #[allow(dead_code)]
    pub fn record_path(&self, slug: &str) -> PathBuf {
        self.path.join(CONTENT_DIR).join(format!("{slug}.mdx"))
    }

    /// exprlib pointed at this site, with sync off
    pub fn cmd(&self) -> Command {
        let mut cmd = exprlib_cmd();
        cmd.arg("--root").arg(&self.path).arg("--no-sync");
        cmd
    }

    /// exprlib pointed at this site, sync left to the site config
    #[allow(dead_code)]
    pub fn cmd_with_sync(&self) -> Command {
        let mut cmd = exprlib_cmd();
        cmd.arg("--root").arg(&self.path);
        cmd
    }

    /// Run `create --json` with `request` and return the new id
    #[allow(dead_code)]
    pub fn create(&self, request: &serde_json::Value) -> String {
        let output = self
            .cmd()
            .args(["create", "--json"])
            .write_stdin(request.to_string())
            .output()
            .expect("Failed to run create");
        assert!(
            output.status.success(),
            "create failed: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        json["id"].as_str().unwrap().to_string()
    }
}

#[allow(deprecated)]
pub fn exprlib_cmd() -> Command {
    let mut cmd = Command::cargo_bin("exprlib").unwrap();
    cmd.env_remove("EXPRLIB_ROOT")
        .env_remove("EXPRLIB_NO_SYNC")
        .env_remove("RUST_LOG");
    cmd
}

/// A complete, valid create request
#[allow(dead_code)]
pub fn loop_wiggle_request() -> serde_json::Value {
    serde_json::json!({
        "title": "Loop Wiggle",
        "description": "Wiggle that loops seamlessly",
        "expressionTypes": ["loop"],
        "layerType": "shape",
        "propertyType": "position",
        "complexity": 2,
        "projects": ["brand-refresh"],
        "tags": ["wiggle"],
        "code": "freq = 2;\namp = 10;\nwiggle(freq, amp)",
        "annotations": [
            { "lines": "1-2", "title": "Setup", "description": "Frequency and amplitude." }
        ],
        "notes": "Works best on position."
    })
}

#[allow(dead_code)]
pub fn head_message(repo: &Repository) -> String {
    repo.head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .message()
        .unwrap_or_default()
        .to_string()
}

#[allow(dead_code)]
pub fn remote_head(remote: &Path) -> Option<git2::Oid> {
    Repository::open_bare(remote)
        .ok()?
        .find_reference("refs/heads/main")
        .ok()?
        .target()
}
