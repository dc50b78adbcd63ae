//! In-memory view of the content directory
//!
//! The directory is a key-value store keyed by slug (the file stem). Loading
//! reads every record file once and builds a secondary index by id; nothing is
//! maintained incrementally across loads.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{LibraryError, Result};
use crate::frontmatter;
use crate::record::{Entry, Record, Summary};
use crate::schema::{self, Validator};

/// A stored file that was skipped or that disagrees with the registries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    dir: PathBuf,
    extension: String,
    by_slug: BTreeMap<String, Record>,
    slug_by_id: HashMap<String, String>,
    issues: Vec<LoadIssue>,
}

impl Collection {
    /// An empty collection rooted at `dir`
    pub fn empty(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            ..Self::default()
        }
    }

    /// Load every record file in `dir`.
    ///
    /// A missing directory yields an empty collection. Files that cannot be
    /// decoded are skipped; registry mismatches are reported but kept.
    pub fn load(dir: &Path, extension: &str, validator: &Validator<'_>) -> Result<Self> {
        let mut collection = Self::empty(dir, extension);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "content directory missing, nothing to load");
            return Ok(collection);
        }

        for path in record_files(dir, extension)? {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let record = match read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(file = %file, error = %e, "skipping unreadable record");
                    collection.issue(&file, e.to_string());
                    continue;
                }
            };

            if let Some(owner) = collection.slug_by_id.get(&record.id) {
                let message = format!("duplicate id '{}' already used by '{owner}'", record.id);
                tracing::warn!(file = %file, "{message}");
                collection.issue(&file, message);
                continue;
            }
            if let Some(violation) = schema::check_slug(&slug) {
                tracing::warn!(file = %file, "{violation}");
                collection.issue(&file, violation.to_string());
            }
            for violation in validator.check_record(&record) {
                collection.issue(&file, violation.to_string());
            }

            collection.insert(slug, record);
        }

        tracing::debug!(
            dir = %dir.display(),
            records = collection.len(),
            issues = collection.issues.len(),
            "loaded collection"
        );
        Ok(collection)
    }

    /// Path of the file a slug is stored in
    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.{}", self.extension))
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&Record> {
        self.by_slug.get(slug)
    }

    /// The record with this id together with its slug
    pub fn get_by_id(&self, id: &str) -> Option<Entry> {
        let slug = self.slug_by_id.get(id)?;
        self.by_slug
            .get(slug)
            .map(|record| Entry::new(slug.clone(), record.clone()))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.slug_by_id.contains_key(id)
    }

    /// List view, ordered by slug
    pub fn summaries(&self) -> Vec<Summary> {
        self.entries().map(|entry| entry.summary()).collect()
    }

    fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        self.by_slug
            .iter()
            .map(|(slug, record)| Entry::new(slug.clone(), record.clone()))
    }

    /// True if no record other than `exclude_id` holds `slug`
    pub fn is_slug_available(&self, slug: &str, exclude_id: Option<&str>) -> bool {
        match self.get_by_slug(slug) {
            None => true,
            Some(record) => exclude_id == Some(record.id.as_str()),
        }
    }

    /// Index a record under `slug`, replacing whatever held that id before
    pub fn insert(&mut self, slug: impl Into<String>, record: Record) {
        let slug = slug.into();
        if let Some(previous) = self.slug_by_id.insert(record.id.clone(), slug.clone()) {
            if previous != slug {
                self.by_slug.remove(&previous);
            }
        }
        self.by_slug.insert(slug, record);
    }

    /// Drop the record with this id from the indexes
    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let slug = self.slug_by_id.remove(id)?;
        self.by_slug
            .remove(&slug)
            .map(|record| Entry::new(slug, record))
    }

    fn issue(&mut self, file: &str, message: String) {
        self.issues.push(LoadIssue {
            file: file.to_string(),
            message,
        });
    }
}

/// Record files directly inside `dir`, sorted by file name
fn record_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| LibraryError::FileReadFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Read and decode one stored record file
pub fn read_record(path: &Path) -> Result<Record> {
    let content = fs::read_to_string(path).map_err(|e| LibraryError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    frontmatter::parse(&content).map_err(|e| LibraryError::MalformedRecord {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
