//! Create, read, update and delete records in the content directory
//!
//! Every write follows the same order: resolve identifiers, check slug
//! uniqueness, validate the full candidate, persist atomically, update the
//! in-memory indexes, then hand a commit message to the sync collaborator. A
//! rejected request never touches the disk, and a failed sync never undoes a
//! persisted write.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::collection::{Collection, LoadIssue};
use crate::config::Site;
use crate::error::{LibraryError, Result};
use crate::frontmatter;
use crate::git::{ContentSync, SyncStatus};
use crate::path_utils::{remove_if_exists, write_atomic};
use crate::record::{DEFAULT_AE_VERSION, Entry, Record, Summary};
use crate::schema::{self, Registries, Validator};
use crate::slug;

/// Header keys an update may not change
const IMMUTABLE_KEYS: [&str; 2] = ["id", "dateAdded"];

/// Result of a create, update or delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub id: String,
    pub slug: String,
    pub success: bool,
    pub sync: SyncStatus,
}

/// Answer to a slug uniqueness query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugCheck {
    pub exists: bool,
    pub slug: String,
}

/// What a request says about the notes body
#[derive(Debug, Clone, PartialEq, Eq)]
enum NotesChange {
    Keep,
    Clear,
    Set(String),
}

impl NotesChange {
    fn apply(self, current: Option<String>) -> Option<String> {
        match self {
            NotesChange::Keep => current,
            NotesChange::Clear => None,
            NotesChange::Set(notes) if notes.is_empty() => None,
            NotesChange::Set(notes) => Some(notes),
        }
    }
}

/// A create or update request split into header fields and storage concerns
#[derive(Debug)]
struct Request {
    header: Mapping,
    slug: Option<String>,
    notes: NotesChange,
}

impl Request {
    fn parse(mut fields: Mapping) -> Result<Self> {
        let slug = match fields.remove("slug") {
            None | Some(Value::Null) => None,
            Some(Value::String(slug)) => Some(slug),
            Some(_) => return Err(invalid_request("'slug' must be a string")),
        };
        let notes = match fields.remove("notes") {
            None => NotesChange::Keep,
            Some(Value::Null) => NotesChange::Clear,
            Some(Value::String(notes)) => NotesChange::Set(notes),
            Some(_) => return Err(invalid_request("'notes' must be a string or null")),
        };

        // Older clients send a single `expressionType`
        if let Some(single) = fields.remove("expressionType") {
            let has_list = fields.get("expressionTypes").is_some_and(|v| !v.is_null());
            if !has_list && !single.is_null() {
                fields.insert("expressionTypes".into(), Value::Sequence(vec![single]));
            }
        }

        // Form posts send booleans as text
        if let Some(Value::String(text)) = fields.get("validated") {
            if let Ok(flag) = text.parse::<bool>() {
                fields.insert("validated".into(), Value::Bool(flag));
            }
        }

        Ok(Self {
            header: fields,
            slug,
            notes,
        })
    }
}

fn invalid_request(reason: &str) -> LibraryError {
    LibraryError::InvalidRequest {
        reason: reason.to_string(),
    }
}

/// Insert `value` when `key` is absent or null
fn insert_default(header: &mut Mapping, key: &str, value: Value) {
    if header.get(key).is_none_or(Value::is_null) {
        header.insert(key.into(), value);
    }
}

fn header_of(record: &Record) -> Result<Mapping> {
    match serde_yaml::to_value(record)? {
        Value::Mapping(mut header) => {
            header.remove("notes");
            Ok(header)
        }
        _ => Err(LibraryError::MalformedRecord {
            path: record.id.clone(),
            reason: "record did not serialize to a mapping".to_string(),
        }),
    }
}

/// The record collection of one site plus the collaborators that act on it
pub struct Library {
    registries: Registries,
    collection: Collection,
    sync: Box<dyn ContentSync>,
}

impl Library {
    /// Load registries and the collection for `site`
    pub fn open(site: &Site, sync: Box<dyn ContentSync>) -> Result<Self> {
        let registries = Registries::load(&site.categories_path(), &site.projects_path())?;
        Self::with_registries(site, registries, sync)
    }

    pub fn with_registries(
        site: &Site,
        registries: Registries,
        sync: Box<dyn ContentSync>,
    ) -> Result<Self> {
        let collection = Collection::load(
            &site.content_dir(),
            &site.config.extension,
            &Validator::new(&registries),
        )?;
        Ok(Self {
            registries,
            collection,
            sync,
        })
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Files skipped or flagged while loading
    pub fn load_issues(&self) -> &[LoadIssue] {
        self.collection.issues()
    }

    pub fn list(&self) -> Vec<Summary> {
        self.collection.summaries()
    }

    pub fn read(&self, id: &str) -> Result<Entry> {
        self.collection
            .get_by_id(id)
            .ok_or_else(|| LibraryError::NotFound { id: id.to_string() })
    }

    /// Whether a record other than `exclude_id` already holds `slug`
    pub fn check_slug(&self, slug: &str, exclude_id: Option<&str>) -> SlugCheck {
        SlugCheck {
            exists: !slug.is_empty() && !self.collection.is_slug_available(slug, exclude_id),
            slug: slug.to_string(),
        }
    }

    pub fn create(&mut self, request: Mapping) -> Result<WriteOutcome> {
        let Request {
            mut header,
            slug,
            notes,
        } = Request::parse(request)?;

        let title = frontmatter::get_str(&header, "title").unwrap_or_default();
        let slug = slug::resolve_slug(slug.as_deref(), title);
        self.ensure_slug_free(&slug, None)?;

        let id = slug::next_id(|candidate| self.collection.contains_id(candidate));
        header.insert("id".into(), id.clone().into());
        header.insert("dateAdded".into(), slug::today().into());
        header.remove("lastUpdated");
        insert_default(&mut header, "aeVersion", DEFAULT_AE_VERSION.into());
        insert_default(&mut header, "validated", false.into());
        let validated = header.get("validated").and_then(Value::as_bool) == Some(true);
        let validated_by = if validated { "Validated" } else { "Unvalidated" };
        insert_default(&mut header, "validatedBy", validated_by.into());
        insert_default(&mut header, "projects", Value::Sequence(Vec::new()));
        insert_default(&mut header, "tags", Value::Sequence(Vec::new()));

        let mut record = self.validate(&header, &slug)?;
        record.notes = notes.apply(None);

        self.persist(&slug, &record)?;
        tracing::info!(%id, %slug, "created expression");

        let message = format!("Add expression: {}", record.title);
        self.collection.insert(slug.clone(), record);
        Ok(self.finish(id, slug, &message))
    }

    pub fn update(&mut self, id: &str, changes: Mapping) -> Result<WriteOutcome> {
        let current = self.read(id)?;
        let Request {
            header: changes,
            slug,
            notes,
        } = Request::parse(changes)?;

        let new_slug = slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| current.slug.clone());
        if new_slug != current.slug {
            self.ensure_slug_free(&new_slug, Some(id))?;
        }

        let mut header = header_of(&current.record)?;
        for (key, value) in changes {
            if key.as_str().is_some_and(|k| IMMUTABLE_KEYS.contains(&k)) {
                continue;
            }
            header.insert(key, value);
        }
        header.insert("lastUpdated".into(), slug::today().into());

        let mut record = self.validate(&header, &new_slug)?;
        record.notes = notes.apply(current.record.notes.clone());

        self.persist(&new_slug, &record)?;
        if new_slug != current.slug {
            let old_path = self.collection.path_for(&current.slug);
            if let Err(e) = remove_if_exists(&old_path) {
                tracing::warn!(path = %old_path.display(), error = %e, "could not remove renamed file");
            }
        }
        tracing::info!(%id, slug = %new_slug, "updated expression");

        let message = format!("Update expression: {}", record.title);
        self.collection.insert(new_slug.clone(), record);
        Ok(self.finish(id.to_string(), new_slug, &message))
    }

    pub fn delete(&mut self, id: &str) -> Result<WriteOutcome> {
        let entry = self.read(id)?;
        let path = self.collection.path_for(&entry.slug);
        if !remove_if_exists(&path)? {
            tracing::warn!(path = %path.display(), "record file was already gone");
        }
        self.collection.remove(id);
        tracing::info!(%id, slug = %entry.slug, "deleted expression");

        let message = format!("Delete expression: {}", entry.record.title);
        Ok(self.finish(id.to_string(), entry.slug, &message))
    }

    /// Reject a slug held by another record, or shadowed by a file that did not load
    fn ensure_slug_free(&self, slug: &str, exclude_id: Option<&str>) -> Result<()> {
        if slug.is_empty() || schema::check_slug(slug).is_some() {
            // Reported with the other violations
            return Ok(());
        }
        if !self.collection.is_slug_available(slug, exclude_id)
            || self.collection.path_for(slug).exists()
        {
            return Err(LibraryError::DuplicateSlug {
                slug: slug.to_string(),
            });
        }
        Ok(())
    }

    fn validate(&self, header: &Mapping, slug: &str) -> Result<Record> {
        let mut violations: Vec<_> = schema::check_slug(slug).into_iter().collect();
        match Validator::new(&self.registries).validate(header) {
            Ok(record) if violations.is_empty() => Ok(record),
            Ok(_) => Err(LibraryError::Validation { violations }),
            Err(more) => {
                violations.extend(more);
                Err(LibraryError::Validation { violations })
            }
        }
    }

    fn persist(&self, slug: &str, record: &Record) -> Result<()> {
        let path = self.collection.path_for(slug);
        write_atomic(&path, frontmatter::serialize(record).as_bytes())
    }

    fn finish(&self, id: String, slug: String, message: &str) -> WriteOutcome {
        WriteOutcome {
            id,
            slug,
            success: true,
            sync: self.sync.sync(message),
        }
    }
}
