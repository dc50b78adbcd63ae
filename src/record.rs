//! Expression record data structures
//!
//! A record is everything stored in one content file: the header block fields
//! plus the free-text notes body. The slug is not part of the record; it is the
//! storage key (file stem) and travels alongside it in [`Entry`].

use serde::{Deserialize, Serialize};

/// Default host application version for new expressions
pub const DEFAULT_AE_VERSION: &str = "17.0+";

/// One line-range annotation explaining part of the snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Line number or inclusive range (`"4"`, `"1-3"`)
    pub lines: String,
    pub title: String,
    pub description: String,
}

/// One catalog entry as stored in a content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable opaque identifier (`expr-<base36 millis>`)
    pub id: String,
    pub title: String,
    pub description: String,
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub ae_version: String,
    pub expression_types: Vec<String>,
    pub layer_type: String,
    pub property_type: String,
    pub complexity: u8,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Snippet source, stored verbatim
    pub code: String,
    pub annotations: Vec<Annotation>,
    /// Body text after the header block
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A record together with the slug it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub slug: String,
    #[serde(flatten)]
    pub record: Record,
}

/// List view of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date_added: String,
}

impl Entry {
    pub fn new(slug: impl Into<String>, record: Record) -> Self {
        Self {
            slug: slug.into(),
            record,
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            id: self.record.id.clone(),
            slug: self.slug.clone(),
            title: self.record.title.clone(),
            description: self.record.description.clone(),
            date_added: self.record.date_added.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A record that satisfies every invariant against the test registries
    pub fn sample_record() -> Record {
        Record {
            id: "expr-m5x1k2ab".to_string(),
            title: "Loop Wiggle".to_string(),
            description: "Wiggle that loops seamlessly".to_string(),
            date_added: "2025-01-18".to_string(),
            last_updated: None,
            ae_version: DEFAULT_AE_VERSION.to_string(),
            expression_types: vec!["loop".to_string()],
            layer_type: "shape".to_string(),
            property_type: "position".to_string(),
            complexity: 2,
            projects: vec!["brand-refresh".to_string()],
            added_by: None,
            validated: Some(false),
            validated_by: Some("Unvalidated".to_string()),
            tags: vec!["wiggle".to_string(), "loop".to_string()],
            code: "freq = 2;\namp = 10;\nwiggle(freq, amp)".to_string(),
            annotations: vec![Annotation {
                lines: "1-2".to_string(),
                title: "Setup".to_string(),
                description: "Frequency and amplitude.".to_string(),
            }],
            notes: None,
        }
    }
}
