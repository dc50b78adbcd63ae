//! Record codec: a `---` delimited YAML header block followed by a free-text body.
//!
//! Serialization is hand-emitted so the stored files keep a stable key order and
//! quoting style. Parsing goes through `serde_yaml` into a loosely typed mapping
//! that the schema layer turns into a [`Record`].
//!
//! Block text (`code` and annotation descriptions) is stored with delimiter
//! escaping applied, see [`escape::escape_delimiter_lines`].

mod escape;

use std::fmt::Write as _;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::record::Record;
use crate::schema::{self, Violation};

use escape::{push_block, quote, quote_list, unescape_delimiter_lines};

/// Line that opens and closes the header block
pub const DELIMITER: &str = "---";

/// Why a stored file could not be decoded
#[derive(Debug, Error, PartialEq)]
pub enum FrontmatterError {
    #[error("missing '---' header block at start of file")]
    MissingHeader,

    #[error("header block is not closed by a '---' line")]
    Unterminated,

    #[error("header is not valid YAML: {0}")]
    InvalidYaml(String),

    #[error("header must be a mapping of keys to values")]
    NotAMapping,

    #[error("header does not describe a record: {}", schema::join_violations(.0))]
    Shape(Vec<Violation>),
}

/// A decoded file before schema checks
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Header keys with block-text escaping already reversed
    pub header: Mapping,
    pub notes: Option<String>,
}

/// Split content into the header text (between the delimiters) and the body.
pub fn split(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(FrontmatterError::MissingHeader)?;
    if first.trim() != DELIMITER {
        return Err(FrontmatterError::MissingHeader);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim() == DELIMITER {
            return Ok((&content[header_start..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Parse content into its header mapping and notes body.
pub fn parse_document(content: &str) -> Result<Document, FrontmatterError> {
    let (header_text, body) = split(content)?;

    let value: Value = if header_text.trim().is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        serde_yaml::from_str(header_text)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };
    let Value::Mapping(mut header) = value else {
        return Err(FrontmatterError::NotAMapping);
    };

    unescape_block_fields(&mut header);

    Ok(Document {
        header,
        notes: notes_from_body(body),
    })
}

/// Parse content into a [`Record`] (shape checks only, no registry lookups).
pub fn parse(content: &str) -> Result<Record, FrontmatterError> {
    let document = parse_document(content)?;
    let mut record =
        schema::record_from_candidate(&document.header).map_err(FrontmatterError::Shape)?;
    record.notes = document.notes;
    Ok(record)
}

/// Serialize a record to its stored text form.
pub fn serialize(record: &Record) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    push_scalar(&mut out, "id", &record.id);
    push_scalar(&mut out, "title", &record.title);
    push_scalar(&mut out, "description", &record.description);
    push_scalar(&mut out, "dateAdded", &record.date_added);
    if let Some(last_updated) = &record.last_updated {
        push_scalar(&mut out, "lastUpdated", last_updated);
    }
    push_scalar(&mut out, "aeVersion", &record.ae_version);
    push_list(&mut out, "expressionTypes", &record.expression_types);
    push_scalar(&mut out, "layerType", &record.layer_type);
    push_scalar(&mut out, "propertyType", &record.property_type);
    let _ = writeln!(out, "complexity: {}", record.complexity);
    push_list(&mut out, "projects", &record.projects);
    if let Some(added_by) = &record.added_by {
        push_scalar(&mut out, "addedBy", added_by);
    }
    if let Some(validated) = record.validated {
        let _ = writeln!(out, "validated: {validated}");
    }
    if let Some(validated_by) = &record.validated_by {
        push_scalar(&mut out, "validatedBy", validated_by);
    }
    push_list(&mut out, "tags", &record.tags);
    push_block(&mut out, 0, "code", &record.code);

    if record.annotations.is_empty() {
        out.push_str("annotations: []\n");
    } else {
        out.push_str("annotations:\n");
        for annotation in &record.annotations {
            let _ = writeln!(out, "  - lines: {}", quote(&annotation.lines));
            let _ = writeln!(out, "    title: {}", quote(&annotation.title));
            push_block(&mut out, 4, "description", &annotation.description);
        }
    }

    out.push_str(DELIMITER);
    out.push('\n');

    if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
        out.push('\n');
        out.push_str(notes);
        out.push('\n');
    }

    out
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key}: {}", quote(value));
}

fn push_list(out: &mut String, key: &str, items: &[String]) {
    let _ = writeln!(out, "{key}: {}", quote_list(items));
}

fn unescape_block_fields(header: &mut Mapping) {
    if let Some(Value::String(code)) = header.get_mut("code") {
        *code = unescape_delimiter_lines(code).into_owned();
    }
    if let Some(Value::Sequence(annotations)) = header.get_mut("annotations") {
        for annotation in annotations.iter_mut() {
            if let Some(Value::String(description)) = annotation
                .as_mapping_mut()
                .and_then(|m| m.get_mut("description"))
            {
                *description = unescape_delimiter_lines(description).into_owned();
            }
        }
    }
}

/// The body is written as a blank separator line, the notes, and a final newline.
fn notes_from_body(body: &str) -> Option<String> {
    let newline = if body.starts_with("\r\n") { "\r\n" } else { "\n" };
    let body = body.strip_prefix(newline).unwrap_or(body);
    let body = body.strip_suffix(newline).unwrap_or(body);
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// Get a string value from a header mapping by key.
pub fn get_str<'a>(header: &'a Mapping, key: &str) -> Option<&'a str> {
    header.get(key).and_then(Value::as_str)
}
