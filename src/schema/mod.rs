//! Record schema validation
//!
//! Candidates are loosely typed header mappings, either decoded from a stored
//! file or built from a create/update request. Validation walks every field and
//! reports all violations at once; only a clean candidate is converted into a
//! typed [`Record`].

pub mod registry;

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::record::Record;
pub use registry::Registries;
use registry::COMPLEXITY_RANGE;

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^expr-[0-9a-z]+$").expect("valid id regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:-\d+)?$").expect("valid lines regex"));
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid slug regex"));

/// One schema violation, addressed by a dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates candidates against the schema and the registries it was built with
pub struct Validator<'a> {
    registries: &'a Registries,
}

impl<'a> Validator<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    /// Every violation in the candidate, including registry lookups
    pub fn check(&self, candidate: &Mapping) -> Vec<Violation> {
        Checker::new(candidate, Some(self.registries)).run()
    }

    /// Validate and convert a candidate into a record
    pub fn validate(&self, candidate: &Mapping) -> Result<Record, Vec<Violation>> {
        let violations = self.check(candidate);
        if !violations.is_empty() {
            return Err(violations);
        }
        convert(candidate)
    }

    /// Registry violations of an already typed record
    pub fn check_record(&self, record: &Record) -> Vec<Violation> {
        match serde_yaml::to_value(record) {
            Ok(Value::Mapping(candidate)) => self.check(&candidate),
            _ => vec![Violation::new("record", "could not be inspected")],
        }
    }
}

/// Shape-only conversion: presence, types, patterns and ranges, no registries
pub fn record_from_candidate(candidate: &Mapping) -> Result<Record, Vec<Violation>> {
    let violations = Checker::new(candidate, None).run();
    if !violations.is_empty() {
        return Err(violations);
    }
    convert(candidate)
}

/// A slug must be usable as a file stem inside the content directory
pub fn check_slug(slug: &str) -> Option<Violation> {
    if slug.is_empty() {
        Some(Violation::new(
            "slug",
            "is empty; give the expression a title with letters or digits, or an explicit slug",
        ))
    } else if !SLUG_RE.is_match(slug) {
        Some(Violation::new(
            "slug",
            format!("'{slug}' must start with a letter or digit and use only letters, digits, '.', '_' or '-'"),
        ))
    } else {
        None
    }
}

fn convert(candidate: &Mapping) -> Result<Record, Vec<Violation>> {
    let cleaned: Mapping = candidate
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_yaml::from_value(Value::Mapping(cleaned))
        .map_err(|e| vec![Violation::new("record", e.to_string())])
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

struct Checker<'a> {
    candidate: &'a Mapping,
    registries: Option<&'a Registries>,
    violations: Vec<Violation>,
}

impl<'a> Checker<'a> {
    fn new(candidate: &'a Mapping, registries: Option<&'a Registries>) -> Self {
        Self {
            candidate,
            registries,
            violations: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Violation> {
        if let Some(id) = self.required_text("id") {
            if !ID_RE.is_match(id) {
                self.push("id", format!("'{id}' must match expr-<base36>"));
            }
        }
        self.required_text("title");
        self.required_text("description");
        self.date("dateAdded", true);
        self.date("lastUpdated", false);
        self.required_text("aeVersion");

        if let Some(types) = self.text_list("expressionTypes", true) {
            for (i, id) in types.iter().enumerate() {
                let known = self.registries.is_none_or(|r| r.is_expression_type(id));
                self.reference(format!("expressionTypes[{i}]"), id, known, "expression type");
            }
        }
        if let Some(layer) = self.required_text("layerType") {
            let known = self.registries.is_none_or(|r| r.is_layer_type(layer));
            self.reference("layerType".to_string(), layer, known, "layer type");
        }
        if let Some(property) = self.required_text("propertyType") {
            let known = self.registries.is_none_or(|r| r.is_property_type(property));
            self.reference("propertyType".to_string(), property, known, "property type");
        }
        self.complexity();
        if let Some(projects) = self.text_list("projects", false) {
            for (i, id) in projects.iter().enumerate() {
                let known = self.registries.is_none_or(|r| r.is_project(id));
                self.reference(format!("projects[{i}]"), id, known, "project");
            }
        }

        self.optional_text("addedBy");
        self.optional_bool("validated");
        self.optional_text("validatedBy");
        self.text_list("tags", false);
        self.required_text("code");
        self.annotations();

        self.violations
    }

    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        let candidate: &'a Mapping = self.candidate;
        candidate.get(key).filter(|v| !v.is_null())
    }

    fn text_at(&mut self, field: &str, value: Option<&'a Value>) -> Option<&'a str> {
        match value {
            None => {
                self.push(field, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.push(field, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                self.push(field, format!("must be a string, got {}", describe(other)));
                None
            }
        }
    }

    fn required_text(&mut self, key: &str) -> Option<&'a str> {
        let value = self.value(key);
        self.text_at(key, value)
    }

    fn optional_text(&mut self, key: &str) {
        if let Some(other) = self.value(key).filter(|v| !v.is_string()) {
            self.push(key, format!("must be a string, got {}", describe(other)));
        }
    }

    fn optional_bool(&mut self, key: &str) {
        if let Some(other) = self.value(key).filter(|v| !v.is_bool()) {
            self.push(key, format!("must be a boolean, got {}", describe(other)));
        }
    }

    fn date(&mut self, key: &str, required: bool) {
        let Some(value) = self.value(key) else {
            if required {
                self.push(key, "is required");
            }
            return;
        };
        let Some(text) = value.as_str() else {
            self.push(key, format!("must be a string, got {}", describe(value)));
            return;
        };
        if !DATE_RE.is_match(text) {
            self.push(key, format!("'{text}' must match YYYY-MM-DD"));
        } else if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() {
            self.push(key, format!("'{text}' is not a calendar date"));
        }
    }

    fn text_list(&mut self, key: &str, required: bool) -> Option<Vec<&'a str>> {
        let Some(value) = self.value(key) else {
            if required {
                self.push(key, "is required");
            }
            return None;
        };
        let Some(items) = value.as_sequence() else {
            self.push(key, format!("must be a list, got {}", describe(value)));
            return None;
        };
        if required && items.is_empty() {
            self.push(key, "must not be empty");
            return None;
        }

        let mut texts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) => texts.push(s),
                None => self.push(
                    format!("{key}[{i}]"),
                    format!("must be a string, got {}", describe(item)),
                ),
            }
        }
        Some(texts)
    }

    fn reference(&mut self, field: String, id: &str, known: bool, what: &str) {
        if !known {
            self.push(field, format!("unknown {what} '{id}'"));
        }
    }

    fn complexity(&mut self) {
        let Some(value) = self.value("complexity") else {
            self.push("complexity", "is required");
            return;
        };
        let Some(level) = value.as_i64() else {
            self.push(
                "complexity",
                format!("must be an integer, got {}", describe(value)),
            );
            return;
        };
        if !COMPLEXITY_RANGE.contains(&level) {
            self.push("complexity", format!("{level} must be between 1 and 4"));
        } else if self.registries.is_some_and(|r| !r.is_complexity_level(level)) {
            self.push(
                "complexity",
                format!("{level} is not a defined complexity level"),
            );
        }
    }

    fn annotations(&mut self) {
        let Some(value) = self.value("annotations") else {
            self.push("annotations", "is required");
            return;
        };
        let Some(items) = value.as_sequence() else {
            self.push(
                "annotations",
                format!("must be a list, got {}", describe(value)),
            );
            return;
        };
        if items.is_empty() {
            self.push("annotations", "must not be empty");
            return;
        }

        for (i, item) in items.iter().enumerate() {
            let Some(entry) = item.as_mapping() else {
                self.push(
                    format!("annotations[{i}]"),
                    format!("must be a mapping, got {}", describe(item)),
                );
                continue;
            };
            let get = |key: &str| entry.get(key).filter(|v| !v.is_null());
            if let Some(lines) = self.text_at(&format!("annotations[{i}].lines"), get("lines")) {
                if !LINES_RE.is_match(lines) {
                    self.push(
                        format!("annotations[{i}].lines"),
                        format!("'{lines}' must be a line number or range like 1-3"),
                    );
                }
            }
            self.text_at(&format!("annotations[{i}].title"), get("title"));
            self.text_at(&format!("annotations[{i}].description"), get("description"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::registry::fixtures::sample_registries;
    use super::*;
    use crate::record::fixtures::sample_record;

    fn candidate_of(record: &Record) -> Mapping {
        match serde_yaml::to_value(record).unwrap() {
            Value::Mapping(m) => m,
            _ => unreachable!(),
        }
    }

    fn fields(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_candidate_converts() {
        let registries = sample_registries();
        let record = sample_record();
        let validated = Validator::new(&registries)
            .validate(&candidate_of(&record))
            .unwrap();
        assert_eq!(validated, record);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let registries = sample_registries();
        let mut candidate = candidate_of(&sample_record());
        candidate.remove("title");
        candidate.remove("code");

        let violations = Validator::new(&registries).validate(&candidate).unwrap_err();
        let fields = fields(&violations);
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"code"));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_unknown_registry_values() {
        let registries = sample_registries();
        let mut candidate = candidate_of(&sample_record());
        candidate.insert("layerType".into(), "nonexistent".into());
        candidate.insert(
            "expressionTypes".into(),
            serde_yaml::to_value(vec!["loop", "bogus"]).unwrap(),
        );
        candidate.insert(
            "projects".into(),
            serde_yaml::to_value(vec!["ghost"]).unwrap(),
        );

        let violations = Validator::new(&registries).check(&candidate);
        assert_eq!(
            fields(&violations),
            vec!["expressionTypes[1]", "layerType", "projects[0]"]
        );
        assert!(violations[1].message.contains("nonexistent"));
    }

    #[test]
    fn test_shape_check_ignores_registries() {
        let mut record = sample_record();
        record.layer_type = "nonexistent".to_string();
        assert!(record_from_candidate(&candidate_of(&record)).is_ok());
    }

    #[test]
    fn test_types_and_patterns() {
        let registries = sample_registries();
        let mut candidate = candidate_of(&sample_record());
        candidate.insert("id".into(), "foo".into());
        candidate.insert("complexity".into(), "2".into());
        candidate.insert("dateAdded".into(), "18/01/2025".into());
        candidate.insert("lastUpdated".into(), "2025-02-30".into());
        candidate.insert("tags".into(), "single".into());
        candidate.insert("validated".into(), "yes".into());

        let violations = Validator::new(&registries).check(&candidate);
        assert_eq!(
            fields(&violations),
            vec!["id", "dateAdded", "lastUpdated", "complexity", "validated", "tags"]
        );
    }

    #[test]
    fn test_complexity_range_and_levels() {
        let mut registries = sample_registries();
        registries.categories.complexity_levels.retain(|l| l.id != 3);
        let validator = Validator::new(&registries);

        let mut candidate = candidate_of(&sample_record());
        candidate.insert("complexity".into(), 7.into());
        assert!(validator.check(&candidate)[0].message.contains("between 1 and 4"));

        candidate.insert("complexity".into(), 3.into());
        assert!(validator.check(&candidate)[0]
            .message
            .contains("not a defined complexity level"));

        candidate.insert("complexity".into(), 2.5.into());
        assert!(validator.check(&candidate)[0].message.contains("integer"));
    }

    #[test]
    fn test_annotation_checks() {
        let registries = sample_registries();
        let mut candidate = candidate_of(&sample_record());
        let annotations: Value = serde_yaml::from_str(
            r#"
- lines: "1-3"
  title: "Fine"
  description: "ok"
- lines: "one"
  title: ""
- "not a mapping"
"#,
        )
        .unwrap();
        candidate.insert("annotations".into(), annotations);

        let violations = Validator::new(&registries).check(&candidate);
        assert_eq!(
            fields(&violations),
            vec![
                "annotations[1].lines",
                "annotations[1].title",
                "annotations[1].description",
                "annotations[2]",
            ]
        );

        candidate.insert("annotations".into(), Value::Sequence(vec![]));
        let violations = Validator::new(&registries).check(&candidate);
        assert_eq!(fields(&violations), vec!["annotations"]);
    }

    #[test]
    fn test_null_optional_fields_are_absent() {
        let mut candidate = candidate_of(&sample_record());
        candidate.insert("tags".into(), Value::Null);
        candidate.insert("lastUpdated".into(), Value::Null);
        let record = record_from_candidate(&candidate).unwrap();
        assert!(record.tags.is_empty());
        assert_eq!(record.last_updated, None);
    }

    #[test]
    fn test_check_record_reports_registry_drift() {
        let mut registries = sample_registries();
        registries.projects.projects.clear();
        let violations = Validator::new(&registries).check_record(&sample_record());
        assert_eq!(fields(&violations), vec!["projects[0]"]);
    }

    #[test]
    fn test_check_slug() {
        assert!(check_slug("loop-wiggle").is_none());
        assert!(check_slug("Loop_Wiggle.v2").is_none());
        assert!(check_slug("").is_some());
        assert!(check_slug("../escape").is_some());
        assert!(check_slug("nested/slug").is_some());
        assert!(check_slug(".hidden").is_some());
    }
}
