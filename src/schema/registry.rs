//! Category and project registries (`categories.json`, `projects.json`)
//!
//! Registries are read-only input. They are loaded once per command and handed
//! to the validator and the library explicitly.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Violation;
use crate::error::{LibraryError, Result};

/// Lowest and highest complexity level a record may carry
pub const COMPLEXITY_RANGE: std::ops::RangeInclusive<i64> = 1..=4;

/// A labelled enum value (expression type, layer type, property type)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityLevel {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Contents of `categories.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categories {
    #[serde(default)]
    pub expression_types: Vec<Category>,
    #[serde(default)]
    pub layer_types: Vec<Category>,
    #[serde(default)]
    pub property_types: Vec<Category>,
    #[serde(default)]
    pub complexity_levels: Vec<ComplexityLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Contents of `projects.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Both registries, as consulted by the validator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registries {
    pub categories: Categories,
    pub projects: ProjectRegistry,
}

impl Registries {
    pub fn new(categories: Categories, projects: ProjectRegistry) -> Self {
        Self {
            categories,
            projects,
        }
    }

    /// Load both registry files from disk
    pub fn load(categories_path: &Path, projects_path: &Path) -> Result<Self> {
        let categories = read_json(categories_path)?;
        let projects = read_json(projects_path)?;
        Ok(Self::new(categories, projects))
    }

    /// Parse both registries from JSON strings
    #[cfg(test)]
    pub fn from_json(categories: &str, projects: &str) -> Result<Self> {
        let categories =
            serde_json::from_str(categories).map_err(|e| LibraryError::RegistryLoadFailed {
                path: "categories".to_string(),
                reason: e.to_string(),
            })?;
        let projects =
            serde_json::from_str(projects).map_err(|e| LibraryError::RegistryLoadFailed {
                path: "projects".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(categories, projects))
    }

    pub fn is_expression_type(&self, id: &str) -> bool {
        self.categories.expression_types.iter().any(|c| c.id == id)
    }

    pub fn is_layer_type(&self, id: &str) -> bool {
        self.categories.layer_types.iter().any(|c| c.id == id)
    }

    pub fn is_property_type(&self, id: &str) -> bool {
        self.categories.property_types.iter().any(|c| c.id == id)
    }

    pub fn is_complexity_level(&self, level: i64) -> bool {
        self.categories.complexity_levels.iter().any(|c| c.id == level)
    }

    pub fn is_project(&self, id: &str) -> bool {
        self.projects.projects.iter().any(|p| p.id == id)
    }

    /// Data integrity problems in the registries themselves
    pub fn integrity_issues(&self) -> Vec<Violation> {
        let mut issues = Vec::new();
        let categories = &self.categories;

        check_ids(
            "expressionTypes",
            categories.expression_types.iter().map(|c| c.id.as_str()),
            &mut issues,
        );
        for (i, c) in categories.expression_types.iter().enumerate() {
            let field = format!("expressionTypes[{i}]");
            require(&field, "label", c.label.as_deref(), &mut issues);
            require(&field, "icon", c.icon.as_deref(), &mut issues);
            require(&field, "description", c.description.as_deref(), &mut issues);
        }

        check_ids(
            "layerTypes",
            categories.layer_types.iter().map(|c| c.id.as_str()),
            &mut issues,
        );
        for (i, c) in categories.layer_types.iter().enumerate() {
            let field = format!("layerTypes[{i}]");
            require(&field, "label", c.label.as_deref(), &mut issues);
            require(&field, "icon", c.icon.as_deref(), &mut issues);
        }

        check_ids(
            "propertyTypes",
            categories.property_types.iter().map(|c| c.id.as_str()),
            &mut issues,
        );
        for (i, c) in categories.property_types.iter().enumerate() {
            require(
                &format!("propertyTypes[{i}]"),
                "label",
                c.label.as_deref(),
                &mut issues,
            );
        }

        self.check_complexity_levels(&mut issues);
        self.check_projects(&mut issues);
        issues
    }

    fn check_complexity_levels(&self, issues: &mut Vec<Violation>) {
        let levels = &self.categories.complexity_levels;
        let unique: HashSet<i64> = levels.iter().map(|l| l.id).collect();
        if unique.len() != levels.len() {
            issues.push(Violation::new("complexityLevels", "ids must be unique"));
        }
        if unique.len() < 4 {
            issues.push(Violation::new(
                "complexityLevels",
                "should include four complexity levels",
            ));
        }
        for (i, level) in levels.iter().enumerate() {
            let field = format!("complexityLevels[{i}]");
            require(&field, "label", level.label.as_deref(), issues);
            require(&field, "icon", level.icon.as_deref(), issues);
            require(&field, "description", level.description.as_deref(), issues);
            if !level.color.as_deref().is_some_and(|c| c.starts_with('#')) {
                issues.push(Violation::new(
                    format!("{field}.color"),
                    "must be a hex value",
                ));
            }
            if !level.blocks.is_some_and(|b| b >= 1) {
                issues.push(Violation::new(
                    format!("{field}.blocks"),
                    "should be at least 1",
                ));
            }
            if !COMPLEXITY_RANGE.contains(&level.id) {
                issues.push(Violation::new(
                    format!("{field}.id"),
                    "must be between 1-4",
                ));
            }
        }
    }

    fn check_projects(&self, issues: &mut Vec<Violation>) {
        let projects = &self.projects.projects;
        check_ids("projects", projects.iter().map(|p| p.id.as_str()), issues);
        for (i, project) in projects.iter().enumerate() {
            let field = format!("projects[{i}]");
            require(&field, "name", project.name.as_deref(), issues);
            require(&field, "client", project.client.as_deref(), issues);
            require(&field, "description", project.description.as_deref(), issues);
            if !project.year.is_some_and(|y| (2000..2100).contains(&y)) {
                issues.push(Violation::new(
                    format!("{field}.year"),
                    "should be reasonable",
                ));
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| LibraryError::RegistryLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| LibraryError::RegistryLoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn check_ids<'a>(group: &str, ids: impl Iterator<Item = &'a str>, issues: &mut Vec<Violation>) {
    let ids: Vec<&str> = ids.collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    if ids.is_empty() {
        issues.push(Violation::new(group, "collection must not be empty"));
    }
    if unique.len() != ids.len() {
        issues.push(Violation::new(group, "ids must be unique"));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        issues.push(Violation::new(group, "ids must not be empty"));
    }
}

fn require(field: &str, key: &str, value: Option<&str>, issues: &mut Vec<Violation>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        issues.push(Violation::new(format!("{field}.{key}"), "must be present"));
    }
}
