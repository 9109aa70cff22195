//! Heuristic header matching for dictionary exports.
//!
//! Export versions name their columns differently ("Variable / Field Name",
//! "field_name", ...), so each semantic role is located by a case-insensitive
//! pattern instead of an exact header. Resolution runs once per import and
//! the resulting column indices are reused for every row.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RedmapError, Result};

/// Semantic role of a dictionary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    FieldName,
    FormName,
    FieldType,
    FieldLabel,
    Choices,
    ValidationType,
    ValidationMinimum,
    ValidationMaximum,
    Identifier,
    BranchingLogic,
    RequiredField,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 11] = [
        ColumnRole::FieldName,
        ColumnRole::FormName,
        ColumnRole::FieldType,
        ColumnRole::FieldLabel,
        ColumnRole::Choices,
        ColumnRole::ValidationType,
        ColumnRole::ValidationMinimum,
        ColumnRole::ValidationMaximum,
        ColumnRole::Identifier,
        ColumnRole::BranchingLogic,
        ColumnRole::RequiredField,
    ];

    /// Roles without which no canonical field can be built.
    pub const REQUIRED: [ColumnRole; 3] = [
        ColumnRole::FieldName,
        ColumnRole::FormName,
        ColumnRole::FieldType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::FieldName => "field_name",
            ColumnRole::FormName => "form_name",
            ColumnRole::FieldType => "field_type",
            ColumnRole::FieldLabel => "field_label",
            ColumnRole::Choices => "choices",
            ColumnRole::ValidationType => "validation_type",
            ColumnRole::ValidationMinimum => "validation_minimum",
            ColumnRole::ValidationMaximum => "validation_maximum",
            ColumnRole::Identifier => "identifier",
            ColumnRole::BranchingLogic => "branching_logic",
            ColumnRole::RequiredField => "required_field",
        }
    }

    /// Default header pattern for this role.
    pub fn default_pattern(&self) -> &'static str {
        match self {
            ColumnRole::FieldName => r"(?i)field.*name|variable.*name",
            ColumnRole::FormName => r"(?i)form.*name",
            ColumnRole::FieldType => r"(?i)field.*type",
            ColumnRole::FieldLabel => r"(?i)field.*label",
            ColumnRole::Choices => r"(?i)choices.*calculations|choices.*slider",
            ColumnRole::ValidationType => r"(?i)validation.*type",
            ColumnRole::ValidationMinimum => r"(?i)validation.*min",
            ColumnRole::ValidationMaximum => r"(?i)validation.*max",
            ColumnRole::Identifier => r"(?i)identifier",
            ColumnRole::BranchingLogic => r"(?i)branching.*logic",
            ColumnRole::RequiredField => r"(?i)required.*field",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of the first header matching `pattern`, in header order.
pub fn find_column<S: AsRef<str>>(headers: &[S], pattern: &Regex) -> Option<usize> {
    headers.iter().position(|h| pattern.is_match(h.as_ref()))
}

/// The (role, pattern) table used to locate dictionary columns.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    patterns: Vec<(ColumnRole, Regex)>,
}

impl ColumnResolver {
    /// Resolver with the default pattern for every role.
    pub fn new() -> Self {
        let patterns = ColumnRole::ALL
            .iter()
            .map(|role| {
                let regex = Regex::new(role.default_pattern())
                    .unwrap_or_else(|e| panic!("invalid built-in pattern for {}: {}", role, e));
                (*role, regex)
            })
            .collect();
        Self { patterns }
    }

    /// Replace the pattern used for one role.
    ///
    /// Patterns are matched case-insensitively unless they set their own flags.
    pub fn with_pattern(mut self, role: ColumnRole, pattern: &str) -> Result<Self> {
        let source = if pattern.starts_with("(?") {
            pattern.to_string()
        } else {
            format!("(?i){}", pattern)
        };
        let regex = Regex::new(&source).map_err(RedmapError::Regex)?;

        match self.patterns.iter_mut().find(|(r, _)| *r == role) {
            Some(entry) => entry.1 = regex,
            None => self.patterns.push((role, regex)),
        }
        Ok(self)
    }

    /// Pattern currently used for `role`.
    pub fn pattern(&self, role: ColumnRole) -> Option<&Regex> {
        self.patterns
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, re)| re)
    }

    /// Locate every role in `headers`. First match wins; ambiguity is not an error.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> ResolvedColumns {
        let mut columns = IndexMap::new();
        for (role, pattern) in &self.patterns {
            if let Some(index) = find_column(headers, pattern) {
                columns.insert(
                    *role,
                    ResolvedColumn {
                        index,
                        header: headers[index].as_ref().to_string(),
                    },
                );
            }
        }
        ResolvedColumns { columns }
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A header matched to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub header: String,
}

/// Outcome of resolving all roles against one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: IndexMap<ColumnRole, ResolvedColumn>,
}

impl ResolvedColumns {
    pub fn get(&self, role: ColumnRole) -> Option<&ResolvedColumn> {
        self.columns.get(&role)
    }

    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        self.columns.get(&role).map(|c| c.index)
    }

    pub fn header(&self, role: ColumnRole) -> Option<&str> {
        self.columns.get(&role).map(|c| c.header.as_str())
    }

    /// Fail on the first required role that has no column.
    pub fn require(&self, roles: &[ColumnRole]) -> Result<()> {
        match roles.iter().find(|r| !self.columns.contains_key(*r)) {
            Some(role) => Err(RedmapError::MissingColumn { role: *role }),
            None => Ok(()),
        }
    }

    pub fn missing(&self) -> Vec<ColumnRole> {
        ColumnRole::ALL
            .into_iter()
            .filter(|r| !self.columns.contains_key(r))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &ResolvedColumn)> {
        self.columns.iter().map(|(r, c)| (*r, c))
    }
}
