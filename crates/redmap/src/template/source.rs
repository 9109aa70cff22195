//! How a value and its timestamp are located in the source dataset.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}$").unwrap());

/// Extraction descriptor for one value.
///
/// Used for a field's main mapping and for each calculation variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapping {
    /// Row filter applied to the source data before reading a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    /// Column read from the filtered rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_value: Option<String>,
    /// Column holding each observation's timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Fixed value, or `{name}` to reuse another resolved value. Wins over the query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<String>,
}

/// A constant as the execution engine should interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue<'a> {
    Literal(&'a str),
    /// Name of the field or variable whose resolved value is reused.
    Reference(&'a str),
}

/// The effective extraction rule of a [`SourceMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSpec<'a> {
    Constant(ConstantValue<'a>),
    Query {
        query_string: Option<&'a str>,
        query_value: Option<&'a str>,
        timestamp: Option<&'a str>,
    },
    Unmapped,
}

impl SourceMapping {
    /// Mapping that reads `column`, optionally filtered by `query`.
    pub fn query(query: Option<&str>, column: impl Into<String>) -> Self {
        Self {
            query_string: query.map(str::to_string),
            query_value: Some(column.into()),
            ..Self::default()
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        Self {
            constant: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, column: impl Into<String>) -> Self {
        self.timestamp = Some(column.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.query_string.is_none()
            && self.query_value.is_none()
            && self.timestamp.is_none()
            && self.constant.is_none()
    }

    /// Apply constant precedence and classify the constant.
    pub fn resolve(&self) -> SourceSpec<'_> {
        if let Some(constant) = self.constant.as_deref() {
            let value = match REFERENCE.captures(constant.trim()) {
                Some(caps) => match caps.get(1) {
                    Some(name) => ConstantValue::Reference(name.as_str()),
                    None => ConstantValue::Literal(constant),
                },
                None => ConstantValue::Literal(constant),
            };
            return SourceSpec::Constant(value);
        }

        if self.query_string.is_some() || self.query_value.is_some() {
            return SourceSpec::Query {
                query_string: self.query_string.as_deref(),
                query_value: self.query_value.as_deref(),
                timestamp: self.timestamp.as_deref(),
            };
        }

        SourceSpec::Unmapped
    }
}
