//! Closed vocabularies and small value types used by dictionary fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// REDCap field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Radio,
    Checkbox,
    Dropdown,
    Calc,
    Yesno,
    Notes,
    Descriptive,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Dropdown,
        FieldType::Calc,
        FieldType::Yesno,
        FieldType::Notes,
        FieldType::Descriptive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
            FieldType::Calc => "calc",
            FieldType::Yesno => "yesno",
            FieldType::Notes => "notes",
            FieldType::Descriptive => "descriptive",
        }
    }

    /// Returns true if the field carries an enumerated choice list.
    pub fn is_choice_based(&self) -> bool {
        matches!(
            self,
            FieldType::Radio | FieldType::Checkbox | FieldType::Dropdown
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown field type '{}'", needle))
    }
}

/// REDCap text validation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationType {
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "number_1dp")]
    Number1Dp,
    #[serde(rename = "number_2dp")]
    Number2Dp,
    #[serde(rename = "date_dmy")]
    DateDmy,
    #[serde(rename = "datetime_dmy")]
    DatetimeDmy,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "alpha_only")]
    AlphaOnly,
}

impl ValidationType {
    pub const ALL: [ValidationType; 8] = [
        ValidationType::Integer,
        ValidationType::Number,
        ValidationType::Number1Dp,
        ValidationType::Number2Dp,
        ValidationType::DateDmy,
        ValidationType::DatetimeDmy,
        ValidationType::Time,
        ValidationType::AlphaOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationType::Integer => "integer",
            ValidationType::Number => "number",
            ValidationType::Number1Dp => "number_1dp",
            ValidationType::Number2Dp => "number_2dp",
            ValidationType::DateDmy => "date_dmy",
            ValidationType::DatetimeDmy => "datetime_dmy",
            ValidationType::Time => "time",
            ValidationType::AlphaOnly => "alpha_only",
        }
    }

    /// Case-insensitive lookup of a trimmed value.
    pub fn lookup(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation bound. The variant is decided by the cell content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationLimit {
    Int(i64),
    Float(f64),
    /// Date-like text kept exactly as written.
    DateText(String),
}

impl fmt::Display for ValidationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLimit::Int(v) => write!(f, "{}", v),
            ValidationLimit::Float(v) => write!(f, "{}", v),
            ValidationLimit::DateText(v) => f.write_str(v),
        }
    }
}

/// Comparison operator of a branching-logic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "<>",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(ComparisonOperator::Eq),
            "<>" => Ok(ComparisonOperator::Ne),
            "<" => Ok(ComparisonOperator::Lt),
            "<=" => Ok(ComparisonOperator::Le),
            ">" => Ok(ComparisonOperator::Gt),
            ">=" => Ok(ComparisonOperator::Ge),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

/// Right-hand side of a branching-logic condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Int(i64),
    Text(String),
}

impl From<i64> for ConditionValue {
    fn from(v: i64) -> Self {
        ConditionValue::Int(v)
    }
}

impl From<&str> for ConditionValue {
    fn from(v: &str) -> Self {
        ConditionValue::Text(v.to_string())
    }
}

/// One atomic condition extracted from a branching-logic expression.
///
/// Connectives (`and`/`or`) between conditions are not represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCondition {
    pub field: String,
    /// Checkbox option code from `[field(code)]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_code: Option<i64>,
    pub operator: ComparisonOperator,
    pub value: ConditionValue,
}

impl BranchCondition {
    pub fn new(
        field: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            field: field.into(),
            checkbox_code: None,
            operator,
            value: value.into(),
        }
    }
}
