//! Single-cell parsers for dictionary columns.
//!
//! Every parser is a pure function of one cell. Blank input always yields
//! `None`. Parsers that can fail on a recognizable but malformed value return
//! a [`CellError`]; the importer turns those into warnings and stores the
//! attribute as absent.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{
    BranchCondition, ComparisonOperator, ConditionValue, ValidationLimit, ValidationType,
};
use crate::error::CellError;

static DATE_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+-\d+-\d+").unwrap());

static NUMERIC_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+[,.]?\d*").unwrap());

/// `[field]`, `[field(code)]` or `[field](code)`, an operator, then a quoted or bare value.
static CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\[\s*([A-Za-z0-9_]+)\s*(?:\(\s*(\d+)\s*\))?\s*\](?:\(\s*(\d+)\s*\))?\s*(<=|>=|<>|=|<|>)\s*(?:'([^']*)'|"([^"]*)"|([^\s()\[\]'"]+))"#,
    )
    .unwrap()
});

/// Returns true when `s` is wrapped in one pair of braces, e.g. `{bmi}`.
fn is_brace_wrapped(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('{') && s.ends_with('}')
}

/// Parse a choice list of the form `1, Yes | 0, No`.
///
/// Items without a comma, with a non-integer code, or whose label is a
/// `{placeholder}` for a computed option are skipped. Returns `None` when no
/// item survives.
pub fn parse_choices(cell: &str) -> Option<IndexMap<String, i64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let mut choices = IndexMap::new();
    for item in cell.split('|') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let Some((code, label)) = item.split_once(',') else {
            continue;
        };
        let label = label.trim();
        if is_brace_wrapped(label) {
            continue;
        }
        if let Ok(code) = code.trim().parse::<i64>() {
            choices.insert(label.to_string(), code);
        }
    }

    if choices.is_empty() {
        None
    } else {
        Some(choices)
    }
}

/// Return the trimmed cell when it is a `{...}` calculation expression.
pub fn parse_calculation(cell: &str) -> Option<String> {
    let cell = cell.trim();
    is_brace_wrapped(cell).then(|| cell.to_string())
}

/// Parse a validation minimum or maximum.
///
/// The content decides the type: date-like text is kept verbatim, numbers
/// without a separator become integers, numbers with `.` or `,` become
/// floats. Anything else is absent.
pub fn parse_validation_limit(cell: &str) -> Result<Option<ValidationLimit>, CellError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }

    if DATE_LIKE.is_match(cell) {
        return Ok(Some(ValidationLimit::DateText(cell.to_string())));
    }

    if !NUMERIC_LIKE.is_match(cell) {
        return Ok(None);
    }

    if !cell.contains(['.', ',']) {
        return cell
            .parse::<i64>()
            .map(|v| Some(ValidationLimit::Int(v)))
            .map_err(|source| CellError::InvalidInteger {
                value: cell.to_string(),
                source,
            });
    }

    cell.replace(',', ".")
        .parse::<f64>()
        .map(|v| Some(ValidationLimit::Float(v)))
        .map_err(|source| CellError::InvalidFloat {
            value: cell.to_string(),
            source,
        })
}

/// Normalize a validation type name.
pub fn parse_validation_type(cell: &str) -> Result<Option<ValidationType>, CellError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    ValidationType::lookup(cell)
        .map(Some)
        .ok_or_else(|| CellError::UnknownValidationType(cell.to_string()))
}

/// Extract the atomic conditions of a branching-logic expression, in order.
///
/// `and`/`or` connectives and grouping parentheses are discarded.
pub fn parse_branching_logic(cell: &str) -> Option<Vec<BranchCondition>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let conditions: Vec<BranchCondition> = CONDITION
        .captures_iter(cell)
        .filter_map(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let checkbox_code = caps
                .get(2)
                .or_else(|| caps.get(3))
                .and_then(|m| m.as_str().parse::<i64>().ok());
            let operator: ComparisonOperator = caps.get(4)?.as_str().parse().ok()?;
            let raw = caps
                .get(5)
                .or_else(|| caps.get(6))
                .or_else(|| caps.get(7))
                .map(|m| m.as_str())
                .unwrap_or_default();

            Some(BranchCondition {
                field,
                checkbox_code,
                operator,
                value: coerce_condition_value(raw),
            })
        })
        .collect();

    if conditions.is_empty() {
        None
    } else {
        Some(conditions)
    }
}

fn coerce_condition_value(raw: &str) -> ConditionValue {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(v) => ConditionValue::Int(v),
        Err(_) => ConditionValue::Text(trimmed.to_string()),
    }
}

/// Parse a REDCap yes-flag cell (`y`).
pub fn parse_flag(cell: &str) -> bool {
    let cell = cell.trim();
    ["y", "yes", "1"].iter().any(|t| cell.eq_ignore_ascii_case(t))
}
