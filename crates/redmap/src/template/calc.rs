//! `{variable}` references in analyst-authored calculation expressions.
//!
//! Expressions are only inspected and rewritten here, never evaluated.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RedmapError, Result};

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

/// Variable names referenced by `expr`, in order of first appearance.
pub fn calc_variables(expr: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in VARIABLE.captures_iter(expr) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Replace every `{name}` in `expr` with its binding.
///
/// Fails on the first reference that has no binding.
pub fn substitute_variables(expr: &str, bindings: &IndexMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(expr.len());
    let mut last = 0;

    for caps in VARIABLE.captures_iter(expr) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = bindings
            .get(name.as_str())
            .ok_or_else(|| RedmapError::UnboundVariable(name.as_str().to_string()))?;

        out.push_str(&expr[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }

    out.push_str(&expr[last..]);
    Ok(out)
}
