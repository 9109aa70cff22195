//! Diagnostics for recoverable import problems.
//!
//! Cell-level failures never abort an import. They are funneled into a
//! [`DiagnosticSink`] so callers decide where warnings go: the default
//! [`TracingSink`] emits `tracing` events, while [`CollectingSink`] keeps them
//! in memory for inspection.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A recoverable anomaly found while importing one cell or row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Zero-based data row (header excluded), if tied to a row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Header of the column the value came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// The offending raw value.
    pub value: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row: None,
            column: None,
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.column) {
            (Some(row), Some(column)) => write!(f, "row {}, column '{}': ", row, column)?,
            (Some(row), None) => write!(f, "row {}: ", row)?,
            (None, Some(column)) => write!(f, "column '{}': ", column)?,
            (None, None) => {}
        }
        write!(f, "{}", self.message)
    }
}

/// Receives warnings emitted during an import.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` as warn-level events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            row = diagnostic.row,
            column = diagnostic.column.as_deref(),
            value = %diagnostic.value,
            "{}",
            diagnostic.message
        );
    }
}

/// Stores diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.diagnostics().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut d) => d.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
