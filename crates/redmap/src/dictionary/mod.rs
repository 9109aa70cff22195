//! Data dictionary import and the canonical field model.
//!
//! A dictionary export is read as a raw table, its columns are matched to
//! semantic roles once, and every row with a field name is normalized into a
//! [`DataDictionaryField`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use redmap::diagnostics::CollectingSink;
//! use redmap::dictionary::DictionaryImporter;
//!
//! let warnings = Arc::new(CollectingSink::new());
//! let dict = DictionaryImporter::new()
//!     .with_sink(warnings.clone())
//!     .import("StudyDataDictionary.csv")
//!     .unwrap();
//!
//! println!("{} fields, {} warnings", dict.len(), warnings.len());
//! ```

mod columns;
mod dictionary;
mod field;
mod importer;
pub mod parsers;
mod types;

pub use columns::{ColumnResolver, ColumnRole, ResolvedColumn, ResolvedColumns, find_column};
pub use dictionary::DataDictionary;
pub use field::DataDictionaryField;
pub use importer::{DictionaryImporter, ImportConfig};
pub use types::{
    BranchCondition, ComparisonOperator, ConditionValue, FieldType, ValidationLimit,
    ValidationType,
};
