//! Redmap: REDCap data-dictionary import and mapping templates.
//!
//! Redmap reads the CSV data dictionary exported by a REDCap project,
//! normalizes every row into a typed [`DataDictionaryField`], and builds a
//! [`Template`] describing how each field will be filled from source data.
//!
//! # Core Principles
//!
//! - **Header-agnostic**: Columns are found by pattern, not by position
//! - **Lenient cells**: A malformed cell becomes a warning, not a failed import
//! - **Stable files**: Templates round-trip through YAML without churn
//!
//! # Example
//!
//! ```no_run
//! use redmap::{DataDictionary, Template};
//!
//! let dict = DataDictionary::from_path("StudyDataDictionary.csv").unwrap();
//! let template = Template::from_dictionary(&dict, "study").unwrap();
//!
//! println!("Fields: {}", dict.len());
//! println!("Forms: {:?}", dict.forms());
//! template.save("study.template.yaml").unwrap();
//! ```

pub mod diagnostics;
pub mod dictionary;
pub mod error;
pub mod input;
pub mod template;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use dictionary::{
    BranchCondition, ColumnResolver, ColumnRole, ComparisonOperator, ConditionValue,
    DataDictionary, DataDictionaryField, DictionaryImporter, FieldType, ImportConfig,
    ValidationLimit, ValidationType,
};
pub use error::{CellError, RedmapError, Result};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use template::{
    AggregationMethod, DictionaryDrift, ReferenceMode, SourceMapping, Template, TemplateField,
    TemplateSummary,
};
