//! Mapping templates: how each dictionary field is filled from source data.
//!
//! A [`Template`] is created from a [`DataDictionary`](crate::DataDictionary)
//! with every field unmapped, edited by hand or programmatically, and stored
//! as YAML. Execution of templates against source data happens elsewhere.

mod calc;
mod field;
mod persistence;
mod source;
mod template;

pub use calc::{calc_variables, substitute_variables};
pub use field::{AggregationMethod, ReferenceMode, TemplateField};
pub use persistence::template_path;
pub use source::{ConstantValue, SourceMapping, SourceSpec};
pub use template::{
    DEFAULT_RECORD_ID_COLUMN, DictionaryDrift, TEMPLATE_VERSION, Template, TemplateSummary,
};
