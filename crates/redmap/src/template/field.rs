//! A dictionary field extended with source-mapping configuration.

use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::calc::calc_variables;
use super::source::{SourceMapping, SourceSpec};
use crate::dictionary::DataDictionaryField;

/// How multiple source observations collapse into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    First,
    Last,
    /// Average value.
    Mean,
    /// Middle value.
    Median,
    Min,
    Max,
    /// Most frequent value.
    Mode,
    Sum,
    /// Closest to the reference timepoint.
    Nearest,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::First => "first",
            AggregationMethod::Last => "last",
            AggregationMethod::Mean => "mean",
            AggregationMethod::Median => "median",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::Mode => "mode",
            AggregationMethod::Sum => "sum",
            AggregationMethod::Nearest => "nearest",
        }
    }

    /// Returns true if the method only applies to numeric observations.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AggregationMethod::Mean
                | AggregationMethod::Median
                | AggregationMethod::Min
                | AggregationMethod::Max
                | AggregationMethod::Sum
        )
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor of a field's time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Intervals start at midnight of each calendar day.
    CalendarDay,
    /// Intervals start at the timepoint in `reference_column`.
    FromTimepoint,
}

fn default_visible() -> bool {
    true
}

/// One output field of a template.
///
/// Dereferences to the [`DataDictionaryField`] it was built from; the
/// dictionary attributes are serialized inline before the mapping ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    #[serde(flatten)]
    pub field: DataDictionaryField,

    /// Whether the field is included in the output.
    #[serde(default = "default_visible")]
    pub visible: bool,

    /// REDCap event: a literal event name or a source column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_instrument: Option<String>,
    /// Source column holding the repeat instance number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_instance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMapping>,

    /// Derive the value from `calculation_expr` instead of `source`.
    #[serde(default)]
    pub use_calculation: bool,
    /// e.g. `({dose_ml_h} / {kg} / 60) * {conc_mg_ml} * 1000`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calc_vars: Option<IndexMap<String, SourceMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationMethod>,
    /// Interval length in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_column: Option<String>,
    /// Percentile beyond which source values are dropped before aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_filter: Option<f64>,
}

impl From<DataDictionaryField> for TemplateField {
    fn from(field: DataDictionaryField) -> Self {
        Self {
            field,
            visible: true,
            event_name: None,
            repeat_instrument: None,
            repeat_instance: None,
            source: None,
            use_calculation: false,
            calculation_expr: None,
            calc_vars: None,
            aggregation: None,
            time_interval: None,
            reference: None,
            reference_column: None,
            outlier_filter: None,
        }
    }
}

impl Deref for TemplateField {
    type Target = DataDictionaryField;

    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl DerefMut for TemplateField {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.field
    }
}

impl TemplateField {
    pub fn with_source(mut self, source: SourceMapping) -> Self {
        self.source = Some(source);
        self
    }

    /// Derive the value from `expr`, with one mapping per variable.
    pub fn with_calculation<I, S>(mut self, expr: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (S, SourceMapping)>,
        S: Into<String>,
    {
        let vars: IndexMap<String, SourceMapping> =
            vars.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.use_calculation = true;
        self.calculation_expr = Some(expr.into());
        self.calc_vars = if vars.is_empty() { None } else { Some(vars) };
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationMethod) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_time_window(
        mut self,
        interval_hours: u32,
        reference: ReferenceMode,
        reference_column: Option<&str>,
    ) -> Self {
        self.time_interval = Some(interval_hours);
        self.reference = Some(reference);
        self.reference_column = reference_column.map(str::to_string);
        self
    }

    pub fn with_event(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = Some(event_name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Returns true if the field has a usable source or a calculation.
    pub fn is_mapped(&self) -> bool {
        if self.use_calculation && self.calculation_expr.is_some() {
            return true;
        }
        self.source
            .as_ref()
            .is_some_and(|s| s.resolve() != SourceSpec::Unmapped)
    }

    /// Variables used in `calculation_expr` that have no entry in `calc_vars`.
    ///
    /// Informational only; whether a calculation can run is decided by the
    /// execution engine.
    pub fn undeclared_calc_vars(&self) -> Vec<&str> {
        let Some(expr) = self.calculation_expr.as_deref() else {
            return Vec::new();
        };
        calc_variables(expr)
            .into_iter()
            .filter(|name| {
                !self
                    .calc_vars
                    .as_ref()
                    .is_some_and(|vars| vars.contains_key(*name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::FieldType;

    fn base() -> TemplateField {
        TemplateField::from(DataDictionaryField::new("norad", "medication", FieldType::Text))
    }

    #[test]
    fn test_from_dictionary_field_has_empty_mapping() {
        let field = base();
        assert!(field.visible);
        assert!(!field.use_calculation);
        assert!(field.source.is_none());
        assert!(field.aggregation.is_none());
        assert!(!field.is_mapped());
        assert_eq!(field.field_name, "norad");
    }

    #[test]
    fn test_query_source_is_mapped() {
        let field = base().with_source(SourceMapping::query(None, "norad_rate"));
        assert!(field.is_mapped());
    }

    #[test]
    fn test_calculation_and_undeclared_vars() {
        let field = base().with_calculation(
            "({dose_ml_h} / {kg} / 60) * {conc_mg_ml} * 1000",
            [
                ("dose_ml_h", SourceMapping::query(Some("drug == 'norad'"), "rate")),
                ("conc_mg_ml", SourceMapping::constant("0.08")),
            ],
        );

        assert!(field.is_mapped());
        assert_eq!(field.undeclared_calc_vars(), vec!["kg"]);
    }

    #[test]
    fn test_aggregation_serializes_snake_case() {
        let json = serde_json::to_string(&ReferenceMode::FromTimepoint).unwrap();
        assert_eq!(json, "\"from_timepoint\"");
        assert!(AggregationMethod::Median.is_numeric());
        assert!(!AggregationMethod::Mode.is_numeric());
    }
}
