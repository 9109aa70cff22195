//! The mapping template: global settings plus one entry per output field.

use serde::{Deserialize, Serialize};

use super::field::TemplateField;
use crate::dictionary::DataDictionary;
use crate::error::{RedmapError, Result};

/// Current version of the template format.
pub const TEMPLATE_VERSION: &str = "1.0";

/// Record-id column assumed when a template does not name one.
pub const DEFAULT_RECORD_ID_COLUMN: &str = "record_id";

fn default_version() -> String {
    TEMPLATE_VERSION.to_string()
}

fn default_record_id_column() -> String {
    DEFAULT_RECORD_ID_COLUMN.to_string()
}

/// Complete specification for mapping source data onto a REDCap project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default = "default_version")]
    pub version: String,
    pub name: String,
    /// Fingerprint of the dictionary the template was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datadict_hash: Option<String>,
    /// Source column holding the patient/record identifier.
    #[serde(default = "default_record_id_column")]
    pub record_id_column: String,
    /// Fixed arm, or none to choose one when the template is executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm: Option<String>,
    pub fields: Vec<TemplateField>,
}

/// Whether a template still matches a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryDrift {
    Match,
    Mismatch,
    /// The template carries no fingerprint.
    Unknown,
}

/// Mapping progress over a template's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub total: usize,
    pub hidden: usize,
    /// Visible fields with a source or calculation.
    pub mapped: usize,
    /// Visible fields derived from a calculation.
    pub calculated: usize,
    /// Visible fields with nothing configured yet.
    pub unmapped: usize,
}

impl Template {
    /// Create an empty-mapping template with one field per dictionary field.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use redmap::{DataDictionary, Template};
    ///
    /// let dict = DataDictionary::from_path("StudyDataDictionary.csv").unwrap();
    /// let template = Template::from_dictionary(&dict, "icu_vitals").unwrap();
    /// template.save("templates/icu_vitals.yaml").unwrap();
    /// ```
    pub fn from_dictionary(dict: &DataDictionary, name: impl Into<String>) -> Result<Self> {
        let fields = dict
            .fields
            .iter()
            .cloned()
            .map(TemplateField::from)
            .collect();

        Ok(Self {
            version: default_version(),
            name: name.into(),
            datadict_hash: Some(dict.fingerprint()?),
            record_id_column: default_record_id_column(),
            arm: None,
            fields,
        })
    }

    pub fn with_record_id_column(mut self, column: impl Into<String>) -> Self {
        self.record_id_column = column.into();
        self
    }

    pub fn with_arm(mut self, arm: impl Into<String>) -> Self {
        self.arm = Some(arm.into());
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut TemplateField> {
        self.fields.iter_mut().find(|f| f.field_name == name)
    }

    /// Apply `update` to the named field.
    pub fn update_field<F>(&mut self, name: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut TemplateField),
    {
        let field = self
            .field_mut(name)
            .ok_or_else(|| RedmapError::InvalidTemplate(format!("no field named '{}'", name)))?;
        update(field);
        Ok(())
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter().filter(|f| f.visible)
    }

    /// Visible fields that still need a source or calculation.
    pub fn unmapped_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.visible_fields().filter(|f| !f.is_mapped())
    }

    /// Compare the stored fingerprint with `dict`. Nothing is enforced.
    pub fn dictionary_drift(&self, dict: &DataDictionary) -> Result<DictionaryDrift> {
        let Some(stored) = self.datadict_hash.as_deref() else {
            return Ok(DictionaryDrift::Unknown);
        };
        Ok(if stored == dict.fingerprint()? {
            DictionaryDrift::Match
        } else {
            DictionaryDrift::Mismatch
        })
    }

    pub fn summary(&self) -> TemplateSummary {
        let mut summary = TemplateSummary {
            total: self.fields.len(),
            ..TemplateSummary::default()
        };

        for field in &self.fields {
            if !field.visible {
                summary.hidden += 1;
            } else if field.is_mapped() {
                summary.mapped += 1;
                if field.use_calculation {
                    summary.calculated += 1;
                }
            } else {
                summary.unmapped += 1;
            }
        }

        summary
    }

    /// Check rules the decoder cannot express.
    pub fn validate(&self) -> Result<()> {
        for (index, field) in self.fields.iter().enumerate() {
            if field.field_name.trim().is_empty() {
                return Err(RedmapError::InvalidTemplate(format!(
                    "field #{} has an empty field_name",
                    index
                )));
            }
            if field.time_interval == Some(0) {
                return Err(RedmapError::InvalidTemplate(format!(
                    "field '{}': time_interval must be at least one hour",
                    field.field_name
                )));
            }
            if let Some(p) = field.outlier_filter {
                if !(0.0..=100.0).contains(&p) {
                    return Err(RedmapError::InvalidTemplate(format!(
                        "field '{}': outlier_filter {} is not a percentile",
                        field.field_name, p
                    )));
                }
            }
        }
        Ok(())
    }
}
