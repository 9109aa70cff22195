//! The canonical representation of one study field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{BranchCondition, FieldType, ValidationLimit, ValidationType};

/// One normalized data-dictionary field.
///
/// Absent attributes are omitted when serialized. `identifier` and
/// `required_field` are always written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionaryField {
    /// Unique key within a dictionary; never empty.
    pub field_name: String,
    pub form_name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_label: Option<String>,
    /// Choice label to coded value, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<IndexMap<String, i64>>,
    /// REDCap calculation metadata; never evaluated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<ValidationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_minimum: Option<ValidationLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_maximum: Option<ValidationLimit>,
    #[serde(default)]
    pub identifier: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branching_logic: Option<Vec<BranchCondition>>,
    #[serde(default)]
    pub required_field: bool,
}

impl DataDictionaryField {
    /// Create a field with only its identity set.
    pub fn new(
        field_name: impl Into<String>,
        form_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            form_name: form_name.into(),
            field_type,
            field_label: None,
            choices: None,
            calculation: None,
            validation_type: None,
            validation_minimum: None,
            validation_maximum: None,
            identifier: false,
            branching_logic: None,
            required_field: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.field_label = Some(label.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let map: IndexMap<String, i64> = choices.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.choices = if map.is_empty() { None } else { Some(map) };
        self
    }

    /// Coded value for a choice label.
    pub fn choice_code(&self, label: &str) -> Option<i64> {
        self.choices.as_ref()?.get(label).copied()
    }

    /// Choice label for a coded value.
    pub fn choice_label(&self, code: i64) -> Option<&str> {
        self.choices
            .as_ref()?
            .iter()
            .find(|(_, v)| **v == code)
            .map(|(k, _)| k.as_str())
    }

    /// Names of the fields this field's visibility depends on.
    pub fn branching_dependencies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for condition in self.branching_logic.iter().flatten() {
            if !names.contains(&condition.field.as_str()) {
                names.push(&condition.field);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::types::ComparisonOperator;

    #[test]
    fn test_choice_lookup_both_directions() {
        let field = DataDictionaryField::new("sex", "demographics", FieldType::Radio)
            .with_choices([("Male", 1), ("Female", 2)]);

        assert_eq!(field.choice_code("Female"), Some(2));
        assert_eq!(field.choice_label(1), Some("Male"));
        assert_eq!(field.choice_label(9), None);
    }

    #[test]
    fn test_empty_choices_are_absent() {
        let field = DataDictionaryField::new("age", "demographics", FieldType::Text)
            .with_choices(Vec::<(String, i64)>::new());
        assert!(field.choices.is_none());
    }

    #[test]
    fn test_branching_dependencies_are_unique() {
        let mut field = DataDictionaryField::new("preg", "demographics", FieldType::Yesno);
        field.branching_logic = Some(vec![
            BranchCondition::new("sex", ComparisonOperator::Eq, 2),
            BranchCondition::new("age", ComparisonOperator::Ge, 12),
            BranchCondition::new("sex", ComparisonOperator::Ne, 1),
        ]);

        assert_eq!(field.branching_dependencies(), vec!["sex", "age"]);
    }

    #[test]
    fn test_serialization_omits_absent_attributes() {
        let field = DataDictionaryField::new("age", "demographics", FieldType::Text);
        let json = serde_json::to_value(&field).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();

        assert!(keys.contains(&"identifier"));
        assert!(keys.contains(&"required_field"));
        assert!(!keys.contains(&"choices"));
        assert!(!keys.contains(&"validation_minimum"));
    }
}
