//! Ordered collection of canonical fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::field::DataDictionaryField;
use super::importer::DictionaryImporter;
use crate::error::Result;
use crate::input::SourceMetadata;

/// A normalized data dictionary.
///
/// Field order is the row order of the import. Field names are expected to be
/// unique; nothing here merges or removes duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionary {
    pub fields: Vec<DataDictionaryField>,
    /// Where the dictionary was imported from, if it came from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
}

impl DataDictionary {
    pub fn new(fields: Vec<DataDictionaryField>) -> Self {
        Self {
            fields,
            source: None,
        }
    }

    /// Import a dictionary export with the default importer.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use redmap::DataDictionary;
    ///
    /// let dict = DataDictionary::from_path("StudyDataDictionary.csv").unwrap();
    /// println!("{} fields", dict.len());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        DictionaryImporter::new().import(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataDictionaryField> {
        self.fields.iter()
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&DataDictionaryField> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field_name.as_str())
    }

    /// Distinct form names in order of first appearance.
    pub fn forms(&self) -> Vec<&str> {
        let mut forms: Vec<&str> = Vec::new();
        for field in &self.fields {
            if !forms.contains(&field.form_name.as_str()) {
                forms.push(&field.form_name);
            }
        }
        forms
    }

    /// Names that occur more than once, each reported once.
    pub fn duplicate_field_names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for name in self.field_names() {
            if seen.contains(&name) {
                if !duplicates.contains(&name) {
                    duplicates.push(name);
                }
            } else {
                seen.push(name);
            }
        }
        duplicates
    }

    /// Fingerprint of the normalized fields, `sha256:<hex>`.
    ///
    /// Depends only on field content and order, not on the source file's
    /// bytes, so re-exports with different column order hash the same.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(&self.fields)?;
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }
}

impl<'a> IntoIterator for &'a DataDictionary {
    type Item = &'a DataDictionaryField;
    type IntoIter = std::slice::Iter<'a, DataDictionaryField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::FieldType;

    fn sample() -> DataDictionary {
        DataDictionary::new(vec![
            DataDictionaryField::new("record_id", "enrollment", FieldType::Text),
            DataDictionaryField::new("age", "enrollment", FieldType::Text),
            DataDictionaryField::new("hr", "vitals", FieldType::Text),
            DataDictionaryField::new("age", "vitals", FieldType::Text),
        ])
    }

    #[test]
    fn test_forms_in_first_appearance_order() {
        assert_eq!(sample().forms(), vec!["enrollment", "vitals"]);
    }

    #[test]
    fn test_duplicates_reported_not_removed() {
        let dict = sample();
        assert_eq!(dict.duplicate_field_names(), vec!["age"]);
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.field("age").unwrap().form_name, "enrollment");
    }

    #[test]
    fn test_fingerprint_is_stable_and_order_sensitive() {
        let dict = sample();
        let hash = dict.fingerprint().unwrap();
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash, dict.fingerprint().unwrap());

        let mut reordered = dict.clone();
        reordered.fields.swap(0, 1);
        assert_ne!(hash, reordered.fingerprint().unwrap());
    }
}
