//! Persistence for templates - save/load YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::template::Template;
use crate::error::{RedmapError, Result};

impl Template {
    /// Serialize the whole template to YAML.
    ///
    /// Absent attributes are omitted and keys keep declaration order, so the
    /// output of an unchanged template is byte-for-byte stable.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Decode and validate a template from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let template: Template = serde_yaml::from_str(text)?;
        template.validate()?;
        Ok(template)
    }

    /// Save the template to a YAML file.
    ///
    /// The document is fully serialized before anything touches disk, then
    /// written to a sibling staging file and renamed over `path`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use redmap::Template;
    /// # fn example(template: &Template) -> redmap::Result<()> {
    /// template.save("templates/icu_vitals.yaml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = self.to_yaml_string()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    RedmapError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let staging = staging_path(path);
        fs::write(&staging, yaml.as_bytes()).map_err(|e| {
            RedmapError::Persistence(format!(
                "Failed to write file '{}': {}",
                staging.display(),
                e
            ))
        })?;

        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(RedmapError::Persistence(format!(
                "Failed to replace '{}': {}",
                path.display(),
                e
            )));
        }

        debug!(path = %path.display(), fields = self.fields.len(), "saved template");
        Ok(())
    }

    /// Load a template from a YAML file.
    ///
    /// Unknown enumeration values and wrong types fail with
    /// [`RedmapError::TemplateFormat`] naming the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use redmap::Template;
    /// let template = Template::load("templates/icu_vitals.yaml").unwrap();
    /// println!("Unmapped: {}", template.unmapped_fields().count());
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let text = fs::read_to_string(path).map_err(|e| RedmapError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let template: Template =
            serde_yaml::from_str(&text).map_err(|e| RedmapError::TemplateFormat {
                path: path.to_path_buf(),
                source: e,
            })?;
        template.validate()?;

        debug!(path = %path.display(), fields = template.fields.len(), "loaded template");
        Ok(template)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Default template path for a dictionary file.
///
/// # Example
///
/// ```
/// use redmap::template::template_path;
///
/// let path = template_path("data/StudyDataDictionary.csv");
/// assert_eq!(path.to_string_lossy(), "data/StudyDataDictionary.template.yaml");
/// ```
pub fn template_path(dictionary_path: impl AsRef<Path>) -> PathBuf {
    let dictionary_path = dictionary_path.as_ref();
    let stem = dictionary_path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = dictionary_path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.template.yaml", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_path() {
        assert_eq!(
            template_path("data/dict.csv").to_string_lossy(),
            "data/dict.template.yaml"
        );
        assert_eq!(template_path("dict.csv").to_string_lossy(), "dict.template.yaml");
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("out/t.yaml")),
            PathBuf::from("out/.t.yaml.tmp")
        );
    }

    #[test]
    fn test_from_yaml_str_rejects_unknown_aggregation() {
        let yaml = "name: t\nfields:\n- field_name: hr\n  form_name: vitals\n  field_type: text\n  aggregation: average\n";
        assert!(matches!(
            Template::from_yaml_str(yaml),
            Err(RedmapError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_yaml_str_applies_defaults() {
        let yaml = "name: t\nfields:\n- field_name: hr\n  form_name: vitals\n  field_type: text\n";
        let template = Template::from_yaml_str(yaml).unwrap();

        assert_eq!(template.version, "1.0");
        assert_eq!(template.record_id_column, "record_id");
        assert!(template.fields[0].visible);
        assert!(!template.fields[0].identifier);
    }
}
