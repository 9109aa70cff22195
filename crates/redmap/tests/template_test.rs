//! Integration tests for mapping templates and their YAML files.

use std::fs;
use std::io::Write;

use tempfile::{NamedTempFile, TempDir};

use redmap::template::{SourceSpec, template_path};
use redmap::{
    AggregationMethod, ComparisonOperator, ConditionValue, DataDictionary, DictionaryDrift,
    RedmapError, ReferenceMode, SourceMapping, Template, ValidationLimit,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn create_dictionary() -> DataDictionary {
    let file = create_test_file(
        "Variable / Field Name,Form Name,Field Type,Field Label,\"Choices, Calculations, OR Slider Labels\",Text Validation Type OR Show Slider Number,Text Validation Min,Text Validation Max,Identifier?,Branching Logic (Show field only if...),Required Field?\n\
         record_id,enrollment,text,Record ID,,,,,,,y\n\
         sex,enrollment,radio,Sex,\"1, Male | 2, Female\",,,,y,,\n\
         hr,vitals,text,Heart rate,,integer,0,300,,,\n\
         temp,vitals,text,Temperature,,number_1dp,\"34,5\",42.5,,[hr] > 0,\n\
         norad,medication,text,Noradrenaline,,number_2dp,,,,,\n\
         adm,vitals,text,Admission,,date_dmy,2021-01-01,,,[sex(2)] = '1' and [site] = 'north',\n",
    );
    DataDictionary::from_path(file.path()).expect("Failed to import dictionary")
}

fn create_mapped_template() -> Template {
    let dict = create_dictionary();
    let mut template = Template::from_dictionary(&dict, "icu")
        .unwrap()
        .with_record_id_column("patient_id");

    template
        .update_field("record_id", |f| f.visible = false)
        .unwrap();
    template
        .update_field("hr", |f| {
            f.source = Some(
                SourceMapping::query(Some("param == 'HR'"), "value").with_timestamp("charttime"),
            );
            f.aggregation = Some(AggregationMethod::Median);
            f.time_interval = Some(24);
            f.reference = Some(ReferenceMode::FromTimepoint);
            f.reference_column = Some("admission_time".to_string());
            f.outlier_filter = Some(99.5);
        })
        .unwrap();
    template
        .update_field("norad", |f| {
            f.use_calculation = true;
            f.calculation_expr = Some("({dose_ml_h} / {kg} / 60) * {conc} * 1000".to_string());
            f.calc_vars = Some(
                [
                    ("dose_ml_h".to_string(), SourceMapping::query(None, "rate")),
                    ("kg".to_string(), SourceMapping::constant("{weight}")),
                    ("conc".to_string(), SourceMapping::constant("0.08")),
                ]
                .into_iter()
                .collect(),
            );
        })
        .unwrap();
    template
}

// =============================================================================
// Template Creation
// =============================================================================

#[test]
fn test_from_dictionary_has_one_field_per_dictionary_field() {
    let dict = create_dictionary();
    let template = Template::from_dictionary(&dict, "icu").unwrap();

    assert_eq!(template.len(), dict.len());
    for (field, dict_field) in template.fields.iter().zip(dict.iter()) {
        assert_eq!(&field.field, dict_field);
        assert!(field.visible);
        assert!(field.source.is_none());
        assert!(!field.use_calculation);
    }
    assert_eq!(template.summary().unmapped, dict.len());
}

#[test]
fn test_summary_of_mapped_template() {
    let summary = create_mapped_template().summary();

    assert_eq!(summary.total, 6);
    assert_eq!(summary.hidden, 1);
    assert_eq!(summary.mapped, 2);
    assert_eq!(summary.calculated, 1);
    assert_eq!(summary.unmapped, 3);
}

#[test]
fn test_constant_reference_resolution() {
    let template = create_mapped_template();
    let vars = template.field("norad").unwrap().calc_vars.as_ref().unwrap();

    assert!(matches!(
        vars["kg"].resolve(),
        SourceSpec::Constant(redmap::template::ConstantValue::Reference("weight"))
    ));
    assert!(matches!(
        vars["conc"].resolve(),
        SourceSpec::Constant(redmap::template::ConstantValue::Literal("0.08"))
    ));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_save_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("icu.template.yaml");
    let template = create_mapped_template();

    template.save(&path).unwrap();
    let loaded = Template::load(&path).unwrap();

    assert_eq!(loaded, template);
    assert_eq!(loaded.record_id_column, "patient_id");
    assert_eq!(
        loaded.field("temp").unwrap().branching_dependencies(),
        vec!["hr"]
    );
}

#[test]
fn test_date_limit_and_conditions_survive_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("icu.template.yaml");
    let template = create_mapped_template();

    let adm = template.field("adm").unwrap();
    assert_eq!(
        adm.validation_minimum,
        Some(ValidationLimit::DateText("2021-01-01".to_string()))
    );

    template.save(&path).unwrap();
    let loaded = Template::load(&path).unwrap();
    let reloaded = loaded.field("adm").unwrap();

    assert_eq!(reloaded.field, adm.field);
    assert_eq!(
        reloaded.validation_minimum,
        Some(ValidationLimit::DateText("2021-01-01".to_string()))
    );

    let conditions = reloaded.branching_logic.as_ref().unwrap();
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[0].field, "sex");
    assert_eq!(conditions[0].checkbox_code, Some(2));
    assert_eq!(conditions[0].operator, ComparisonOperator::Eq);
    assert_eq!(conditions[0].value, ConditionValue::Int(1));
    assert_eq!(conditions[1].field, "site");
    assert_eq!(conditions[1].checkbox_code, None);
    assert_eq!(conditions[1].value, ConditionValue::Text("north".to_string()));
}

#[test]
fn test_resave_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.yaml");
    let second = dir.path().join("second.yaml");

    create_mapped_template().save(&first).unwrap();
    Template::load(&first).unwrap().save(&second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_save_omits_absent_attributes() {
    let template = Template::from_dictionary(&create_dictionary(), "icu").unwrap();
    let yaml = template.to_yaml_string().unwrap();

    assert!(yaml.contains("visible: true"));
    assert!(yaml.contains("use_calculation: false"));
    assert!(!yaml.contains("aggregation"));
    assert!(!yaml.contains("source:"));
    assert!(!yaml.contains("arm:"));
    assert!(!yaml.contains("null"));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("t.yaml");

    create_mapped_template().save(&path).unwrap();

    assert!(path.exists());
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.yaml");

    create_mapped_template().save(&path).unwrap();
    let renamed = create_mapped_template().with_arm("arm_1");
    renamed.save(&path).unwrap();

    assert_eq!(Template::load(&path).unwrap().arm.as_deref(), Some("arm_1"));
}

#[test]
fn test_load_unknown_aggregation_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    let yaml = create_mapped_template()
        .to_yaml_string()
        .unwrap()
        .replace("aggregation: median", "aggregation: average");
    fs::write(&path, yaml).unwrap();

    match Template::load(&path) {
        Err(RedmapError::TemplateFormat { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected TemplateFormat, got {:?}", other),
    }
}

#[test]
fn test_load_unknown_reference_mode_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    let yaml = create_mapped_template()
        .to_yaml_string()
        .unwrap()
        .replace("reference: from_timepoint", "reference: hourly");
    fs::write(&path, yaml).unwrap();

    assert!(matches!(
        Template::load(&path),
        Err(RedmapError::TemplateFormat { .. })
    ));
}

#[test]
fn test_load_missing_file() {
    assert!(matches!(
        Template::load("/nonexistent/template.yaml"),
        Err(RedmapError::Io { .. })
    ));
}

#[test]
fn test_load_rejects_invalid_percentile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    let yaml = create_mapped_template()
        .to_yaml_string()
        .unwrap()
        .replace("outlier_filter: 99.5", "outlier_filter: 250.0");
    fs::write(&path, yaml).unwrap();

    assert!(matches!(
        Template::load(&path),
        Err(RedmapError::InvalidTemplate(_))
    ));
}

// =============================================================================
// Dictionary Drift
// =============================================================================

#[test]
fn test_dictionary_drift_detects_changes() {
    let dict = create_dictionary();
    let template = Template::from_dictionary(&dict, "icu").unwrap();
    assert_eq!(template.dictionary_drift(&dict).unwrap(), DictionaryDrift::Match);

    let mut changed = dict.clone();
    changed.fields[2].field_label = Some("Pulse".to_string());
    assert_eq!(
        template.dictionary_drift(&changed).unwrap(),
        DictionaryDrift::Mismatch
    );
}

#[test]
fn test_template_path_next_to_dictionary() {
    let path = template_path("/data/StudyDataDictionary.csv");
    assert_eq!(
        path.to_string_lossy(),
        "/data/StudyDataDictionary.template.yaml"
    );
}
