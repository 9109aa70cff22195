//! Row-by-row assembly of canonical fields from a dictionary export.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::columns::{ColumnResolver, ColumnRole, ResolvedColumns};
use super::dictionary::DataDictionary;
use super::field::DataDictionaryField;
use super::parsers::{
    parse_branching_logic, parse_calculation, parse_choices, parse_flag, parse_validation_limit,
    parse_validation_type,
};
use super::types::FieldType;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{CellError, RedmapError, Result};
use crate::input::{DataTable, Parser, ParserConfig};

/// Configuration for dictionary imports.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// How the delimited file is read.
    pub parser: ParserConfig,
    /// How header names map to column roles.
    pub resolver: ColumnResolver,
}

/// Imports dictionary exports into a [`DataDictionary`].
pub struct DictionaryImporter {
    config: ImportConfig,
    parser: Parser,
    sink: Arc<dyn DiagnosticSink>,
}

impl DictionaryImporter {
    /// Importer with default configuration that logs warnings via `tracing`.
    pub fn new() -> Self {
        Self::with_config(ImportConfig::default())
    }

    pub fn with_config(config: ImportConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            sink: Arc::new(TracingSink),
        }
    }

    /// Route cell-level warnings to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Read and normalize a dictionary file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<DataDictionary> {
        let (table, source) = self.parser.parse_file(path)?;
        let mut dict = self.import_table(&table)?;
        dict.source = Some(source);
        Ok(dict)
    }

    /// Normalize dictionary content held in memory.
    pub fn import_str(&self, text: &str) -> Result<DataDictionary> {
        let table = self.parser.parse_str(text)?;
        self.import_table(&table)
    }

    /// Normalize an already-parsed table.
    pub fn import_table(&self, table: &DataTable) -> Result<DataDictionary> {
        let columns = self.config.resolver.resolve(&table.headers);
        columns.require(&ColumnRole::REQUIRED)?;

        for role in columns.missing() {
            debug!(role = %role, "no column for optional role");
        }

        let mut fields = Vec::with_capacity(table.row_count());
        let mut skipped = 0usize;

        for row in 0..table.row_count() {
            match self.build_field(table, row, &columns)? {
                Some(field) => fields.push(field),
                None => {
                    skipped += 1;
                    debug!(row, "skipping row without a field name");
                }
            }
        }

        info!(fields = fields.len(), skipped, "imported data dictionary");
        Ok(DataDictionary::new(fields))
    }

    fn build_field(
        &self,
        table: &DataTable,
        row: usize,
        columns: &ResolvedColumns,
    ) -> Result<Option<DataDictionaryField>> {
        let cell = |role: ColumnRole| {
            columns
                .index(role)
                .and_then(|col| table.cell(row, col))
                .map(str::trim)
        };

        let Some(field_name) = cell(ColumnRole::FieldName) else {
            return Ok(None);
        };

        let invalid = |message: String| RedmapError::InvalidField {
            row,
            field: field_name.to_string(),
            message,
        };

        let form_name = cell(ColumnRole::FormName)
            .ok_or_else(|| invalid("missing form name".to_string()))?;
        let field_type = cell(ColumnRole::FieldType)
            .ok_or_else(|| invalid("missing field type".to_string()))?
            .parse::<FieldType>()
            .map_err(invalid)?;

        let mut field = DataDictionaryField::new(field_name, form_name, field_type);
        field.field_label = cell(ColumnRole::FieldLabel).map(str::to_string);

        if let Some(raw) = cell(ColumnRole::Choices) {
            if field_type.is_choice_based() {
                field.choices = parse_choices(raw);
            }
            field.calculation = parse_calculation(raw);
        }

        field.validation_type = cell(ColumnRole::ValidationType).and_then(|raw| {
            self.recover(
                parse_validation_type(raw),
                row,
                columns,
                ColumnRole::ValidationType,
                raw,
            )
        });
        field.validation_minimum = cell(ColumnRole::ValidationMinimum).and_then(|raw| {
            self.recover(
                parse_validation_limit(raw),
                row,
                columns,
                ColumnRole::ValidationMinimum,
                raw,
            )
        });
        field.validation_maximum = cell(ColumnRole::ValidationMaximum).and_then(|raw| {
            self.recover(
                parse_validation_limit(raw),
                row,
                columns,
                ColumnRole::ValidationMaximum,
                raw,
            )
        });

        field.identifier = cell(ColumnRole::Identifier).is_some_and(parse_flag);
        field.branching_logic = cell(ColumnRole::BranchingLogic).and_then(parse_branching_logic);
        field.required_field = cell(ColumnRole::RequiredField).is_some_and(parse_flag);

        Ok(Some(field))
    }

    /// Keep a cell parser's value, or report its failure and fall back to absent.
    fn recover<T>(
        &self,
        parsed: std::result::Result<Option<T>, CellError>,
        row: usize,
        columns: &ResolvedColumns,
        role: ColumnRole,
        raw: &str,
    ) -> Option<T> {
        match parsed {
            Ok(value) => value,
            Err(e) => {
                let mut diagnostic = Diagnostic::new(raw, e.to_string()).at_row(row);
                if let Some(header) = columns.header(role) {
                    diagnostic = diagnostic.in_column(header);
                }
                self.sink.warn(diagnostic);
                None
            }
        }
    }
}

impl Default for DictionaryImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::dictionary::{ValidationLimit, ValidationType};

    const HEADER: &str = "Variable / Field Name,Form Name,Field Type,Field Label,\
        \"Choices, Calculations, OR Slider Labels\",Text Validation Type OR Show Slider Number,\
        Text Validation Min,Text Validation Max,Identifier?,Branching Logic (Show field only if...),Required Field?";

    fn import(rows: &[&str]) -> (Result<DataDictionary>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let text = format!("{}\n{}\n", HEADER, rows.join("\n"));
        let result = DictionaryImporter::new()
            .with_sink(sink.clone())
            .import_str(&text);
        (result, sink)
    }

    #[test]
    fn test_full_row_assembly() {
        let (dict, sink) = import(&[
            "sex,demographics,radio,Sex,\"1, Male | 2, Female\",,,,y,[age] >= 18,y",
        ]);
        let dict = dict.unwrap();
        let field = &dict.fields[0];

        assert_eq!(field.field_name, "sex");
        assert_eq!(field.form_name, "demographics");
        assert_eq!(field.field_type, FieldType::Radio);
        assert_eq!(field.field_label.as_deref(), Some("Sex"));
        assert_eq!(field.choice_code("Female"), Some(2));
        assert!(field.identifier);
        assert!(field.required_field);
        assert_eq!(field.branching_logic.as_ref().unwrap().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_limits_and_validation_type() {
        let (dict, _) = import(&["temp,vitals,text,Temperature,,number_1dp,\"34,5\",42,,,"]);
        let field = &dict.unwrap().fields[0];

        assert_eq!(field.validation_type, Some(ValidationType::Number1Dp));
        assert_eq!(field.validation_minimum, Some(ValidationLimit::Float(34.5)));
        assert_eq!(field.validation_maximum, Some(ValidationLimit::Int(42)));
    }

    #[test]
    fn test_calc_field_keeps_expression_not_choices() {
        let (dict, _) = import(&["bmi,vitals,calc,BMI,{weight} / ({height} ^ 2),,,,,,"]);
        let field = &dict.unwrap().fields[0];

        assert_eq!(field.calculation.as_deref(), Some("{weight} / ({height} ^ 2)"));
        assert!(field.choices.is_none());
    }

    #[test]
    fn test_rows_without_field_name_are_skipped() {
        let (dict, _) = import(&[
            "a,f1,text,,,,,,,,",
            ",f1,text,,,,,,,,",
            "b,f1,notes,,,,,,,,",
            "NA,f1,text,,,,,,,,",
        ]);
        let names: Vec<String> = dict
            .unwrap()
            .fields
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_bad_cells_become_warnings() {
        let (dict, sink) = import(&["x,f1,text,,,email,12abc,2020-12-31,,,"]);
        let field = &dict.unwrap().fields[0];

        assert_eq!(field.validation_type, None);
        assert_eq!(field.validation_minimum, None);
        assert_eq!(
            field.validation_maximum,
            Some(ValidationLimit::DateText("2020-12-31".to_string()))
        );

        let warnings = sink.diagnostics();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].value, "email");
        assert_eq!(
            warnings[0].column.as_deref(),
            Some("Text Validation Type OR Show Slider Number")
        );
        assert_eq!(warnings[1].row, Some(0));
        assert_eq!(warnings[1].value, "12abc");
    }

    #[test]
    fn test_unknown_field_type_fails_import() {
        let (result, _) = import(&["a,f1,text,,,,,,,,", "b,f1,slider,,,,,,,,"]);
        match result {
            Err(RedmapError::InvalidField { row, field, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(field, "b");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let result = DictionaryImporter::new().import_str("Field Name,Field Type\nage,text\n");
        assert!(matches!(
            result,
            Err(RedmapError::MissingColumn {
                role: ColumnRole::FormName
            })
        ));
    }
}
