//! Inspect command - import a dictionary and summarize it.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use redmap::{CollectingSink, DictionaryImporter, FieldType, ImportConfig, ParserConfig};

pub fn run(
    file: PathBuf,
    json_output: bool,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = ImportConfig::default();
    if let Some(d) = delimiter {
        if !d.is_ascii() {
            return Err(format!("Delimiter must be a single ASCII character, got '{}'", d).into());
        }
        config.parser = ParserConfig::default().with_delimiter(d as u8);
    }

    let warnings = Arc::new(CollectingSink::new());
    let dict = DictionaryImporter::with_config(config)
        .with_sink(warnings.clone())
        .import(&file)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&dict)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Data dictionary".cyan().bold(),
        file.display().to_string().white()
    );
    println!();

    println!(
        "Fields: {}   Forms: {}",
        dict.len().to_string().white().bold(),
        dict.forms().len().to_string().white().bold()
    );
    if let Some(source) = &dict.source {
        println!(
            "Rows: {}   Skipped (no field name): {}",
            source.row_count,
            source.row_count.saturating_sub(dict.len())
        );
    }
    println!("Fingerprint: {}", dict.fingerprint()?.dimmed());
    println!();

    println!("{}", "By type:".yellow().bold());
    for field_type in FieldType::ALL {
        let count = dict.iter().filter(|f| f.field_type == field_type).count();
        if count > 0 {
            println!("  {:10} {}", field_type.as_str(), count);
        }
    }
    println!();

    println!("{}", "By form:".yellow().bold());
    for form in dict.forms() {
        let count = dict.iter().filter(|f| f.form_name == form).count();
        println!("  {:30} {}", form, count);
    }

    let duplicates = dict.duplicate_field_names();
    if !duplicates.is_empty() {
        println!();
        println!(
            "{} {}",
            "Duplicate field names:".red().bold(),
            duplicates.join(", ")
        );
    }

    if !warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in warnings.diagnostics() {
            println!("  {}", warning.to_string().yellow());
        }
    }

    Ok(())
}
