//! Check command - compare a template's fingerprint with a dictionary.

use std::path::PathBuf;

use colored::Colorize;
use redmap::{DataDictionary, DictionaryDrift, Template};

pub fn run(template: PathBuf, dictionary: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = Template::load(&template)?;
    let dict = DataDictionary::from_path(&dictionary)?;

    match loaded.dictionary_drift(&dict)? {
        DictionaryDrift::Match => {
            println!(
                "{} {} matches {}",
                "OK".green().bold(),
                template.display(),
                dictionary.display()
            );
            Ok(())
        }
        DictionaryDrift::Unknown => {
            println!(
                "{} {} has no dictionary fingerprint",
                "?".yellow().bold(),
                template.display()
            );
            Ok(())
        }
        DictionaryDrift::Mismatch => {
            let missing: Vec<&str> = loaded
                .fields
                .iter()
                .map(|f| f.field_name.as_str())
                .filter(|name| dict.field(name).is_none())
                .collect();
            let added: Vec<&str> = dict
                .field_names()
                .filter(|name| loaded.field(name).is_none())
                .collect();

            if !missing.is_empty() {
                println!("  {} {}", "Not in dictionary:".red(), missing.join(", "));
            }
            if !added.is_empty() {
                println!("  {} {}", "Not in template:".yellow(), added.join(", "));
            }

            Err(format!(
                "{} was built from a different version of {}",
                template.display(),
                dictionary.display()
            )
            .into())
        }
    }
}
