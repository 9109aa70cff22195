//! Init command - create an empty mapping template from a dictionary.

use std::path::PathBuf;

use colored::Colorize;
use redmap::template::template_path;
use redmap::{DataDictionary, Template};

pub fn run(
    file: PathBuf,
    name: String,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let dict = DataDictionary::from_path(&file)?;
    let template = Template::from_dictionary(&dict, name)?;

    let output_path = output.unwrap_or_else(|| template_path(&file));
    template.save(&output_path)?;

    println!(
        "{} {} ({} fields)",
        "Created template".green().bold(),
        output_path.display().to_string().white(),
        template.len()
    );
    println!(
        "Edit the sources, then run {} to track progress.",
        format!("redmap status {}", output_path.display()).cyan().bold()
    );

    Ok(())
}
