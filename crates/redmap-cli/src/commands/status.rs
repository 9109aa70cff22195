//! Status command - show mapping progress of a template.

use std::path::PathBuf;

use colored::Colorize;
use redmap::Template;

pub fn run(template_path: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !template_path.exists() {
        return Err(format!(
            "Template not found: {}\nRun 'redmap init <DICTIONARY> --name <NAME>' first.",
            template_path.display()
        )
        .into());
    }

    let template = Template::load(&template_path)?;
    let summary = template.summary();

    if json_output {
        let status = serde_json::json!({
            "name": template.name,
            "version": template.version,
            "datadict_hash": template.datadict_hash,
            "summary": summary,
            "unmapped": template
                .unmapped_fields()
                .map(|f| f.field_name.as_str())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Template status for".cyan().bold(),
        template.name.white()
    );
    println!();

    let visible = summary.total - summary.hidden;
    let progress = if visible == 0 {
        1.0
    } else {
        summary.mapped as f64 / visible as f64
    };
    let bar_width = 30;
    let filled = (progress * bar_width as f64).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(bar_width - filled);

    println!(
        "Progress: {} {}/{} ({:.0}%)",
        bar.cyan(),
        summary.mapped.to_string().white().bold(),
        visible,
        progress * 100.0
    );
    println!();

    println!("{}", "Fields:".yellow().bold());
    println!("  Mapped:     {}", summary.mapped.to_string().green());
    println!("  Calculated: {}", summary.calculated.to_string().blue());
    println!("  Unmapped:   {}", summary.unmapped.to_string().red());
    println!("  Hidden:     {}", summary.hidden.to_string().white());
    println!();

    if summary.unmapped == 0 {
        println!("{}", "All visible fields are mapped!".green().bold());
    } else {
        let names: Vec<&str> = template
            .unmapped_fields()
            .map(|f| f.field_name.as_str())
            .take(10)
            .collect();
        println!("Unmapped: {}", names.join(", "));
        if summary.unmapped > names.len() {
            println!("  ... and {} more", summary.unmapped - names.len());
        }
    }

    Ok(())
}
