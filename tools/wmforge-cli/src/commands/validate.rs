//! Report problems in a settings file.

use std::path::PathBuf;

use super::load_settings;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating settings at: {}", path.display());

    let settings = load_settings(&path)?;
    let issues = settings.validate();

    if issues.is_empty() {
        println!("\nSettings are valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for issue in &issues {
        println!("  - {issue}");
    }
    println!(
        "\n{} issue(s) found. They will be clamped or defaulted when compiling.",
        issues.len()
    );

    Ok(())
}
