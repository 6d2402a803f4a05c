//! Create a settings file with editor defaults.

use std::path::PathBuf;

use wmforge_common::WmforgeError;
use wmforge_edit_model::EditSettings;

pub fn run(path: PathBuf, batch: bool, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let settings = EditSettings {
        is_batch_mode: batch,
        ..EditSettings::default()
    };
    settings.save(&path).map_err(WmforgeError::from)?;

    println!("Settings written to {}", path.display());
    println!(
        "  Mode: {}",
        if batch { "batch" } else { "single file" }
    );
    println!(
        "  Watermark: opacity {}, position {}x{}, scale {}",
        settings.opacity, settings.x, settings.y, settings.scale
    );
    if batch {
        println!(
            "  Files: {}/*.{} -> {}/",
            settings.input_path, settings.file_extension, settings.output_path
        );
    }

    Ok(())
}
