//! Compile a settings file into a command or batch script.

use std::path::{Path, PathBuf};

use wmforge_command_engine::{compile_output, Dialect, MediaNames, OutputTarget};
use wmforge_common::{AppConfig, WmforgeError, WmforgeResult};

use super::load_settings;

pub struct CompileArgs {
    pub dialect: Option<Dialect>,
    pub video: Option<String>,
    pub watermark: Option<String>,
    pub save: Option<PathBuf>,
}

pub fn run(config: &AppConfig, path: PathBuf, args: CompileArgs) -> anyhow::Result<()> {
    let raw = load_settings(&path)?;
    let issues = raw.validate();
    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "Settings normalized before compiling");
        for issue in &issues {
            tracing::warn!("{issue}");
        }
    }
    let settings = raw.sanitized();

    let dialect = match args.dialect {
        Some(dialect) => dialect,
        None => config
            .output
            .dialect
            .parse()
            .map_err(|e| WmforgeError::config(format!("output.dialect: {e}")))?,
    };
    let media = MediaNames {
        video: args.video.or_else(|| config.output.video_name.clone()),
        watermark: args
            .watermark
            .or_else(|| config.output.watermark_name.clone()),
    };

    let compiled = compile_output(&settings, &media, dialect);

    match args.save {
        Some(dir) => {
            let written = write_output(&dir, compiled.target, &compiled.text)?;
            println!("Wrote {}", written.display());
        }
        None => println!("{}", compiled.text),
    }

    Ok(())
}

fn write_output(dir: &Path, target: OutputTarget, text: &str) -> WmforgeResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(target.file_name());
    std::fs::write(&path, text)?;

    #[cfg(unix)]
    if target.is_executable() {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    }

    tracing::info!(path = %path.display(), bytes = text.len(), "Saved compiled output");
    Ok(path)
}
