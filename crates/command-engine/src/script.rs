//! Rendering invocation templates into runnable text.
//!
//! Single-file mode yields one command line. Batch mode yields a folder
//! script in one of two dialects, each implemented as a [`ScriptDialect`]
//! strategy that renders the same four sections: directory setup, loop
//! header, per-file body, footer.

use std::fmt;
use std::str::FromStr;

use wmforge_edit_model::EditSettings;

use crate::command::InvocationTemplate;

pub const DEFAULT_VIDEO_NAME: &str = "input.mp4";
pub const DEFAULT_OUTPUT_NAME: &str = "output.mp4";

const INDENT: &str = "    ";

/// Batch script flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Windows `cmd.exe` batch file.
    #[default]
    Windows,
    /// POSIX shell script (bash).
    Posix,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown script dialect '{0}' (expected: windows, posix)")]
pub struct ParseDialectError(pub String);

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Windows => "windows",
            Dialect::Posix => "posix",
        }
    }

    pub fn strategy(&self) -> &'static dyn ScriptDialect {
        match self {
            Dialect::Windows => &WindowsBatch,
            Dialect::Posix => &PosixShell,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ParseDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "bat" | "cmd" => Ok(Dialect::Windows),
            "posix" | "bash" | "sh" => Ok(Dialect::Posix),
            _ => Err(ParseDialectError(s.to_string())),
        }
    }
}

/// Where compiled text is meant to be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    SingleCommand,
    BatchScript(Dialect),
}

impl OutputTarget {
    pub fn for_settings(settings: &EditSettings, dialect: Dialect) -> Self {
        if settings.is_batch_mode {
            OutputTarget::BatchScript(dialect)
        } else {
            OutputTarget::SingleCommand
        }
    }

    /// Suggested download file name.
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputTarget::SingleCommand => "ffmpeg_command.txt",
            OutputTarget::BatchScript(Dialect::Windows) => "process_videos.bat",
            OutputTarget::BatchScript(Dialect::Posix) => "process_videos.sh",
        }
    }

    /// Whether the saved file needs the executable bit.
    pub fn is_executable(&self) -> bool {
        matches!(self, OutputTarget::BatchScript(Dialect::Posix))
    }
}

/// Folder-level values shared by every section of a batch script, already
/// escaped for the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    pub input_dir: String,
    pub output_dir: String,
    pub extension: String,
}

impl BatchLayout {
    pub fn new(dialect: &dyn ScriptDialect, settings: &EditSettings) -> Self {
        let output_dir = dialect.join(&settings.input_path, &settings.output_path);
        Self {
            input_dir: dialect.escape_literal(&settings.input_path),
            output_dir: dialect.escape_literal(&output_dir),
            extension: dialect.escape_literal(&settings.file_extension),
        }
    }
}

/// One scripting convention for batch output.
pub trait ScriptDialect: Sync {
    fn name(&self) -> &'static str;

    /// Join a directory and a relative child with this dialect's separator.
    fn join(&self, base: &str, child: &str) -> String;

    /// Make configuration text safe inside a double-quoted string.
    fn escape_literal(&self, text: &str) -> String;

    /// Interpreter preamble and output folder creation.
    fn directory_setup(&self, layout: &BatchLayout) -> Vec<String>;

    fn loop_header(&self, layout: &BatchLayout) -> Vec<String>;

    /// Loop body: per-file progress and the resolved invocation.
    fn per_file(&self, template: &InvocationTemplate, layout: &BatchLayout) -> Vec<String>;

    fn footer(&self, layout: &BatchLayout) -> Vec<String>;
}

/// Windows batch (`.bat`) output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBatch;

/// POSIX shell (`.sh`) output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixShell;

impl ScriptDialect for WindowsBatch {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn join(&self, base: &str, child: &str) -> String {
        join_with('\\', &['\\', '/'], base, child)
    }

    fn escape_literal(&self, text: &str) -> String {
        text.replace('%', "%%")
    }

    fn directory_setup(&self, layout: &BatchLayout) -> Vec<String> {
        vec![
            "@echo off".to_string(),
            format!(
                "if not exist \"{out}\" mkdir \"{out}\"",
                out = layout.output_dir
            ),
            format!("echo Processing {} files...", layout.extension),
        ]
    }

    fn loop_header(&self, layout: &BatchLayout) -> Vec<String> {
        let glob = self.join(&layout.input_dir, &format!("*.{}", layout.extension));
        vec![format!("for %%f in (\"{glob}\") do (")]
    }

    fn per_file(&self, template: &InvocationTemplate, layout: &BatchLayout) -> Vec<String> {
        // %%~nf expands to the loop file name without its extension.
        let output = self.join(&layout.output_dir, &format!("%%~nf.{}", layout.extension));
        let command = template.render(|value| self.escape_literal(value), "%%f", &output);
        vec![
            format!("{INDENT}echo Processing: %%f"),
            format!("{INDENT}{command}"),
        ]
    }

    fn footer(&self, _layout: &BatchLayout) -> Vec<String> {
        vec![")".to_string(), "echo Done!".to_string(), "pause".to_string()]
    }
}

impl ScriptDialect for PosixShell {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn join(&self, base: &str, child: &str) -> String {
        join_with('/', &['/'], base, child)
    }

    fn escape_literal(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '\\' | '"' | '$' | '`') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    fn directory_setup(&self, layout: &BatchLayout) -> Vec<String> {
        vec![
            "#!/bin/bash".to_string(),
            format!("mkdir -p \"{}\"", layout.output_dir),
            format!("echo \"Processing {} files...\"", layout.extension),
        ]
    }

    fn loop_header(&self, layout: &BatchLayout) -> Vec<String> {
        let glob = format!("*.{}", layout.extension);
        // The glob must stay outside the quotes to expand.
        let line = if layout.input_dir.is_empty() {
            format!("for f in {glob}; do")
        } else {
            let dir = layout.input_dir.trim_end_matches('/');
            format!("for f in \"{dir}\"/{glob}; do")
        };
        vec![line]
    }

    fn per_file(&self, template: &InvocationTemplate, layout: &BatchLayout) -> Vec<String> {
        let output = self.join(&layout.output_dir, &format!("$base.{}", layout.extension));
        let command = template.render(|value| self.escape_literal(value), "$f", &output);
        vec![
            // An unmatched glob stays literal; skip it.
            format!("{INDENT}[ -e \"$f\" ] || continue"),
            format!("{INDENT}filename=$(basename -- \"$f\")"),
            format!("{INDENT}base=\"${{filename%.*}}\""),
            format!("{INDENT}echo \"Processing: $f\""),
            format!("{INDENT}{command}"),
        ]
    }

    fn footer(&self, _layout: &BatchLayout) -> Vec<String> {
        vec!["done".to_string(), "echo \"Done!\"".to_string()]
    }
}

fn join_with(sep: char, trim: &[char], base: &str, child: &str) -> String {
    let child = child.trim_start_matches(trim);
    if base.is_empty() {
        return child.to_string();
    }
    let head = base.trim_end_matches(trim);
    format!("{head}{sep}{child}")
}

/// Resolve the template into one command line for a single source file.
pub fn render_single_command(template: &InvocationTemplate, video_name: Option<&str>) -> String {
    let input = video_name
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_VIDEO_NAME);
    template.substitute(input, DEFAULT_OUTPUT_NAME)
}

/// Render a folder script in the given dialect. Lines are joined with `\n`
/// and the script has no trailing newline.
pub fn render_batch_script(
    template: &InvocationTemplate,
    settings: &EditSettings,
    dialect: &dyn ScriptDialect,
) -> String {
    let layout = BatchLayout::new(dialect, settings);

    let mut lines = dialect.directory_setup(&layout);
    lines.extend(dialect.loop_header(&layout));
    lines.extend(dialect.per_file(template, &layout));
    lines.extend(dialect.footer(&layout));

    tracing::debug!(
        dialect = dialect.name(),
        lines = lines.len(),
        "Rendered batch script"
    );

    lines.join("\n")
}
