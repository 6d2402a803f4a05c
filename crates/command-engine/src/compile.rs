//! Settings-to-text entry point.

use wmforge_edit_model::EditSettings;

use crate::command::{assemble_command, InvocationTemplate};
use crate::filter_graph::{build_filter_graph, FilterGraph};
use crate::script::{render_batch_script, render_single_command, Dialect, OutputTarget};

pub const DEFAULT_WATERMARK_NAME: &str = "watermark.png";

/// Display names of the media files the user picked, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaNames {
    /// Source video (single-file mode only).
    pub video: Option<String>,
    /// Watermark image (every mode).
    pub watermark: Option<String>,
}

impl MediaNames {
    pub fn watermark_or_default(&self) -> &str {
        self.watermark
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_WATERMARK_NAME)
    }
}

/// Every intermediate of one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOutput {
    pub graph: FilterGraph,
    pub template: InvocationTemplate,
    pub target: OutputTarget,
    pub text: String,
}

/// Compile settings and keep the intermediates.
///
/// `dialect` only matters in batch mode.
pub fn compile_output(
    settings: &EditSettings,
    media: &MediaNames,
    dialect: Dialect,
) -> CompiledOutput {
    let graph = build_filter_graph(settings);
    let template = assemble_command(settings, &graph, media.watermark_or_default());
    let target = OutputTarget::for_settings(settings, dialect);

    let text = match target {
        OutputTarget::SingleCommand => render_single_command(&template, media.video.as_deref()),
        OutputTarget::BatchScript(dialect) => {
            render_batch_script(&template, settings, dialect.strategy())
        }
    };

    tracing::debug!(
        output = target.file_name(),
        stages = graph.len(),
        bytes = text.len(),
        "Compiled edit settings"
    );

    CompiledOutput {
        graph,
        template,
        target,
        text,
    }
}

/// Compile settings straight to the text shown to the user.
pub fn compile(settings: &EditSettings, media: &MediaNames, dialect: Dialect) -> String {
    compile_output(settings, media, dialect).text
}
