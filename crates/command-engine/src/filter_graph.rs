//! Filter graph construction.
//!
//! The graph is a straight chain: the watermark is prepared, composited onto
//! the base video, and the composite then runs through up to three optional
//! stages. Each stage consumes whatever label is currently active, so a
//! skipped stage can never be referenced downstream.

use std::fmt;

use wmforge_edit_model::EditSettings;

/// Name of a stream flowing between filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamLabel(&'static str);

impl StreamLabel {
    /// First input file (the source video).
    pub const SOURCE: StreamLabel = StreamLabel("0");
    /// Second input file (the watermark image).
    pub const WATERMARK_INPUT: StreamLabel = StreamLabel("1");
    pub const WATERMARK: StreamLabel = StreamLabel("wm");
    pub const COMPOSITE: StreamLabel = StreamLabel("base");
    pub const SPEEDED: StreamLabel = StreamLabel("speeded");
    pub const CROPPED: StreamLabel = StreamLabel("cropped");
    pub const SCALED: StreamLabel = StreamLabel("finalv");

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Role of a stage in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    WatermarkPrep,
    Overlay,
    Speed,
    Crop,
    OutputScale,
}

/// One filter in the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    pub kind: StageKind,
    pub inputs: Vec<StreamLabel>,
    pub expression: String,
    pub output: StreamLabel,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{input}")?;
        }
        write!(f, "{}{}", self.expression, self.output)
    }
}

/// Ordered, append-only chain of filter stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
    active: StreamLabel,
}

impl FilterGraph {
    fn starting_at(label: StreamLabel) -> Self {
        Self {
            stages: Vec::new(),
            active: label,
        }
    }

    /// Append a stage with explicit inputs; its output becomes active.
    fn push(
        &mut self,
        kind: StageKind,
        inputs: Vec<StreamLabel>,
        expression: String,
        output: StreamLabel,
    ) {
        self.stages.push(FilterStage {
            kind,
            inputs,
            expression,
            output,
        });
        self.active = output;
    }

    /// Append a stage fed by the active label.
    fn then(&mut self, kind: StageKind, expression: String, output: StreamLabel) {
        let input = self.active;
        self.push(kind, vec![input], expression, output);
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Label of the stream that leaves the chain (what `-map` must select).
    pub fn active_label(&self) -> StreamLabel {
        self.active
    }

    pub fn contains(&self, kind: StageKind) -> bool {
        self.stages.iter().any(|stage| stage.kind == kind)
    }

    /// The `-filter_complex` expression: stages joined with `;`.
    pub fn pipeline(&self) -> String {
        self.stages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Build the filter chain for the given settings.
pub fn build_filter_graph(settings: &EditSettings) -> FilterGraph {
    let mut graph = FilterGraph::starting_at(StreamLabel::WATERMARK_INPUT);

    let mut prep = format!(
        "format=rgba,colorchannelmixer=aa={}",
        format_number(settings.opacity)
    );
    if settings.scale != 1.0 {
        prep.push_str(&format!(",scale=iw*{}:-1", format_number(settings.scale)));
    }
    graph.then(StageKind::WatermarkPrep, prep, StreamLabel::WATERMARK);

    graph.push(
        StageKind::Overlay,
        vec![StreamLabel::SOURCE, StreamLabel::WATERMARK],
        format!("overlay={}:{}", settings.x, settings.y),
        StreamLabel::COMPOSITE,
    );

    if settings.changes_speed() {
        graph.then(
            StageKind::Speed,
            format!("setpts=PTS/{}", format_number(settings.video_speed)),
            StreamLabel::SPEEDED,
        );
    }

    if let Some(ratio) = settings.aspect_ratio.ratio_expr() {
        graph.then(StageKind::Crop, crop_expression(ratio), StreamLabel::CROPPED);
    }

    if let Some(height) = settings.output_resolution.height() {
        graph.then(
            StageKind::OutputScale,
            format!("scale=-1:{height}"),
            StreamLabel::SCALED,
        );
    }

    tracing::debug!(
        stages = graph.len(),
        active = graph.active_label().name(),
        "Built filter graph"
    );

    graph
}

/// Centered crop to the largest window of the given width/height ratio.
fn crop_expression(ratio: &str) -> String {
    // ffmpeg evaluates `/` left to right, so a fractional ratio must be
    // grouped before it is used as a divisor.
    let r = if ratio.contains('/') {
        format!("({ratio})")
    } else {
        ratio.to_string()
    };
    format!("crop='min(iw,ih*{r})':'min(ih,iw/{r})':'(iw-ow)/2':'(ih-oh)/2'")
}

/// Render a number the way the editor displays it: integral values without
/// a fractional part, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Collapses -0.0.
        return "0".to_string();
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmforge_edit_model::{AspectRatio, OutputResolution};

    #[test]
    fn test_default_graph_has_prep_and_overlay_only() {
        let graph = build_filter_graph(&EditSettings::default());
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph.pipeline(),
            "[1]format=rgba,colorchannelmixer=aa=0.8,scale=iw*0.5:-1[wm];[0][wm]overlay=50:50[base]"
        );
        assert_eq!(graph.active_label(), StreamLabel::COMPOSITE);
    }

    #[test]
    fn test_unit_scale_omits_resize_clause() {
        let settings = EditSettings {
            scale: 1.0,
            opacity: 1.0,
            ..EditSettings::default()
        };
        let graph = build_filter_graph(&settings);
        assert_eq!(
            graph.stages()[0].to_string(),
            "[1]format=rgba,colorchannelmixer=aa=1[wm]"
        );
    }

    #[test]
    fn test_negative_offsets_are_kept() {
        let settings = EditSettings {
            x: -40,
            y: -7,
            ..EditSettings::default()
        };
        let graph = build_filter_graph(&settings);
        assert_eq!(graph.stages()[1].expression, "overlay=-40:-7");
    }

    #[test]
    fn test_all_optional_stages_thread_labels() {
        let settings = EditSettings {
            video_speed: 2.0,
            aspect_ratio: AspectRatio::Portrait,
            output_resolution: OutputResolution::P720,
            ..EditSettings::default()
        };
        let graph = build_filter_graph(&settings);
        let rendered: Vec<String> = graph.stages().iter().map(ToString::to_string).collect();

        assert_eq!(rendered[2], "[base]setpts=PTS/2[speeded]");
        assert_eq!(
            rendered[3],
            "[speeded]crop='min(iw,ih*(9/16))':'min(ih,iw/(9/16))':'(iw-ow)/2':'(ih-oh)/2'[cropped]"
        );
        assert_eq!(rendered[4], "[cropped]scale=-1:720[finalv]");
        assert_eq!(graph.active_label(), StreamLabel::SCALED);
    }

    #[test]
    fn test_skipped_stage_is_never_referenced() {
        let settings = EditSettings {
            output_resolution: OutputResolution::P480,
            ..EditSettings::default()
        };
        let graph = build_filter_graph(&settings);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.stages()[2].inputs, vec![StreamLabel::COMPOSITE]);
        assert!(!graph.pipeline().contains("[speeded]"));
        assert!(!graph.pipeline().contains("[cropped]"));
    }

    #[test]
    fn test_square_crop_needs_no_grouping() {
        let settings = EditSettings {
            aspect_ratio: AspectRatio::Square,
            ..EditSettings::default()
        };
        let graph = build_filter_graph(&settings);
        assert_eq!(
            graph.stages()[2].expression,
            "crop='min(iw,ih*1)':'min(ih,iw/1)':'(iw-ow)/2':'(ih-oh)/2'"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(10.0), "10");
    }
}
