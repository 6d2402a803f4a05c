//! Invocation template assembly.
//!
//! Produces the ffmpeg command line with the input and output file left as
//! placeholders. Argument order is fixed:
//!
//! ```text
//! ffmpeg [-ss S] [-t D] -i "<input>" -i "<watermark>" -filter_complex "<graph>"
//!        -map "<label>" [-map 0:a] <audio options> "<output>"
//! ```

use wmforge_edit_model::{AudioMode, EditSettings};

use crate::filter_graph::{format_number, FilterGraph};

/// Placeholder shown for the input file in [`InvocationTemplate::text`].
pub const INPUT_TOKEN: &str = "%INPUT%";
/// Placeholder shown for the output file in [`InvocationTemplate::text`].
pub const OUTPUT_TOKEN: &str = "%OUTPUT%";

const FFMPEG: &str = "ffmpeg";

/// How the source audio track is carried into the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioPolicy {
    /// `-map 0:a -c:a copy`. At a changed speed the audio keeps its original
    /// pace and drifts out of sync with the picture.
    CopyMapped,
    /// `-filter:a "atempo=<factor>"`; the filter binds the audio stream, so
    /// no explicit audio map is emitted.
    Tempo(f64),
}

impl AudioPolicy {
    pub fn for_settings(settings: &EditSettings) -> Self {
        match (settings.changes_speed(), settings.audio_mode) {
            (true, AudioMode::Sync) => AudioPolicy::Tempo(settings.video_speed),
            (true, AudioMode::Original) | (false, _) => AudioPolicy::CopyMapped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Fixed command syntax.
    Syntax(String),
    /// Text derived from the configuration; dialects may escape it.
    Value(String),
    Input,
    Output,
}

/// A flat command line with exactly one input and one output placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationTemplate {
    segments: Vec<Segment>,
}

impl InvocationTemplate {
    /// The template with [`INPUT_TOKEN`] and [`OUTPUT_TOKEN`] unresolved.
    pub fn text(&self) -> String {
        self.render(|value| value.to_string(), INPUT_TOKEN, OUTPUT_TOKEN)
    }

    /// Resolve both placeholders verbatim.
    pub fn substitute(&self, input: &str, output: &str) -> String {
        self.render(|value| value.to_string(), input, output)
    }

    /// Resolve both placeholders, passing configuration-derived text through
    /// `escape` first. The placeholder replacements are inserted as given.
    pub fn render<F>(&self, escape: F, input: &str, output: &str) -> String
    where
        F: Fn(&str) -> String,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Syntax(text) => out.push_str(text),
                Segment::Value(text) => out.push_str(&escape(text)),
                Segment::Input => out.push_str(input),
                Segment::Output => out.push_str(output),
            }
        }
        out
    }
}

/// Accumulates space-separated arguments.
struct TemplateBuilder {
    segments: Vec<Segment>,
}

impl TemplateBuilder {
    fn new(program: &str) -> Self {
        Self {
            segments: vec![Segment::Syntax(program.to_string())],
        }
    }

    fn arg(&mut self, flag: &str) -> &mut Self {
        self.segments.push(Segment::Syntax(format!(" {flag}")));
        self
    }

    fn value(&mut self, value: String) -> &mut Self {
        self.segments.push(Segment::Syntax(" ".to_string()));
        self.segments.push(Segment::Value(value));
        self
    }

    fn quoted(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(Segment::Syntax(" \"".to_string()));
        self.segments.push(segment);
        self.segments.push(Segment::Syntax("\"".to_string()));
        self
    }

    fn quoted_value(&mut self, value: String) -> &mut Self {
        self.quoted(Segment::Value(value))
    }

    fn finish(self) -> InvocationTemplate {
        InvocationTemplate {
            segments: self.segments,
        }
    }
}

/// Assemble the ffmpeg invocation for `settings` around a compiled graph.
pub fn assemble_command(
    settings: &EditSettings,
    graph: &FilterGraph,
    watermark: &str,
) -> InvocationTemplate {
    let mut cmd = TemplateBuilder::new(FFMPEG);

    let (start, duration) = settings.trim_window();
    if let Some(start) = start {
        cmd.arg("-ss").value(format_number(start));
    }
    if let Some(duration) = duration {
        cmd.arg("-t").value(format_number(duration));
    }

    cmd.arg("-i").quoted(Segment::Input);
    cmd.arg("-i").quoted_value(watermark.to_string());
    cmd.arg("-filter_complex").quoted_value(graph.pipeline());
    cmd.arg("-map")
        .quoted_value(graph.active_label().to_string());

    match AudioPolicy::for_settings(settings) {
        AudioPolicy::CopyMapped => {
            cmd.arg("-map").arg("0:a").arg("-c:a").arg("copy");
        }
        AudioPolicy::Tempo(factor) => {
            cmd.arg("-filter:a")
                .quoted_value(format!("atempo={}", format_number(factor)));
        }
    }

    cmd.quoted(Segment::Output);
    cmd.finish()
}
