//! Show settings and the compiled filter stages.

use std::path::PathBuf;

use wmforge_assistant::summarize_context;
use wmforge_command_engine::{build_filter_graph, AudioPolicy};

use super::load_settings;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let settings = load_settings(&path)?.sanitized();

    println!("Settings: {}", path.display());
    println!("  {}", summarize_context(&settings));
    println!();

    println!("Watermark:");
    println!("  Opacity: {}", settings.opacity);
    println!("  Position: {}x{}", settings.x, settings.y);
    println!("  Scale: {}", settings.scale);
    println!();

    println!("Timing:");
    match settings.trim_window() {
        (None, None) => println!("  Trim: full source"),
        (start, duration) => println!(
            "  Trim: from {}s, {}",
            start.unwrap_or(0.0),
            duration.map_or_else(|| "to the end".to_string(), |d| format!("{d}s"))
        ),
    }
    println!("  Speed: {}x", settings.video_speed);
    match AudioPolicy::for_settings(&settings) {
        AudioPolicy::CopyMapped if settings.changes_speed() => {
            println!("  Audio: copied unchanged (will drift out of sync)")
        }
        AudioPolicy::CopyMapped => println!("  Audio: copied unchanged"),
        AudioPolicy::Tempo(factor) => println!("  Audio: atempo {factor}"),
    }
    println!();

    println!("Framing:");
    println!("  Aspect ratio: {}", settings.aspect_ratio);
    println!("  Resolution: {}", settings.output_resolution);
    println!();

    let graph = build_filter_graph(&settings);
    println!("Filter stages ({}):", graph.len());
    for stage in graph.stages() {
        println!("  {:?}: {}", stage.kind, stage);
    }
    println!("  Mapped output: {}", graph.active_label());

    Ok(())
}
