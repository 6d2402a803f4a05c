//! One-line settings summary sent along with every question.

use wmforge_edit_model::EditSettings;

/// Describe the current settings for the assistant.
///
/// Deliberately coarse: mode, extension, speed and resolution. The compiled
/// command itself is not sent.
pub fn summarize_context(settings: &EditSettings) -> String {
    let mode = if settings.is_batch_mode {
        "Batch Mode"
    } else {
        "Single Mode"
    };
    format!(
        "[{mode}] Processing {} files. Speed: {}x. Resolution: {}.",
        settings.file_extension, settings.video_speed, settings.output_resolution
    )
}
