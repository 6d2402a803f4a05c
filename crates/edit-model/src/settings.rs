//! The edit configuration consumed by the command compiler.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wmforge_common::WmforgeError;

use crate::options::{AspectRatio, AudioMode, OutputResolution};

/// Speed range offered by the editor controls.
pub const SPEED_RANGE: RangeInclusive<f64> = 0.25..=4.0;

/// Watermark scale range offered by the editor controls.
pub const SCALE_RANGE: RangeInclusive<f64> = 0.1..=2.0;

pub const DEFAULT_EXTENSION: &str = "mp4";
pub const DEFAULT_INPUT_DIR: &str = ".";
pub const DEFAULT_OUTPUT_DIR: &str = "processed";

/// Full edit configuration (`settings.json`).
///
/// Field names follow the editor's camelCase wire format. Missing fields
/// take their defaults, so partial files are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditSettings {
    /// Watermark opacity in `[0.0, 1.0]`.
    pub opacity: f64,

    /// Watermark offset from the top-left corner (pixels, may be negative).
    pub x: i64,
    pub y: i64,

    /// Watermark scale relative to its native size (1.0 = unchanged).
    pub scale: f64,

    /// Trim window in seconds. `end_time <= start_time` means "to the end".
    pub start_time: f64,
    pub end_time: f64,

    /// Playback speed multiplier (1.0 = unchanged).
    pub video_speed: f64,

    pub audio_mode: AudioMode,
    pub aspect_ratio: AspectRatio,
    pub output_resolution: OutputResolution,

    /// Emit a folder script instead of a single command.
    pub is_batch_mode: bool,

    /// Folder scanned in batch mode.
    pub input_path: String,

    /// Output folder, relative to `input_path`.
    pub output_path: String,

    /// Extension without the leading dot; used as glob filter and output suffix.
    pub file_extension: String,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            x: 50,
            y: 50,
            scale: 0.5,
            start_time: 0.0,
            end_time: 0.0,
            video_speed: 1.0,
            audio_mode: AudioMode::Original,
            aspect_ratio: AspectRatio::Original,
            output_resolution: OutputResolution::Original,
            is_batch_mode: false,
            input_path: DEFAULT_INPUT_DIR.to_string(),
            output_path: DEFAULT_OUTPUT_DIR.to_string(),
            file_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl EditSettings {
    /// Trim window length: `max(0, end - start)`.
    pub fn effective_duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Seek offset and clip length, each `None` when the flag is omitted.
    pub fn trim_window(&self) -> (Option<f64>, Option<f64>) {
        let start = (self.start_time > 0.0).then_some(self.start_time);
        let duration = Some(self.effective_duration()).filter(|d| *d > 0.0);
        (start, duration)
    }

    /// Whether the speed stage applies.
    pub fn changes_speed(&self) -> bool {
        self.video_speed != 1.0
    }

    /// Clamp and default every field into the range the compiler expects.
    ///
    /// This is the configuration boundary: the compiler never rejects a
    /// value, so anything the editor could not have produced is normalized
    /// here instead.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();

        out.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        out.scale = positive_or_one(self.scale);
        out.video_speed = positive_or_one(self.video_speed);
        out.start_time = non_negative(self.start_time);
        out.end_time = non_negative(self.end_time);

        out.file_extension = normalize_extension(&self.file_extension);
        out.input_path = non_empty_or(&self.input_path, DEFAULT_INPUT_DIR);
        out.output_path = non_empty_or(&self.output_path, DEFAULT_OUTPUT_DIR);

        out
    }

    /// Human-readable issues found in the raw settings.
    ///
    /// An empty list means [`EditSettings::sanitized`] would leave the
    /// numeric fields untouched.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];

        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            issues.push(format!("opacity {} is outside [0, 1]", self.opacity));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            issues.push(format!("scale must be positive (got {})", self.scale));
        } else if !SCALE_RANGE.contains(&self.scale) {
            issues.push(format!(
                "scale {} is outside the editor range {}-{}",
                self.scale,
                SCALE_RANGE.start(),
                SCALE_RANGE.end()
            ));
        }
        if !self.video_speed.is_finite() || self.video_speed <= 0.0 {
            issues.push(format!(
                "videoSpeed must be positive (got {})",
                self.video_speed
            ));
        } else if !SPEED_RANGE.contains(&self.video_speed) {
            issues.push(format!(
                "videoSpeed {} is outside the editor range {}-{}",
                self.video_speed,
                SPEED_RANGE.start(),
                SPEED_RANGE.end()
            ));
        }
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            issues.push(format!("startTime {} is negative", self.start_time));
        }
        if !self.end_time.is_finite() || self.end_time < 0.0 {
            issues.push(format!("endTime {} is negative", self.end_time));
        }
        if self.end_time > 0.0 && self.end_time <= self.start_time {
            issues.push(format!(
                "endTime {} is not after startTime {}; the source will be read to its end",
                self.end_time, self.start_time
            ));
        }

        let ext = self.file_extension.trim();
        if ext.is_empty() {
            issues.push("fileExtension is empty".to_string());
        } else if ext.starts_with('.') {
            issues.push(format!(
                "fileExtension '{}' should not include the leading dot",
                self.file_extension
            ));
        }
        if ext.chars().any(|c| !is_extension_char(c)) {
            issues.push(format!(
                "fileExtension '{}' contains characters other than letters, digits, '.', '_' and '-'",
                self.file_extension
            ));
        }

        if self.is_batch_mode {
            if self.input_path.trim().is_empty() {
                issues.push("inputPath is empty".to_string());
            }
            if self.output_path.trim().is_empty() {
                issues.push("outputPath is empty".to_string());
            }
        }

        issues
    }

    /// Reset the trim window and speed after a new source video is chosen.
    pub fn reset_for_new_source(&mut self) {
        self.start_time = 0.0;
        self.end_time = 0.0;
        self.video_speed = 1.0;
    }

    /// Extend the trim window to the full length reported by the source.
    pub fn apply_media_duration(&mut self, duration_secs: f64) {
        if duration_secs.is_finite() && duration_secs > 0.0 {
            self.end_time = duration_secs;
        } else {
            tracing::debug!(duration_secs, "Ignoring unusable media duration");
        }
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when reading or writing settings files.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<SettingsError> for WmforgeError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::IoError { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                WmforgeError::FileNotFound { path }
            }
            other => WmforgeError::settings(other.to_string()),
        }
    }
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Characters allowed in an extension. It is spliced unquoted into globs and
/// echo lines, so anything a shell would interpret is dropped.
fn is_extension_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn normalize_extension(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| is_extension_char(*c)).collect();
    let ext = kept.trim_start_matches('.');
    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_editor() {
        let s = EditSettings::default();
        assert!((s.opacity - 0.8).abs() < 1e-9);
        assert_eq!((s.x, s.y), (50, 50));
        assert!((s.scale - 0.5).abs() < 1e-9);
        assert_eq!(s.video_speed, 1.0);
        assert_eq!(s.audio_mode, AudioMode::Original);
        assert!(!s.is_batch_mode);
        assert_eq!(s.input_path, ".");
        assert_eq!(s.output_path, "processed");
        assert_eq!(s.file_extension, "mp4");
    }

    #[test]
    fn test_effective_duration_floors_at_zero() {
        let mut s = EditSettings::default();
        s.start_time = 5.0;
        s.end_time = 15.0;
        assert_eq!(s.effective_duration(), 10.0);
        s.end_time = 3.0;
        assert_eq!(s.effective_duration(), 0.0);
    }

    #[test]
    fn test_trim_window() {
        let mut s = EditSettings::default();
        assert_eq!(s.trim_window(), (None, None));

        s.start_time = 5.0;
        s.end_time = 15.0;
        assert_eq!(s.trim_window(), (Some(5.0), Some(10.0)));

        s.end_time = 0.0;
        assert_eq!(s.trim_window(), (Some(5.0), None));
    }

    #[test]
    fn test_sanitized_clamps_and_defaults() {
        let s = EditSettings {
            opacity: 1.7,
            scale: 0.0,
            video_speed: f64::NAN,
            start_time: -2.0,
            end_time: f64::INFINITY,
            file_extension: " ..MOV ".to_string(),
            output_path: "  ".to_string(),
            input_path: String::new(),
            ..EditSettings::default()
        };
        let clean = s.sanitized();
        assert_eq!(clean.opacity, 1.0);
        assert_eq!(clean.scale, 1.0);
        assert_eq!(clean.video_speed, 1.0);
        assert_eq!(clean.start_time, 0.0);
        assert_eq!(clean.end_time, 0.0);
        assert_eq!(clean.file_extension, "MOV");
        assert_eq!(clean.output_path, "processed");
        assert_eq!(clean.input_path, ".");
    }

    #[test]
    fn test_sanitized_keeps_path_text_verbatim() {
        let s = EditSettings {
            input_path: "/srv/My Clips ".to_string(),
            output_path: " done".to_string(),
            ..EditSettings::default()
        };
        let clean = s.sanitized();
        assert_eq!(clean.input_path, "/srv/My Clips ");
        assert_eq!(clean.output_path, " done");
    }

    #[test]
    fn test_sanitized_drops_shell_characters_from_extension() {
        let s = EditSettings {
            file_extension: "mp4 & rm".to_string(),
            ..EditSettings::default()
        };
        assert_eq!(s.sanitized().file_extension, "mp4rm");
        assert!(s.validate().iter().any(|i| i.contains("contains characters")));

        let s = EditSettings {
            file_extension: ">;|".to_string(),
            ..EditSettings::default()
        };
        assert_eq!(s.sanitized().file_extension, "mp4");

        let s = EditSettings {
            file_extension: "tar.gz".to_string(),
            ..EditSettings::default()
        };
        assert_eq!(s.sanitized().file_extension, "tar.gz");
        assert!(s.validate().is_empty());
    }

    #[test]
    fn test_settings_error_maps_into_shared_error() {
        let missing = EditSettings::load("/nonexistent/wmforge/edit.json").unwrap_err();
        assert!(matches!(
            WmforgeError::from(missing),
            WmforgeError::FileNotFound { .. }
        ));

        let dir = std::env::temp_dir().join(format!("wmforge-settings-err-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let broken = EditSettings::load(&path).unwrap_err();
        let err = WmforgeError::from(broken);
        assert!(matches!(err, WmforgeError::Settings { .. }));
        assert!(err.to_string().contains("broken.json"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let s = EditSettings {
            opacity: 0.35,
            x: -20,
            video_speed: 2.0,
            ..EditSettings::default()
        };
        assert_eq!(s.sanitized(), s);
    }

    #[test]
    fn test_validate_reports_problems() {
        let s = EditSettings {
            opacity: -0.1,
            video_speed: 0.0,
            start_time: 10.0,
            end_time: 4.0,
            file_extension: ".mp4".to_string(),
            ..EditSettings::default()
        };
        let issues = s.validate();
        assert!(issues.iter().any(|i| i.contains("opacity")));
        assert!(issues.iter().any(|i| i.contains("videoSpeed must be positive")));
        assert!(issues.iter().any(|i| i.contains("read to its end")));
        assert!(issues.iter().any(|i| i.contains("leading dot")));
        assert!(EditSettings::default().validate().is_empty());
    }

    #[test]
    fn test_source_change_helpers() {
        let mut s = EditSettings {
            start_time: 3.0,
            end_time: 9.0,
            video_speed: 2.0,
            ..EditSettings::default()
        };
        s.reset_for_new_source();
        assert_eq!((s.start_time, s.end_time, s.video_speed), (0.0, 0.0, 1.0));

        s.apply_media_duration(42.5);
        assert_eq!(s.end_time, 42.5);
        s.apply_media_duration(f64::NAN);
        assert_eq!(s.end_time, 42.5);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(EditSettings::default()).unwrap();
        assert_eq!(json["videoSpeed"], 1.0);
        assert_eq!(json["aspectRatio"], "original");
        assert_eq!(json["isBatchMode"], false);
        assert_eq!(json["fileExtension"], "mp4");
    }

    #[test]
    fn test_partial_file_uses_defaults_and_unknown_options_fail_open() {
        let parsed: EditSettings = serde_json::from_str(
            r#"{"videoSpeed": 2, "aspectRatio": "21:9", "outputResolution": "720p"}"#,
        )
        .unwrap();
        assert_eq!(parsed.video_speed, 2.0);
        assert_eq!(parsed.aspect_ratio, AspectRatio::Original);
        assert_eq!(parsed.output_resolution, OutputResolution::P720);
        assert_eq!(parsed.file_extension, "mp4");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("wmforge_test_settings");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("settings.json");

        let settings = EditSettings {
            is_batch_mode: true,
            file_extension: "mov".to_string(),
            ..EditSettings::default()
        };
        settings.save(&path).unwrap();
        let loaded = EditSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = EditSettings::load("/nonexistent/wmforge/settings.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/wmforge/settings.json"));
    }
}
