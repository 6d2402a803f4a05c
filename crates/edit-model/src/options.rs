//! Enumerated edit options.
//!
//! Every option has a strict parser ([`std::str::FromStr`]) for command-line
//! input and a lenient one (`parse_lenient`) used when deserializing settings.
//! The lenient path maps unknown values to the `Original` variant so a stale
//! or hand-edited settings file still compiles to a command with that stage
//! omitted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned by the strict option parsers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// How audio is treated when the video speed changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMode {
    /// Keep the source audio untouched.
    #[default]
    Original,
    /// Retime audio to follow the video speed.
    Sync,
}

/// Target frame shape for the centered crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    Original,
    /// 16:9 landscape.
    Widescreen,
    /// 9:16 vertical.
    Portrait,
    /// 1:1.
    Square,
    /// 4:3.
    Classic,
}

/// Output frame height preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputResolution {
    #[default]
    Original,
    P1080,
    P720,
    P480,
}

impl AudioMode {
    pub const ALL: [AudioMode; 2] = [AudioMode::Original, AudioMode::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioMode::Original => "original",
            AudioMode::Sync => "sync",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|e: ParseOptionError| {
            tracing::warn!(error = %e, "Falling back to original audio mode");
            AudioMode::Original
        })
    }
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Original,
        AspectRatio::Widescreen,
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Classic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Original => "original",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Classic => "4:3",
        }
    }

    /// Width/height ratio as an ffmpeg expression, `None` for the source frame.
    pub fn ratio_expr(&self) -> Option<&'static str> {
        match self {
            AspectRatio::Original => None,
            AspectRatio::Widescreen => Some("16/9"),
            AspectRatio::Portrait => Some("9/16"),
            AspectRatio::Square => Some("1"),
            AspectRatio::Classic => Some("4/3"),
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|e: ParseOptionError| {
            tracing::warn!(error = %e, "Falling back to original aspect ratio");
            AspectRatio::Original
        })
    }
}

impl OutputResolution {
    pub const ALL: [OutputResolution; 4] = [
        OutputResolution::Original,
        OutputResolution::P1080,
        OutputResolution::P720,
        OutputResolution::P480,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputResolution::Original => "original",
            OutputResolution::P1080 => "1080p",
            OutputResolution::P720 => "720p",
            OutputResolution::P480 => "480p",
        }
    }

    /// Forced output height in pixels, `None` to keep the source size.
    pub fn height(&self) -> Option<u32> {
        match self {
            OutputResolution::Original => None,
            OutputResolution::P1080 => Some(1080),
            OutputResolution::P720 => Some(720),
            OutputResolution::P480 => Some(480),
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|e: ParseOptionError| {
            tracing::warn!(error = %e, "Falling back to original output resolution");
            OutputResolution::Original
        })
    }
}

impl FromStr for AudioMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseOptionError {
                kind: "audio mode",
                value: s.to_string(),
                expected: "original, sync",
            })
    }
}

impl FromStr for AspectRatio {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| ParseOptionError {
                kind: "aspect ratio",
                value: s.to_string(),
                expected: "original, 16:9, 9:16, 1:1, 4:3",
            })
    }
}

impl FromStr for OutputResolution {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|res| res.as_str() == s)
            .ok_or_else(|| ParseOptionError {
                kind: "output resolution",
                value: s.to_string(),
                expected: "original, 1080p, 720p, 480p",
            })
    }
}

// Serialized as their display strings; deserialized leniently.
macro_rules! string_option_serde {
    ($($ty:ty),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(<$ty>::parse_lenient(&raw))
            }
        }
    )*};
}

string_option_serde!(AudioMode, AspectRatio, OutputResolution);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_roundtrips_display_strings() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
        }
        for res in OutputResolution::ALL {
            assert_eq!(res.as_str().parse::<OutputResolution>().unwrap(), res);
        }
        for mode in AudioMode::ALL {
            assert_eq!(mode.as_str().parse::<AudioMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        let err = "21:9".parse::<AspectRatio>().unwrap_err();
        assert_eq!(err.kind, "aspect ratio");
        assert!(err.to_string().contains("21:9"));
        assert!("4k".parse::<OutputResolution>().is_err());
        assert!("Sync".parse::<AudioMode>().is_err());
    }

    #[test]
    fn test_lenient_parse_falls_back_to_original() {
        assert_eq!(AspectRatio::parse_lenient("21:9"), AspectRatio::Original);
        assert_eq!(OutputResolution::parse_lenient("4k"), OutputResolution::Original);
        assert_eq!(AudioMode::parse_lenient(""), AudioMode::Original);
        assert_eq!(AspectRatio::parse_lenient("9:16"), AspectRatio::Portrait);
    }

    #[test]
    fn test_serde_uses_display_strings() {
        let json = serde_json::to_string(&AspectRatio::Widescreen).unwrap();
        assert_eq!(json, "\"16:9\"");
        let parsed: OutputResolution = serde_json::from_str("\"720p\"").unwrap();
        assert_eq!(parsed, OutputResolution::P720);
        let unknown: AspectRatio = serde_json::from_str("\"2.39:1\"").unwrap();
        assert_eq!(unknown, AspectRatio::Original);
    }

    #[test]
    fn test_ratio_and_height_tables() {
        assert_eq!(AspectRatio::Original.ratio_expr(), None);
        assert_eq!(AspectRatio::Widescreen.ratio_expr(), Some("16/9"));
        assert_eq!(AspectRatio::Portrait.ratio_expr(), Some("9/16"));
        assert_eq!(AspectRatio::Square.ratio_expr(), Some("1"));
        assert_eq!(AspectRatio::Classic.ratio_expr(), Some("4/3"));
        assert_eq!(OutputResolution::Original.height(), None);
        assert_eq!(OutputResolution::P1080.height(), Some(1080));
        assert_eq!(OutputResolution::P480.height(), Some(480));
    }
}
