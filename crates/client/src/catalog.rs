use serde::{Deserialize, Serialize};
use std::fmt;

/// Output container requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Mp3,
    Mp4,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Mp3, Format::Mp4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Mp3 => "mp3",
            Format::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the backend's two storage roots receives the files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Default,
    Alt,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Default => "default",
            Location::Alt => "alt",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityOption {
    pub value: &'static str,
    pub label: &'static str,
}

const MP3_OPTIONS: &[QualityOption] = &[
    QualityOption { value: "128", label: "128 kbps" },
    QualityOption { value: "192", label: "192 kbps (default)" },
    QualityOption { value: "256", label: "256 kbps" },
    QualityOption { value: "320", label: "320 kbps" },
];

const MP4_OPTIONS: &[QualityOption] = &[
    QualityOption { value: "360", label: "360p" },
    QualityOption { value: "480", label: "480p" },
    QualityOption { value: "720", label: "720p (HD)" },
    QualityOption { value: "1080", label: "1080p (Full HD)" },
    QualityOption { value: "best", label: "Best available" },
];

/// Selectable quality presets for a format, in display order.
pub fn options_for(format: Format) -> &'static [QualityOption] {
    match format {
        Format::Mp3 => MP3_OPTIONS,
        Format::Mp4 => MP4_OPTIONS,
    }
}

/// The preset preselected when a format is chosen.
pub fn default_for(format: Format) -> &'static str {
    match format {
        Format::Mp3 => "192",
        Format::Mp4 => "best",
    }
}

/// Whether `option` is the preselected entry for `format`.
pub fn is_default(format: Format, option: &QualityOption) -> bool {
    option.value == default_for(format)
}

/// Look up a quality value in the catalog for `format`.
pub fn find_quality(format: Format, value: &str) -> Option<&'static QualityOption> {
    options_for(format).iter().find(|opt| opt.value == value)
}
