//! Format catalog module.
//!
//! Static mapping from a media category to the target extensions a job of
//! that category may be converted to. This is the only source of truth for
//! valid targets; the registry validates every assignment against it.

use serde::{Deserialize, Serialize};

/// Broad media category of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
}

impl MediaCategory {
    /// Classifies a declared content type (`image/png`, `video/quicktime`, ...)
    /// by its top-level type. Returns `None` for anything that is not image,
    /// video or audio.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let top_level = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match top_level.as_str() {
            "image" => Some(MediaCategory::Image),
            "video" => Some(MediaCategory::Video),
            "audio" => Some(MediaCategory::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaCategory::Image => write!(f, "image"),
            MediaCategory::Video => write!(f, "video"),
            MediaCategory::Audio => write!(f, "audio"),
        }
    }
}

const IMAGE_TARGETS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "ico", "tif", "tiff", "svg", "raw", "tga",
];

const VIDEO_TARGETS: &[&str] = &[
    "mp4", "m4v", "mp4v", "3gp", "3g2", "avi", "mov", "wmv", "mkv", "flv", "ogv", "webm",
    "h264", "264", "hevc", "265",
];

const AUDIO_TARGETS: &[&str] = &["mp3", "wav", "ogg", "aac", "wma", "flac", "m4a"];

/// A labelled set of targets presented as one selectable group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    /// Group label ("image", "video" or "audio").
    pub label: &'static str,
    pub extensions: &'static [&'static str],
}

/// Static lookup of valid conversion targets per media category.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatCatalog;

impl FormatCatalog {
    /// Every valid target for a category. For video this is the video group
    /// followed by the audio group.
    pub fn targets_for(category: MediaCategory) -> Vec<&'static str> {
        Self::target_groups(category)
            .iter()
            .flat_map(|group| group.extensions.iter().copied())
            .collect()
    }

    /// Container targets a video source can be transcoded to.
    pub fn video_targets() -> &'static [&'static str] {
        VIDEO_TARGETS
    }

    /// Audio-only targets; also offered to video sources as a downmix.
    pub fn audio_targets() -> &'static [&'static str] {
        AUDIO_TARGETS
    }

    /// Targets grouped the way a caller should present them. Video sources get
    /// two distinguishable groups rather than a flat union.
    pub fn target_groups(category: MediaCategory) -> Vec<TargetGroup> {
        match category {
            MediaCategory::Image => vec![TargetGroup {
                label: "image",
                extensions: IMAGE_TARGETS,
            }],
            MediaCategory::Video => vec![
                TargetGroup {
                    label: "video",
                    extensions: VIDEO_TARGETS,
                },
                TargetGroup {
                    label: "audio",
                    extensions: AUDIO_TARGETS,
                },
            ],
            MediaCategory::Audio => vec![TargetGroup {
                label: "audio",
                extensions: AUDIO_TARGETS,
            }],
        }
    }

    /// Case-insensitive membership check against `targets_for(category)`.
    pub fn is_valid_target(category: MediaCategory, extension: &str) -> bool {
        Self::target_groups(category).iter().any(|group| {
            group
                .extensions
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(extension))
        })
    }
}
