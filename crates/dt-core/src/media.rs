use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Kind of media a twin is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Name for display and messages
    pub fn name(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Largest accepted file size in bytes
    pub fn max_bytes(&self) -> u64 {
        match self {
            Self::Video => 100 * MIB,
            Self::Audio => 50 * MIB,
        }
    }

    pub fn min_duration_secs(&self) -> f64 {
        10.0
    }

    pub fn max_duration_secs(&self) -> f64 {
        match self {
            Self::Video => 120.0,
            Self::Audio => 300.0,
        }
    }

    /// MIME prefix a sniffed file of this kind must carry
    pub fn mime_prefix(&self) -> &str {
        match self {
            Self::Video => "video/",
            Self::Audio => "audio/",
        }
    }

    /// Container formats offered to the user
    pub fn accepted_formats(&self) -> &str {
        match self {
            Self::Video => "MP4, MOV, or WebM",
            Self::Audio => "MP3, WAV, or M4A",
        }
    }

    pub fn all() -> [MediaKind; 2] {
        [Self::Video, Self::Audio]
    }
}

/// What the host could tell about a selected file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaMetadata {
    pub size_bytes: u64,
    /// MIME type sniffed from content, if recognisable
    pub mime_type: Option<String>,
    /// Duration reported by the media probe; `None` when unreadable
    pub duration_secs: Option<f64>,
}
