//! Media validation
//!
//! Checks a selected file against the limits of its [`MediaKind`]. The check is
//! pure: it only looks at the metadata the host reported and always hands back a
//! [`Validation`], never an error.

use thiserror::Error;
use crate::media::{MediaKind, MediaMetadata};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} file too large (max {}MB)", capitalized(.0), .0.max_bytes() / (1024 * 1024))]
    TooLarge(MediaKind),

    #[error("Invalid {} format. Please use {}", .0.name(), .0.accepted_formats())]
    UnsupportedFormat(MediaKind),

    #[error("{} must be at least {} seconds long", capitalized(.0), .0.min_duration_secs())]
    TooShort(MediaKind),

    #[error("{} must be less than {} minutes long", capitalized(.0), .0.max_duration_secs() / 60.0)]
    TooLong(MediaKind),
}

fn capitalized(kind: &MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "Video",
        MediaKind::Audio => "Audio",
    }
}

/// Outcome of validating one file
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid { duration_secs: f64 },
    Invalid(ValidationError),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            Self::Valid { duration_secs } => Some(*duration_secs),
            Self::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid(e) => Some(e),
        }
    }
}

/// Validate reported metadata against the limits for `kind`.
///
/// Size is checked first so oversized files never need probing. Duration bounds
/// are inclusive.
pub fn validate(kind: MediaKind, meta: &MediaMetadata) -> Validation {
    if meta.size_bytes > kind.max_bytes() {
        return Validation::Invalid(ValidationError::TooLarge(kind));
    }

    if let Some(mime) = &meta.mime_type {
        if !mime.starts_with(kind.mime_prefix()) {
            return Validation::Invalid(ValidationError::UnsupportedFormat(kind));
        }
    }

    let duration = match meta.duration_secs {
        Some(d) if d.is_finite() => d,
        _ => return Validation::Invalid(ValidationError::UnsupportedFormat(kind)),
    };

    if duration < kind.min_duration_secs() {
        Validation::Invalid(ValidationError::TooShort(kind))
    } else if duration > kind.max_duration_secs() {
        Validation::Invalid(ValidationError::TooLong(kind))
    } else {
        Validation::Valid { duration_secs: duration }
    }
}

/// Render seconds as `m:ss`
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
