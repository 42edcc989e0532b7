use std::path::{Path, PathBuf};
use crate::media::{MediaKind, MediaMetadata};
use crate::validation::{Validation, ValidationError, validate};

/// A file the user selected for one of the media slots
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub path: PathBuf,
    pub preview_url: String,
    pub size_bytes: u64,
    pub mime_type: Option<String>,
    pub validation: Validation,
}

impl MediaUpload {
    /// Validate `meta` and record the outcome for the file at `path`
    pub fn new(kind: MediaKind, path: impl AsRef<Path>, meta: &MediaMetadata) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            kind,
            preview_url: format!("file://{}", path.display()),
            path,
            size_bytes: meta.size_bytes,
            mime_type: meta.mime_type.clone(),
            validation: validate(kind, meta),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.validation.duration_secs()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.validation.error()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.kind.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_records_validation() {
        let meta = MediaMetadata {
            size_bytes: 2048,
            mime_type: Some("audio/mpeg".into()),
            duration_secs: Some(5.0),
        };
        let upload = MediaUpload::new(MediaKind::Audio, "/tmp/sample.mp3", &meta);
        assert!(!upload.is_valid());
        assert_eq!(upload.error(), Some(&ValidationError::TooShort(MediaKind::Audio)));
        assert_eq!(upload.preview_url, "file:///tmp/sample.mp3");
        assert_eq!(upload.file_name(), "sample.mp3");
    }
}
