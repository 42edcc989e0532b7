use std::path::Path;
use std::sync::Arc;
use crate::error::Result;

const FALLBACK_MIME: &str = "application/octet-stream";

/// File contents ready to be sent as a multipart part
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = sniff_mime(&data)
            .or_else(|| mime_from_extension(path))
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        Ok(Self {
            file_name,
            mime_type,
            data,
        })
    }
}

/// Binary artifact returned by the backend (generated avatar, synthesized speech)
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlob {
    pub data: Arc<Vec<u8>>,
    pub content_type: String,
}

impl MediaBlob {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data: Arc::new(data),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File extension matching the content type
    pub fn extension(&self) -> &str {
        if let Ok(format) = image::guess_format(&self.data) {
            if let Some(ext) = format.extensions_str().first() {
                return ext;
            }
        }
        match self.content_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" => "wav",
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "video/mp4" => "mp4",
            _ => "bin",
        }
    }
}

/// MIME type recognised from the leading bytes
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    infer::get(data).map(|t| t.mime_type())
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(&PathBuf::from("a/b/clip.MOV")), Some("video/quicktime"));
        assert_eq!(mime_from_extension(&PathBuf::from("voice.m4a")), Some("audio/mp4"));
        assert_eq!(mime_from_extension(&PathBuf::from("notes.txt")), None);
        assert_eq!(mime_from_extension(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_sniff_png() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(sniff_mime(&png), Some("image/png"));
        assert_eq!(sniff_mime(b"plain text"), None);
    }

    #[test]
    fn test_blob_extension() {
        let jpeg = MediaBlob::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10], "application/octet-stream");
        assert_eq!(jpeg.extension(), "jpg");
        let speech = MediaBlob::new(b"not an image".to_vec(), "audio/mpeg");
        assert_eq!(speech.extension(), "mp3");
    }
}
