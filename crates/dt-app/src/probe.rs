use std::path::Path;
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};
use dt_core::{MediaKind, MediaMetadata, MediaUpload};
use crate::error::Result;
use crate::media::sniff_mime;

const SNIFF_LEN: usize = 8192;

/// Reports the playable duration of a media file
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// `None` when the file cannot be read as media
    async fn duration_secs(&self, path: &Path) -> Option<f64>;
}

/// Probe backed by the `ffprobe` executable
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl FfprobeProbe {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn duration_secs(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.program)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(path)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.program, error = %e, "Failed to run media probe");
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                path = %path.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Media probe rejected file"
            );
            return None;
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_duration(raw: &str) -> Option<f64> {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
}

/// Measure a selected file and validate it for `kind`.
///
/// Oversized files are rejected without running the probe.
pub async fn inspect_media(kind: MediaKind, path: &Path, probe: &dyn MediaProbe) -> Result<MediaUpload> {
    let size_bytes = tokio::fs::metadata(path).await?.len();

    let mut meta = MediaMetadata {
        size_bytes,
        ..Default::default()
    };

    if size_bytes <= kind.max_bytes() {
        let mut head = vec![0u8; SNIFF_LEN];
        let mut file = tokio::fs::File::open(path).await?;
        let n = file.read(&mut head).await?;
        meta.mime_type = sniff_mime(&head[..n]).map(String::from);
        meta.duration_secs = probe.duration_secs(path).await;
    }

    let upload = MediaUpload::new(kind, path, &meta);
    debug!(
        kind = kind.name(),
        path = %path.display(),
        size_bytes,
        mime = ?meta.mime_type,
        duration = ?meta.duration_secs,
        valid = upload.is_valid(),
        "Inspected media"
    );
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("31.466000\n"), Some(31.466));
        assert_eq!(parse_duration("\n  12\n"), Some(12.0));
        assert_eq!(parse_duration("N/A\n"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("inf"), None);
    }

    #[tokio::test]
    async fn test_missing_probe_program_reports_no_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();

        let probe = FfprobeProbe::with_program("dt-app-no-such-probe");
        assert_eq!(probe.duration_secs(&path).await, None);

        let upload = inspect_media(MediaKind::Video, &path, &probe).await.unwrap();
        assert!(!upload.is_valid());
        assert_eq!(upload.size_bytes, 18);
    }
}
