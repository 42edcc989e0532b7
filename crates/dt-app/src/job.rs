use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TITLE_LIMIT: usize = 60;

/// A persisted generation job, owned by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub script: String,
    pub image_url: String,
    pub video_url: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub model: String,
}

/// Row sent when recording a finished job; `created_at` is filled in by the database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewJob {
    pub id: String,
    pub script: String,
    pub prompt: String,
    pub image_url: String,
    pub video_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOrigin {
    Prompt,
    Manual,
    Twin,
    Other,
}

impl JobOrigin {
    pub fn model_name(&self) -> &str {
        match self {
            Self::Prompt => "prompt",
            Self::Manual => "manual",
            Self::Twin => "twin",
            Self::Other => "other",
        }
    }
}

impl Job {
    pub fn origin(&self) -> JobOrigin {
        match self.model.as_str() {
            "prompt" => JobOrigin::Prompt,
            "manual" => JobOrigin::Manual,
            "twin" => JobOrigin::Twin,
            _ => JobOrigin::Other,
        }
    }

    /// Whether the video URL points at an MP4 that can be played inline
    pub fn has_playable_video(&self) -> bool {
        let url = self.video_url.to_ascii_lowercase();
        let path = url.split('?').next().unwrap_or_default();
        path.ends_with(".mp4")
    }

    /// Title suggested when sharing: the prompt, else the start of the script
    pub fn share_title(&self) -> String {
        match self.prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => prompt.to_string(),
            _ => self.script.chars().take(TITLE_LIMIT).collect(),
        }
    }
}
