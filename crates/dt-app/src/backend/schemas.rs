use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameResponse {
    pub frame_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceResponse {
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
}

/// Publicly reachable copies of the avatar and speech, as the animation service needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationAssets {
    pub avatar_url: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TalkCreated {
    pub talk_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TalkState {
    Done,
    Error,
    Rejected,
    #[serde(other)]
    Processing,
}

impl TalkState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TalkStatus {
    pub status: TalkState,
    #[serde(default)]
    pub result_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadVideoRequest {
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredVideo {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub job_id: String,
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRequest {
    pub prompt: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptToVideoResponse {
    pub job_id: String,
    pub script: String,
    pub image_url: String,
    pub video_url: String,
}

/// FastAPI error body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: serde_json::Value,
}
