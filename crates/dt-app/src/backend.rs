//! Client for the twin backend API
//!
//! Every remote operation the wizard and the single-shot generators need goes
//! through [`TwinBackend`]. [`HttpBackend`] is the real implementation; tests plug in
//! scripted ones.

pub mod schemas;

use std::time::Duration;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;
use crate::error::{AppError, Result};
use crate::media::{MediaBlob, MediaFile};
use crate::backend::schemas::{
    AnimationAssets, ErrorDetail, FrameResponse, GenerateResponse, PromptRequest,
    PromptToVideoResponse, SpeechRequest, StoredVideo, TalkCreated, TalkStatus,
    UploadVideoRequest, VoiceResponse,
};

const USER_AGENT: &str = concat!("dt-app/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait TwinBackend: Send + Sync {
    /// `POST /video/extract-frame`, returns the frame URL
    async fn extract_frame(&self, video: &MediaFile) -> Result<String>;

    /// `POST /video/generate-avatar?image_url=`
    async fn generate_avatar(&self, image_url: &str) -> Result<MediaBlob>;

    /// `POST /voice/clone-voice`, returns the voice id
    async fn clone_voice(&self, audio: &MediaFile) -> Result<String>;

    /// `POST /voice/generate-speech`
    async fn generate_speech(&self, text: &str, voice_id: &str) -> Result<MediaBlob>;

    /// `POST /animation/upload-for-animation`
    async fn upload_for_animation(&self, avatar: &MediaBlob, audio: &MediaBlob) -> Result<AnimationAssets>;

    /// `POST /animation/animate`, returns the talk id
    async fn animate(&self, assets: &AnimationAssets) -> Result<String>;

    /// `GET /animation/talks/{id}`
    async fn talk_status(&self, talk_id: &str) -> Result<TalkStatus>;

    /// `POST /storage/upload-video`, returns the stored URL
    async fn upload_video(&self, video_url: &str) -> Result<String>;

    /// `POST /api/generate`
    async fn generate(&self, avatar: &MediaFile, script: &str, dry_run: bool) -> Result<GenerateResponse>;

    /// `POST /api/prompt-to-video`
    async fn prompt_to_video(&self, prompt: &str, dry_run: bool) -> Result<PromptToVideoResponse>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_blob(response: Response, fallback_type: &str) -> Result<MediaBlob> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(fallback_type)
            .to_string();
        let data = response.bytes().await?.to_vec();
        if data.is_empty() {
            return Err(AppError::InvalidResponse("empty body".into()));
        }
        Ok(MediaBlob::new(data, content_type))
    }
}

fn file_part(file: &MediaFile) -> Result<Part> {
    Ok(Part::bytes(file.data.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)?)
}

fn blob_part(blob: &MediaBlob, stem: &str) -> Result<Part> {
    Ok(Part::bytes(blob.data.as_ref().clone())
        .file_name(format!("{}.{}", stem, blob.extension()))
        .mime_str(&blob.content_type)?)
}

/// Turn a non-success response into [`AppError::BackendError`], keeping FastAPI's `detail`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorDetail>(&body) {
        Ok(ErrorDetail { detail: serde_json::Value::String(s) }) => s,
        Ok(ErrorDetail { detail }) => detail.to_string(),
        Err(_) => body,
    };

    Err(AppError::BackendError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TwinBackend for HttpBackend {
    async fn extract_frame(&self, video: &MediaFile) -> Result<String> {
        debug!(file = %video.file_name, bytes = video.data.len(), "Requesting frame extraction");
        let form = Form::new().part("file", file_part(video)?);
        let response = self
            .client
            .post(self.url("/video/extract-frame"))
            .multipart(form)
            .send()
            .await?;
        let body: FrameResponse = ensure_success(response).await?.json().await?;
        Ok(body.frame_url)
    }

    async fn generate_avatar(&self, image_url: &str) -> Result<MediaBlob> {
        debug!(image_url, "Requesting avatar generation");
        let response = self
            .client
            .post(self.url("/video/generate-avatar"))
            .query(&[("image_url", image_url)])
            .send()
            .await?;
        Self::read_blob(ensure_success(response).await?, "image/jpeg").await
    }

    async fn clone_voice(&self, audio: &MediaFile) -> Result<String> {
        debug!(file = %audio.file_name, bytes = audio.data.len(), "Requesting voice clone");
        let form = Form::new().part("file", file_part(audio)?);
        let response = self
            .client
            .post(self.url("/voice/clone-voice"))
            .multipart(form)
            .send()
            .await?;
        let body: VoiceResponse = ensure_success(response).await?.json().await?;
        Ok(body.voice_id)
    }

    async fn generate_speech(&self, text: &str, voice_id: &str) -> Result<MediaBlob> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
        };
        let response = self
            .client
            .post(self.url("/voice/generate-speech"))
            .json(&request)
            .send()
            .await?;
        Self::read_blob(ensure_success(response).await?, "audio/mpeg").await
    }

    async fn upload_for_animation(&self, avatar: &MediaBlob, audio: &MediaBlob) -> Result<AnimationAssets> {
        let form = Form::new()
            .part("avatar", blob_part(avatar, "avatar")?)
            .part("audio", blob_part(audio, "speech")?);
        let response = self
            .client
            .post(self.url("/animation/upload-for-animation"))
            .multipart(form)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn animate(&self, assets: &AnimationAssets) -> Result<String> {
        let response = self
            .client
            .post(self.url("/animation/animate"))
            .json(assets)
            .send()
            .await?;
        let body: TalkCreated = ensure_success(response).await?.json().await?;
        Ok(body.talk_id)
    }

    async fn talk_status(&self, talk_id: &str) -> Result<TalkStatus> {
        let response = self
            .client
            .get(self.url(&format!("/animation/talks/{}", talk_id)))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn upload_video(&self, video_url: &str) -> Result<String> {
        let request = UploadVideoRequest {
            video_url: video_url.to_string(),
        };
        let response = self
            .client
            .post(self.url("/storage/upload-video"))
            .json(&request)
            .send()
            .await?;
        let body: StoredVideo = ensure_success(response).await?.json().await?;
        Ok(body.url)
    }

    async fn generate(&self, avatar: &MediaFile, script: &str, dry_run: bool) -> Result<GenerateResponse> {
        let form = Form::new()
            .part("avatar", file_part(avatar)?)
            .text("script", script.to_string())
            .text("dry_run", dry_run.to_string());
        let response = self
            .client
            .post(self.url("/api/generate"))
            .multipart(form)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn prompt_to_video(&self, prompt: &str, dry_run: bool) -> Result<PromptToVideoResponse> {
        let request = PromptRequest {
            prompt: prompt.to_string(),
            dry_run,
        };
        let response = self
            .client
            .post(self.url("/api/prompt-to-video"))
            .json(&request)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}
