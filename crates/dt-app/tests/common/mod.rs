#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use tokio::time::Instant;
use dt_app::backend::TwinBackend;
use dt_app::backend::schemas::{
    AnimationAssets, GenerateResponse, PromptToVideoResponse, TalkState, TalkStatus,
};
use dt_app::error::{AppError, Result};
use dt_app::job::{Job, NewJob};
use dt_app::media::{MediaBlob, MediaFile};
use dt_app::probe::MediaProbe;
use dt_app::store::JobStore;

pub const FRAME_URL: &str = "https://x/frame.jpg";
pub const RESULT_URL: &str = "https://x/out.mp4";
pub const STORED_URL: &str = "https://storage/twin.mp4";
pub const VOICE_ID: &str = "voice-1";
pub const TALK_ID: &str = "talk-1";

#[derive(Debug, Clone)]
pub struct Call {
    pub op: &'static str,
    pub arg: String,
    pub at: Instant,
}

/// Backend with canned answers that records every call it receives
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    talk_script: Mutex<VecDeque<TalkState>>,
    failing: HashSet<&'static str>,
    delays: HashMap<&'static str, Duration>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses returned by successive polls; `processing` once exhausted
    pub fn with_talk_script(self, states: impl IntoIterator<Item = TalkState>) -> Self {
        *self.talk_script.lock().unwrap() = states.into_iter().collect();
        self
    }

    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn delayed(mut self, op: &'static str, delay: Duration) -> Self {
        self.delays.insert(op, delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    async fn record(&self, op: &'static str, arg: impl Into<String>) -> Result<()> {
        self.calls.lock().unwrap().push(Call {
            op,
            arg: arg.into(),
            at: Instant::now(),
        });
        if let Some(delay) = self.delays.get(op) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(op) {
            return Err(AppError::BackendError {
                status: 500,
                message: format!("{op} exploded"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TwinBackend for ScriptedBackend {
    async fn extract_frame(&self, video: &MediaFile) -> Result<String> {
        self.record("extract_frame", video.file_name.clone()).await?;
        Ok(FRAME_URL.to_string())
    }

    async fn generate_avatar(&self, image_url: &str) -> Result<MediaBlob> {
        self.record("generate_avatar", image_url).await?;
        Ok(MediaBlob::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3], "image/jpeg"))
    }

    async fn clone_voice(&self, audio: &MediaFile) -> Result<String> {
        self.record("clone_voice", audio.file_name.clone()).await?;
        Ok(VOICE_ID.to_string())
    }

    async fn generate_speech(&self, text: &str, voice_id: &str) -> Result<MediaBlob> {
        self.record("generate_speech", format!("{voice_id}:{text}")).await?;
        Ok(MediaBlob::new(b"speech".to_vec(), "audio/mpeg"))
    }

    async fn upload_for_animation(&self, avatar: &MediaBlob, audio: &MediaBlob) -> Result<AnimationAssets> {
        self.record("upload_for_animation", format!("{}+{}", avatar.len(), audio.len()))
            .await?;
        Ok(AnimationAssets {
            avatar_url: "https://cdn/avatar.jpg".into(),
            audio_url: "https://cdn/speech.mp3".into(),
        })
    }

    async fn animate(&self, assets: &AnimationAssets) -> Result<String> {
        self.record("animate", assets.avatar_url.clone()).await?;
        Ok(TALK_ID.to_string())
    }

    async fn talk_status(&self, talk_id: &str) -> Result<TalkStatus> {
        self.record("talk_status", talk_id).await?;
        let status = self
            .talk_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TalkState::Processing);
        let result_url = (status == TalkState::Done).then(|| RESULT_URL.to_string());
        Ok(TalkStatus { status, result_url })
    }

    async fn upload_video(&self, video_url: &str) -> Result<String> {
        self.record("upload_video", video_url).await?;
        Ok(STORED_URL.to_string())
    }

    async fn generate(&self, avatar: &MediaFile, script: &str, dry_run: bool) -> Result<GenerateResponse> {
        self.record("generate", format!("{}:{}:{}", avatar.file_name, script, dry_run))
            .await?;
        Ok(GenerateResponse {
            job_id: "job-1".into(),
            video_url: RESULT_URL.into(),
        })
    }

    async fn prompt_to_video(&self, prompt: &str, dry_run: bool) -> Result<PromptToVideoResponse> {
        self.record("prompt_to_video", format!("{}:{}", prompt, dry_run)).await?;
        Ok(PromptToVideoResponse {
            job_id: "job-2".into(),
            script: "A generated script".into(),
            image_url: "https://cdn/drawn.png".into(),
            video_url: RESULT_URL.into(),
        })
    }
}

/// Probe reporting a fixed duration, with overrides by file name
pub struct FakeProbe {
    default: Option<f64>,
    overrides: Mutex<HashMap<String, Option<f64>>>,
}

impl FakeProbe {
    pub fn new(default: f64) -> Self {
        Self {
            default: Some(default),
            overrides: Mutex::new(HashMap::new()),
        }
    }

    pub fn set(self, file_name: &str, duration: Option<f64>) -> Self {
        self.overrides.lock().unwrap().insert(file_name.to_string(), duration);
        self
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn duration_secs(&self, path: &Path) -> Option<f64> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match self.overrides.lock().unwrap().get(&name) {
            Some(duration) => *duration,
            None => self.default,
        }
    }
}

/// Store that keeps inserted jobs in memory
#[derive(Default)]
pub struct MemoryStore {
    pub inserted: Mutex<Vec<NewJob>>,
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(Vec::new())
    }

    async fn insert_job(&self, job: &NewJob) -> Result<()> {
        self.inserted.lock().unwrap().push(job.clone());
        Ok(())
    }
}

/// Write a small file whose bytes no MIME sniffer recognises
pub fn media_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("fake media for {name}")).unwrap();
    path
}
