//! Creation wizard
//!
//! Drives one twin-creation session: four linear steps, two side pipelines that
//! start as soon as a valid video or audio sample is selected, and the manual
//! speech / animate / save actions of the last step. Each remote stage is tracked
//! as a [`StageState`] so a stage is never busy and resulted at the same time.
//!
//! All work is bound to cancellation tokens: [`Wizard::restart`] cancels the current
//! session, [`Wizard::close`] everything the wizard ever started.

pub mod state;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use dt_core::{MediaKind, MediaUpload, Stage, StageState, WizardStep};
use crate::backend::TwinBackend;
use crate::error::{AppError, Result};
use crate::events::{StageStatus, WizardEvent};
use crate::job::{JobOrigin, NewJob};
use crate::media::{MediaBlob, MediaFile};
use crate::poll::poll_until_done;
use crate::probe::{MediaProbe, inspect_media};
use crate::simulated::SimulatedProgress;
use crate::store::JobStore;
use crate::wizard::state::{DEFAULT_SPEECH_TEXT, WizardState};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct WizardSettings {
    /// Delay between animation status requests
    pub poll_interval: Duration,
    /// Text offered for speech synthesis in a fresh session
    pub speech_text: String,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            speech_text: DEFAULT_SPEECH_TEXT.to_string(),
        }
    }
}

/// Result of selecting a file for one of the media slots
#[derive(Debug)]
pub struct MediaSelection {
    pub upload: MediaUpload,
    /// Side pipeline started for a valid file
    pub pipeline: Option<JoinHandle<()>>,
}

/// What a finished session produced
#[derive(Debug, Clone, PartialEq)]
pub struct TwinSummary {
    pub session_id: Uuid,
    pub name: String,
    pub description: String,
    pub voice_id: Option<String>,
    pub video_url: Option<String>,
    pub cloud_url: Option<String>,
    pub job: Option<NewJob>,
}

#[derive(Clone)]
pub struct Wizard {
    backend: Arc<dyn TwinBackend>,
    probe: Arc<dyn MediaProbe>,
    settings: Arc<WizardSettings>,
    state: Arc<RwLock<WizardState>>,
    events: broadcast::Sender<WizardEvent>,
    lifetime: CancellationToken,
    session: Arc<RwLock<CancellationToken>>,
}

impl Wizard {
    pub fn new(backend: Arc<dyn TwinBackend>, probe: Arc<dyn MediaProbe>, settings: WizardSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let lifetime = CancellationToken::new();
        let session = lifetime.child_token();

        Self {
            backend,
            probe,
            state: Arc::new(RwLock::new(WizardState::new(settings.speech_text.clone()))),
            settings: Arc::new(settings),
            events,
            lifetime,
            session: Arc::new(RwLock::new(session)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WizardState {
        self.state.read().await.clone()
    }

    pub async fn step(&self) -> WizardStep {
        self.state.read().await.step
    }

    pub async fn can_proceed(&self) -> bool {
        self.state.read().await.can_proceed()
    }

    /// Advance one step if the current one is satisfied
    pub async fn next(&self) -> bool {
        let mut st = self.state.write().await;
        if !st.can_proceed() {
            return false;
        }
        let Some(step) = st.step.next() else {
            return false;
        };
        st.step = step;
        drop(st);

        self.emit(WizardEvent::StepChanged(step));
        true
    }

    pub async fn back(&self) -> bool {
        let mut st = self.state.write().await;
        let Some(step) = st.step.previous() else {
            return false;
        };
        st.step = step;
        drop(st);

        self.emit(WizardEvent::StepChanged(step));
        true
    }

    pub async fn set_name(&self, name: impl Into<String>) {
        self.state.write().await.name = name.into();
    }

    pub async fn set_description(&self, description: impl Into<String>) {
        self.state.write().await.description = description.into();
    }

    pub async fn set_speech_text(&self, text: impl Into<String>) {
        self.state.write().await.speech_text = text.into();
    }

    /// Validate a video sample; a valid one starts frame extraction and then
    /// avatar generation in the background.
    pub async fn select_video(&self, path: &Path) -> Result<MediaSelection> {
        self.select(MediaKind::Video, path).await
    }

    /// Validate a voice sample; a valid one starts voice cloning in the background.
    pub async fn select_audio(&self, path: &Path) -> Result<MediaSelection> {
        self.select(MediaKind::Audio, path).await
    }

    async fn select(&self, kind: MediaKind, path: &Path) -> Result<MediaSelection> {
        let upload = inspect_media(kind, path, self.probe.as_ref()).await?;
        let file = if upload.is_valid() {
            Some(MediaFile::read(path).await?)
        } else {
            None
        };

        let first_stage = match kind {
            MediaKind::Video => Stage::FrameExtraction,
            MediaKind::Audio => Stage::VoiceCloning,
        };
        let epoch = {
            let mut st = self.state.write().await;
            st.replace_upload(upload.clone());
            st.epochs.of(first_stage)
        };
        let token = self.session_token().await;

        self.emit(WizardEvent::MediaValidated {
            kind,
            valid: upload.is_valid(),
            error: upload.error().map(ToString::to_string),
        });

        let pipeline = file.map(|file| {
            let wizard = self.clone();
            tokio::spawn(async move {
                match kind {
                    MediaKind::Video => wizard.run_video_pipeline(file, epoch, token).await,
                    MediaKind::Audio => wizard.run_audio_pipeline(file, epoch, token).await,
                }
            })
        });

        Ok(MediaSelection { upload, pipeline })
    }

    async fn run_video_pipeline(&self, file: MediaFile, epoch: (u64, u64, u64), token: CancellationToken) {
        let frame_url = match self
            .run_stage(
                Stage::FrameExtraction,
                epoch,
                &token,
                |s| &mut s.frame,
                self.backend.extract_frame(&file),
            )
            .await
        {
            Ok(url) => url,
            Err(_) => return,
        };

        let _ = self
            .run_stage(
                Stage::AvatarGeneration,
                epoch,
                &token,
                |s| &mut s.avatar,
                self.backend.generate_avatar(&frame_url),
            )
            .await;
    }

    async fn run_audio_pipeline(&self, file: MediaFile, epoch: (u64, u64, u64), token: CancellationToken) {
        let _ = self
            .run_stage(
                Stage::VoiceCloning,
                epoch,
                &token,
                |s| &mut s.voice,
                self.backend.clone_voice(&file),
            )
            .await;
    }

    /// Synthesize the speech text with the cloned voice
    pub async fn generate_speech(&self) -> Result<MediaBlob> {
        let (voice_id, text, epoch) = {
            let st = self.state.read().await;
            let voice_id = st.voice.artifact().cloned().ok_or(AppError::MissingPrerequisite {
                stage: Stage::SpeechSynthesis,
                reason: "no cloned voice yet",
            })?;
            if st.speech_text.trim().is_empty() {
                return Err(AppError::MissingPrerequisite {
                    stage: Stage::SpeechSynthesis,
                    reason: "speech text is empty",
                });
            }
            (voice_id, st.speech_text.clone(), st.epochs.of(Stage::SpeechSynthesis))
        };
        let token = self.session_token().await;

        self.run_stage(
            Stage::SpeechSynthesis,
            epoch,
            &token,
            |s| &mut s.speech,
            self.backend.generate_speech(&text, &voice_id),
        )
        .await
    }

    /// Turn the generated avatar and speech into a talking-head video.
    ///
    /// Uploads both assets, submits the animation job and polls it until it is done.
    pub async fn animate(&self) -> Result<String> {
        let (avatar, speech, epoch) = {
            let st = self.state.read().await;
            let avatar = st.avatar.artifact().cloned().ok_or(AppError::MissingPrerequisite {
                stage: Stage::Animation,
                reason: "no generated avatar yet",
            })?;
            let speech = st.speech.artifact().cloned().ok_or(AppError::MissingPrerequisite {
                stage: Stage::Animation,
                reason: "no synthesized speech yet",
            })?;
            (avatar, speech, st.epochs.of(Stage::Animation))
        };
        let token = self.session_token().await;
        let interval = self.settings.poll_interval;

        let work = async {
            let assets = self.backend.upload_for_animation(&avatar, &speech).await?;
            {
                let mut st = self.state.write().await;
                if st.epochs.of(Stage::Animation) == epoch {
                    st.animation_assets = Some((assets.avatar_url.clone(), assets.audio_url.clone()));
                }
            }

            let talk_id = self.backend.animate(&assets).await?;
            info!(%talk_id, "Animation job submitted");
            poll_until_done(self.backend.as_ref(), &talk_id, interval, &token).await
        };

        self.run_stage(Stage::Animation, epoch, &token, |s| &mut s.animation, work)
            .await
    }

    /// Persist the animated video to cloud storage
    pub async fn save_to_cloud(&self) -> Result<String> {
        let (video_url, epoch) = {
            let st = self.state.read().await;
            let url = st.animation.artifact().cloned().ok_or(AppError::MissingPrerequisite {
                stage: Stage::CloudSave,
                reason: "no animated video yet",
            })?;
            (url, st.epochs.of(Stage::CloudSave))
        };
        let token = self.session_token().await;

        self.run_stage(
            Stage::CloudSave,
            epoch,
            &token,
            |s| &mut s.cloud,
            self.backend.upload_video(&video_url),
        )
        .await
    }

    /// Complete the session.
    ///
    /// With a store and a finished video, a job record is written first; the twin's
    /// name doubles as the job's title. The state is reset afterwards.
    pub async fn finish(&self, store: Option<&dyn JobStore>) -> Result<TwinSummary> {
        let st = self.snapshot().await;
        if st.name.trim().is_empty() {
            return Err(AppError::InvalidInput("Give your digital twin a name first".into()));
        }

        let cloud_url = st.cloud.artifact().cloned();
        let video_url = cloud_url.clone().or_else(|| st.animation.artifact().cloned());

        let job = match (store, &video_url) {
            (Some(store), Some(video_url)) => {
                let image_url = st
                    .animation_assets
                    .as_ref()
                    .map(|(avatar_url, _)| avatar_url.clone())
                    .or_else(|| st.frame.artifact().cloned())
                    .unwrap_or_default();
                let job = NewJob {
                    id: st.session_id.to_string(),
                    script: st.speech_text.clone(),
                    prompt: st.name.trim().to_string(),
                    image_url,
                    video_url: video_url.clone(),
                    model: JobOrigin::Twin.model_name().to_string(),
                };
                store.insert_job(&job).await?;
                info!(job_id = %job.id, "Recorded twin job");
                Some(job)
            }
            _ => None,
        };

        let summary = TwinSummary {
            session_id: st.session_id,
            name: st.name.trim().to_string(),
            description: st.description.clone(),
            voice_id: st.voice.artifact().cloned(),
            video_url,
            cloud_url,
            job,
        };

        self.emit(WizardEvent::Completed {
            session_id: st.session_id,
        });
        self.reset_session().await;

        Ok(summary)
    }

    /// Abandon the session: cancel its work and start over at step 1
    pub async fn restart(&self) {
        self.reset_session().await;
    }

    /// Cancel everything bound to this wizard, including running polls
    pub fn close(&self) {
        self.lifetime.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Presentational progress with canned stage labels.
    ///
    /// Runs on its own timer and neither waits for nor affects the real pipeline.
    pub async fn run_simulated_generation(&self) -> Result<()> {
        let token = self.session_token().await;
        let ticks = SimulatedProgress::new(StdRng::from_entropy());

        for tick in ticks {
            self.emit(WizardEvent::SimulatedProgress {
                percent: tick.percent,
                label: tick.label,
            });
            tokio::select! {
                _ = token.cancelled() => return Err(AppError::Cancelled),
                _ = tokio::time::sleep(tick.delay) => {}
            }
        }

        self.emit(WizardEvent::SimulationFinished);
        Ok(())
    }

    async fn reset_session(&self) {
        {
            let mut token = self.session.write().await;
            token.cancel();
            *token = self.lifetime.child_token();
        }
        self.state.write().await.reset(&self.settings.speech_text);

        self.emit(WizardEvent::Reset);
        self.emit(WizardEvent::StepChanged(WizardStep::default()));
    }

    async fn session_token(&self) -> CancellationToken {
        self.session.read().await.clone()
    }

    fn emit(&self, event: WizardEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Run one remote stage and record its outcome in `slot`.
    ///
    /// Results computed under an outdated epoch are returned to the caller but never
    /// written to the state.
    async fn run_stage<T, S, F>(
        &self,
        stage: Stage,
        epoch: (u64, u64, u64),
        token: &CancellationToken,
        slot: S,
        work: F,
    ) -> Result<T>
    where
        T: Clone + Send,
        S: Fn(&mut WizardState) -> &mut StageState<T> + Send,
        F: Future<Output = Result<T>> + Send,
    {
        {
            let mut st = self.state.write().await;
            if st.epochs.of(stage) != epoch {
                return Err(AppError::Cancelled);
            }
            let current = slot(&mut *st);
            if current.is_running() {
                return Err(AppError::StageBusy(stage));
            }
            *current = StageState::Running;
        }
        self.emit(WizardEvent::Stage {
            stage,
            status: StageStatus::Running,
        });
        info!(stage = stage.name(), "Stage started");

        let result = tokio::select! {
            _ = token.cancelled() => Err(AppError::Cancelled),
            result = work => result,
        };

        let mut st = self.state.write().await;
        if st.epochs.of(stage) != epoch {
            debug!(stage = stage.name(), "Discarding result of a superseded selection");
            return result;
        }

        let status = match &result {
            Ok(value) => {
                *slot(&mut *st) = StageState::Succeeded(value.clone());
                info!(stage = stage.name(), "Stage finished");
                StageStatus::Succeeded
            }
            Err(e) => {
                warn!(stage = stage.name(), error = %e, "Stage failed");
                *slot(&mut *st) = StageState::Failed(e.to_string());
                StageStatus::Failed(e.to_string())
            }
        };
        drop(st);

        self.emit(WizardEvent::Stage { stage, status });
        result
    }
}
