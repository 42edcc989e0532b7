use uuid::Uuid;
use dt_core::{MediaKind, MediaUpload, Stage, StageState, WizardStep};
use crate::media::MediaBlob;

pub const DEFAULT_SPEECH_TEXT: &str = "Hello, this is a test of my new voice!";

/// Everything one creation session knows. Lives until completion or restart.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub session_id: Uuid,
    pub step: WizardStep,

    pub video: Option<MediaUpload>,
    pub audio: Option<MediaUpload>,
    pub name: String,
    pub description: String,
    pub speech_text: String,

    pub frame: StageState<String>,
    pub avatar: StageState<MediaBlob>,
    pub voice: StageState<String>,
    pub speech: StageState<MediaBlob>,
    /// Public URLs of the avatar/speech pair handed to the animation service
    pub animation_assets: Option<(String, String)>,
    pub animation: StageState<String>,
    pub cloud: StageState<String>,

    pub(crate) epochs: Epochs,
}

/// Bumped whenever results of earlier work must no longer land in the state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Epochs {
    pub session: u64,
    pub video: u64,
    pub audio: u64,
}

impl Epochs {
    /// Epoch key of `stage`: the session plus every sample its artifact is built from
    pub fn of(&self, stage: Stage) -> (u64, u64, u64) {
        let video = if stage.uses_media(MediaKind::Video) { self.video } else { 0 };
        let audio = if stage.uses_media(MediaKind::Audio) { self.audio } else { 0 };
        (self.session, video, audio)
    }
}

impl WizardState {
    pub fn new(speech_text: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            step: WizardStep::default(),
            video: None,
            audio: None,
            name: String::new(),
            description: String::new(),
            speech_text: speech_text.into(),
            frame: StageState::Idle,
            avatar: StageState::Idle,
            voice: StageState::Idle,
            speech: StageState::Idle,
            animation_assets: None,
            animation: StageState::Idle,
            cloud: StageState::Idle,
            epochs: Epochs::default(),
        }
    }

    /// Start a fresh session; anything still in flight becomes stale
    pub(crate) fn reset(&mut self, speech_text: &str) {
        let epochs = Epochs {
            session: self.epochs.session + 1,
            video: self.epochs.video + 1,
            audio: self.epochs.audio + 1,
        };
        *self = Self::new(speech_text);
        self.epochs = epochs;
    }

    pub fn upload(&self, kind: MediaKind) -> Option<&MediaUpload> {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }

    /// Whether the current step's requirements are met
    pub fn can_proceed(&self) -> bool {
        match self.step {
            WizardStep::UploadVideo => self.video.as_ref().is_some_and(MediaUpload::is_valid),
            WizardStep::UploadAudio => self.audio.as_ref().is_some_and(MediaUpload::is_valid),
            WizardStep::NameTwin => !self.name.trim().is_empty(),
            WizardStep::Generate => false,
        }
    }

    /// Replace the upload for `kind` and drop the artifacts derived from the old one
    pub(crate) fn replace_upload(&mut self, upload: MediaUpload) {
        let kind = upload.kind;
        match kind {
            MediaKind::Video => {
                self.epochs.video += 1;
                self.video = Some(upload);
            }
            MediaKind::Audio => {
                self.epochs.audio += 1;
                self.audio = Some(upload);
            }
        }

        for source in Stage::all().into_iter().filter(|s| s.source() == Some(kind)) {
            self.clear(source);
            for stage in Stage::all().into_iter().filter(|s| s.depends_on(source)) {
                self.clear(stage);
            }
        }
    }

    fn clear(&mut self, stage: Stage) {
        match stage {
            Stage::FrameExtraction => self.frame = StageState::Idle,
            Stage::AvatarGeneration => self.avatar = StageState::Idle,
            Stage::VoiceCloning => self.voice = StageState::Idle,
            Stage::SpeechSynthesis => self.speech = StageState::Idle,
            Stage::Animation => {
                self.animation_assets = None;
                self.animation = StageState::Idle;
            }
            Stage::CloudSave => self.cloud = StageState::Idle,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(DEFAULT_SPEECH_TEXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::MediaMetadata;

    fn upload(kind: MediaKind, duration: f64) -> MediaUpload {
        let meta = MediaMetadata {
            size_bytes: 1024,
            mime_type: None,
            duration_secs: Some(duration),
        };
        MediaUpload::new(kind, "/tmp/x", &meta)
    }

    #[test]
    fn test_can_proceed_per_step() {
        let mut state = WizardState::default();
        assert!(!state.can_proceed());

        state.replace_upload(upload(MediaKind::Video, 5.0));
        assert!(!state.can_proceed());
        state.replace_upload(upload(MediaKind::Video, 30.0));
        assert!(state.can_proceed());

        state.step = WizardStep::UploadAudio;
        assert!(!state.can_proceed());
        state.replace_upload(upload(MediaKind::Audio, 30.0));
        assert!(state.can_proceed());

        state.step = WizardStep::NameTwin;
        state.name = "   ".into();
        assert!(!state.can_proceed());
        state.name = "Ada".into();
        assert!(state.can_proceed());

        state.step = WizardStep::Generate;
        assert!(!state.can_proceed());
    }

    #[test]
    fn test_replacing_video_clears_its_artifacts_only() {
        let mut state = WizardState::default();
        state.frame = StageState::Succeeded("https://x/frame.jpg".into());
        state.voice = StageState::Succeeded("voice-1".into());
        let before = state.epochs;

        state.replace_upload(upload(MediaKind::Video, 30.0));

        assert!(state.frame.is_idle());
        assert!(state.voice.artifact().is_some());
        assert_eq!(state.epochs.video, before.video + 1);
        assert_eq!(state.epochs.audio, before.audio);
    }

    #[test]
    fn test_replacing_audio_clears_everything_built_on_the_voice() {
        let mut state = WizardState::default();
        state.frame = StageState::Succeeded("https://x/frame.jpg".into());
        state.avatar = StageState::Succeeded(MediaBlob::new(vec![1], "image/jpeg"));
        state.voice = StageState::Succeeded("voice-1".into());
        state.speech = StageState::Succeeded(MediaBlob::new(vec![2], "audio/mpeg"));
        state.animation_assets = Some(("https://cdn/a.jpg".into(), "https://cdn/s.mp3".into()));
        state.animation = StageState::Succeeded("https://x/out.mp4".into());
        state.cloud = StageState::Succeeded("https://storage/out.mp4".into());

        state.replace_upload(upload(MediaKind::Audio, 30.0));

        assert!(state.voice.is_idle());
        assert!(state.speech.is_idle());
        assert!(state.animation_assets.is_none());
        assert!(state.animation.is_idle());
        assert!(state.cloud.is_idle());
        assert!(state.frame.artifact().is_some());
        assert!(state.avatar.artifact().is_some());
    }

    #[test]
    fn test_epoch_keys_follow_media_lineage() {
        let mut state = WizardState::default();
        let speech = state.epochs.of(Stage::SpeechSynthesis);
        let avatar = state.epochs.of(Stage::AvatarGeneration);
        let animation = state.epochs.of(Stage::Animation);

        state.replace_upload(upload(MediaKind::Audio, 30.0));

        assert_ne!(state.epochs.of(Stage::SpeechSynthesis), speech);
        assert_ne!(state.epochs.of(Stage::Animation), animation);
        assert_eq!(state.epochs.of(Stage::AvatarGeneration), avatar);
    }

    #[test]
    fn test_reset_bumps_every_epoch() {
        let mut state = WizardState::default();
        state.name = "Ada".into();
        let old_session = state.session_id;
        state.reset(DEFAULT_SPEECH_TEXT);

        assert_ne!(state.session_id, old_session);
        assert!(state.name.is_empty());
        assert_eq!(state.epochs, Epochs { session: 1, video: 1, audio: 1 });
    }
}
