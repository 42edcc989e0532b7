use serde::{Deserialize, Serialize};
use crate::media::MediaKind;

/// Remote stages of the twin pipeline, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FrameExtraction,
    AvatarGeneration,
    VoiceCloning,
    SpeechSynthesis,
    Animation,
    CloudSave,
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Self::FrameExtraction => "frame extraction",
            Self::AvatarGeneration => "avatar generation",
            Self::VoiceCloning => "voice cloning",
            Self::SpeechSynthesis => "speech synthesis",
            Self::Animation => "animation",
            Self::CloudSave => "cloud save",
        }
    }

    /// Stages whose artifacts must exist before this one may run
    pub fn predecessors(&self) -> &'static [Stage] {
        match self {
            Self::FrameExtraction | Self::VoiceCloning => &[],
            Self::AvatarGeneration => &[Self::FrameExtraction],
            Self::SpeechSynthesis => &[Self::VoiceCloning],
            Self::Animation => &[Self::AvatarGeneration, Self::SpeechSynthesis],
            Self::CloudSave => &[Self::Animation],
        }
    }

    /// The media sample a stage consumes directly
    pub fn source(&self) -> Option<MediaKind> {
        match self {
            Self::FrameExtraction => Some(MediaKind::Video),
            Self::VoiceCloning => Some(MediaKind::Audio),
            _ => None,
        }
    }

    /// Whether this stage's artifact is built, at any distance, from `kind`'s sample
    pub fn uses_media(&self, kind: MediaKind) -> bool {
        self.source() == Some(kind) || self.predecessors().iter().any(|p| p.uses_media(kind))
    }

    /// Whether `other`'s artifact feeds this stage, directly or through another stage
    pub fn depends_on(&self, other: Stage) -> bool {
        self.predecessors().iter().any(|p| *p == other || p.depends_on(other))
    }

    pub fn all() -> [Stage; 6] {
        [
            Self::FrameExtraction,
            Self::AvatarGeneration,
            Self::VoiceCloning,
            Self::SpeechSynthesis,
            Self::Animation,
            Self::CloudSave,
        ]
    }
}

/// Progress of one stage together with what it produced.
///
/// A stage is never busy and resulted at the same time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StageState<T> {
    #[default]
    Idle,
    Running,
    Succeeded(T),
    Failed(String),
}

impl<T> StageState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn artifact(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded(_) => "done",
            Self::Failed(_) => "failed",
        }
    }
}
