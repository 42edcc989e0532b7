use dt_core::{MediaKind, Stage, WizardStep};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    StepChanged(WizardStep),
    MediaValidated {
        kind: MediaKind,
        valid: bool,
        error: Option<String>,
    },
    Stage {
        stage: Stage,
        status: StageStatus,
    },
    SimulatedProgress {
        percent: f32,
        label: &'static str,
    },
    SimulationFinished,
    Completed {
        session_id: Uuid,
    },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    Running,
    Succeeded,
    Failed(String),
}
