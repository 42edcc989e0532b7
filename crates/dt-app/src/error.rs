use thiserror::Error;
use dt_core::Stage;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error from backend: HTTP {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Animation failed on the server")]
    AnimationFailed,

    #[error("Cancelled")]
    Cancelled,

    #[error("Cannot start {}: {reason}", .stage.name())]
    MissingPrerequisite { stage: Stage, reason: &'static str },

    #[error("{} is already running", .0.name())]
    StageBusy(Stage),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Job store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
