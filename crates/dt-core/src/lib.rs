mod media;
mod stage;
mod step;
mod upload;
pub mod validation;

pub use media::{MediaKind, MediaMetadata};
pub use stage::{Stage, StageState};
pub use step::WizardStep;
pub use upload::MediaUpload;
pub use validation::{Validation, ValidationError, format_duration, validate};
