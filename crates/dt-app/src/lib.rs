pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod generator;
pub mod job;
pub mod media;
pub mod poll;
pub mod probe;
pub mod simulated;
pub mod store;
pub mod wizard;

pub use error::{AppError, Result};
pub use wizard::{Wizard, WizardSettings};
