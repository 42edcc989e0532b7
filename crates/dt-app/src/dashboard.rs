//! Job dashboard
//!
//! Read-only listing of persisted jobs plus the sharing affordances shown next to
//! each of them. Only YouTube sharing is offered, and its upload is simulated.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::error::{AppError, Result};
use crate::job::Job;
use crate::store::JobStore;

const FETCH_FAILED: &str = "Failed to fetch jobs.";
const SIMULATED_UPLOAD_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub enum JobListView {
    Loaded(Vec<Job>),
    Failed(String),
}

pub struct JobList {
    store: Arc<dyn JobStore>,
}

impl JobList {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Fetch all jobs once; order is the store's (newest first)
    pub async fn load(&self) -> JobListView {
        match self.store.list_jobs().await {
            Ok(jobs) => {
                info!(count = jobs.len(), "Job list loaded");
                JobListView::Loaded(jobs)
            }
            Err(e) => {
                warn!(error = %e, "Job list failed to load");
                let message = match e {
                    AppError::Store(message) => message,
                    other => other.to_string(),
                };
                JobListView::Failed(if message.trim().is_empty() { FETCH_FAILED.to_string() } else { message })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    YouTube,
    X,
    LinkedIn,
    TikTok,
}

impl ShareTarget {
    pub fn name(&self) -> &str {
        match self {
            Self::YouTube => "YouTube",
            Self::X => "X",
            Self::LinkedIn => "LinkedIn",
            Self::TikTok => "TikTok",
        }
    }

    /// Only YouTube has a working flow; the others are shown disabled
    pub fn is_available(&self) -> bool {
        matches!(self, Self::YouTube)
    }

    pub fn all() -> [ShareTarget; 4] {
        [Self::YouTube, Self::X, Self::LinkedIn, Self::TikTok]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
}

/// YouTube share dialog for one job. Sign-in and upload are simulated.
#[derive(Debug, Clone, PartialEq)]
pub struct YouTubeDialog {
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub signed_in: bool,
    pub status: UploadStatus,
}

impl YouTubeDialog {
    pub fn open(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            title: job.share_title(),
            description: job.script.clone(),
            signed_in: false,
            status: UploadStatus::Idle,
        }
    }

    pub fn sign_in(&mut self) {
        self.signed_in = true;
    }

    /// Pretend to upload: waits a fixed delay and reports success
    pub async fn upload(&mut self) -> Result<()> {
        if !self.signed_in {
            return Err(AppError::InvalidInput("Sign in to YouTube first".into()));
        }
        if self.status == UploadStatus::Uploading {
            return Err(AppError::InvalidInput("Upload already in progress".into()));
        }

        self.status = UploadStatus::Uploading;
        tokio::time::sleep(SIMULATED_UPLOAD_DELAY).await;
        self.status = UploadStatus::Success;
        info!(job_id = %self.job_id, title = %self.title, "Simulated YouTube upload finished");
        Ok(())
    }
}
