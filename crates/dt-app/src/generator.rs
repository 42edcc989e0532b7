use std::path::Path;
use std::sync::Arc;
use tracing::info;
use crate::backend::TwinBackend;
use crate::backend::schemas::{GenerateResponse, PromptToVideoResponse};
use crate::error::{AppError, Result};
use crate::media::MediaFile;

/// Single-shot generation: the backend runs the whole pipeline in one request
pub struct Generator {
    backend: Arc<dyn TwinBackend>,
}

impl Generator {
    pub fn new(backend: Arc<dyn TwinBackend>) -> Self {
        Self { backend }
    }

    /// Animate an avatar image speaking `script`
    pub async fn from_script(&self, avatar: &Path, script: &str, dry_run: bool) -> Result<GenerateResponse> {
        if script.trim().is_empty() {
            return Err(AppError::InvalidInput("Please enter a script.".into()));
        }
        let avatar = MediaFile::read(avatar).await?;

        let resp = self.backend.generate(&avatar, script, dry_run).await?;
        info!(job_id = %resp.job_id, dry_run, "Script generation finished");
        Ok(resp)
    }

    /// Let the backend write the script and draw the avatar from a prompt
    pub async fn from_prompt(&self, prompt: &str, dry_run: bool) -> Result<PromptToVideoResponse> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidInput("Please enter a prompt.".into()));
        }

        let resp = self.backend.prompt_to_video(prompt, dry_run).await?;
        info!(job_id = %resp.job_id, dry_run, "Prompt generation finished");
        Ok(resp)
    }
}
