use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::backend::TwinBackend;
use crate::backend::schemas::TalkState;
use crate::error::{AppError, Result};

/// Poll an animation job until it reaches a terminal state.
///
/// The first status request goes out immediately, later ones `interval` apart.
/// Returns the rendered video URL. Stops without retrying on a failed request, an
/// `error`/`rejected` status, or cancellation of `cancel`.
pub async fn poll_until_done(
    backend: &dyn TwinBackend,
    talk_id: &str,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let status = tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            status = backend.talk_status(talk_id) => status?,
        };

        debug!(talk_id, attempt, status = ?status.status, "Polled animation status");

        match status.status {
            TalkState::Done => {
                let url = status.result_url.ok_or_else(|| {
                    AppError::InvalidResponse(format!("talk {} finished without a result URL", talk_id))
                })?;
                info!(talk_id, attempts = attempt, "Animation finished");
                return Ok(url);
            }
            state if state.is_terminal() => return Err(AppError::AnimationFailed),
            _ => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
