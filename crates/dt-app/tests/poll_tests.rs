mod common;

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use dt_app::AppError;
use dt_app::backend::schemas::TalkState;
use dt_app::poll::poll_until_done;
use common::{RESULT_URL, ScriptedBackend, TALK_ID};

const INTERVAL: Duration = Duration::from_secs(3);

#[tokio::test(start_paused = true)]
async fn test_polls_until_done_at_fixed_interval() {
    let backend = ScriptedBackend::new().with_talk_script([
        TalkState::Processing,
        TalkState::Processing,
        TalkState::Done,
    ]);
    let started = tokio::time::Instant::now();

    let url = poll_until_done(&backend, TALK_ID, INTERVAL, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(url, RESULT_URL);
    let calls = backend.calls_to("talk_status");
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].at, started);
    assert_eq!(calls[1].at - calls[0].at, INTERVAL);
    assert_eq!(calls[2].at - calls[1].at, INTERVAL);
    assert!(calls.iter().all(|c| c.arg == TALK_ID));
}

#[tokio::test(start_paused = true)]
async fn test_error_status_stops_polling() {
    for terminal in [TalkState::Error, TalkState::Rejected] {
        let backend = ScriptedBackend::new().with_talk_script([TalkState::Processing, terminal]);

        let err = poll_until_done(&backend, TALK_ID, INTERVAL, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AnimationFailed));
        assert_eq!(backend.calls_to("talk_status").len(), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_request_failure_is_not_retried() {
    let backend = ScriptedBackend::new().failing("talk_status");

    let err = poll_until_done(&backend, TALK_ID, INTERVAL, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BackendError { status: 500, .. }));
    assert_eq!(backend.calls_to("talk_status").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_stops_polling() {
    let backend = ScriptedBackend::new();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        canceller.cancel();
    });

    let err = poll_until_done(&backend, TALK_ID, INTERVAL, &token).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled));
    // t=0, t=3, t=6; cancelled during the wait before t=9
    assert_eq!(backend.calls_to("talk_status").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_request() {
    let backend = ScriptedBackend::new().delayed("talk_status", Duration::from_secs(60));
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = poll_until_done(&backend, TALK_ID, INTERVAL, &token).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}
