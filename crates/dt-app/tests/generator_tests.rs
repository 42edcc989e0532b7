mod common;

use std::sync::Arc;
use dt_app::AppError;
use dt_app::generator::Generator;
use common::{RESULT_URL, ScriptedBackend, media_file};

#[tokio::test]
async fn test_script_generation_sends_avatar_and_script() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new());
    let generator = Generator::new(backend.clone());

    let resp = generator
        .from_script(&media_file(dir.path(), "face.png"), "Welcome to the demo", true)
        .await
        .unwrap();

    assert_eq!(resp.video_url, RESULT_URL);
    let calls = backend.calls_to("generate");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arg, "face.png:Welcome to the demo:true");
}

#[tokio::test]
async fn test_blank_inputs_never_reach_the_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(ScriptedBackend::new());
    let generator = Generator::new(backend.clone());

    let err = generator
        .from_script(&media_file(dir.path(), "face.png"), "  \n", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Please enter a script."));

    let err = generator.from_prompt("", false).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Please enter a prompt."));

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_prompt_generation() {
    let backend = Arc::new(ScriptedBackend::new());
    let generator = Generator::new(backend.clone());

    let resp = generator.from_prompt("A fox explaining taxes", false).await.unwrap();

    assert_eq!(resp.job_id, "job-2");
    assert_eq!(resp.image_url, "https://cdn/drawn.png");
    assert_eq!(backend.calls_to("prompt_to_video")[0].arg, "A fox explaining taxes:false");
}

#[tokio::test]
async fn test_missing_avatar_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Generator::new(Arc::new(ScriptedBackend::new()));

    let err = generator
        .from_script(&dir.path().join("missing.png"), "Hello", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}
