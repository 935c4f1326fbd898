use crate::e2e::helpers;

use helpers::elevenlabs_mocks::{
    audio_bytes, library_full_body, monthly_limit_body, mount_delete, mount_library,
    mount_tts_error_once, mount_tts_never, mount_tts_ok,
};
use helpers::TestContext;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use voice_batch::controllers::batch::BatchController;
use voice_batch::domain::batch::StopReason;
use voice_batch::error::AppError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn it_should_only_synthesize_voices_without_audio() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["alice", "bob"], &[("alice", "v1"), ("bob", "v2")])
        .unwrap();
    ctx.write_existing_audio(&["alice"]).unwrap();
    mount_tts_never(&ctx.server, "v1").await;
    mount_tts_ok(&ctx.server, "v2", 1).await;

    let config = ctx.config(&[]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped_existing, 1);
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].display_name, "bob");
    assert_eq!(ctx.report().unwrap(), "id,filename\nbob,bob.mp3\n");
    assert_eq!(
        std::fs::read(ctx.audio_dir().join("bob.mp3")).unwrap(),
        audio_bytes("v2")
    );
    assert_eq!(
        std::fs::read(ctx.audio_dir().join("alice.mp3")).unwrap(),
        b"old audio"
    );
}

#[tokio::test]
async fn it_should_do_nothing_when_everything_is_rendered() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["alice"], &[("alice", "v1")]).unwrap();
    ctx.write_existing_audio(&["alice"]).unwrap();
    mount_tts_never(&ctx.server, "v1").await;

    let config = ctx.config(&[]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(summary.outcomes.is_empty());
    assert!(!ctx.report_path().exists());
}

#[tokio::test]
async fn it_should_append_to_an_existing_report() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["alice", "bob"], &[("alice", "v1"), ("bob", "v2")])
        .unwrap();
    ctx.write_existing_audio(&["alice"]).unwrap();
    std::fs::write(ctx.report_path(), "id,filename\nalice,alice.mp3\n").unwrap();
    mount_tts_ok(&ctx.server, "v2", 1).await;

    let config = ctx.config(&[]).unwrap();
    BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        ctx.report().unwrap(),
        "id,filename\nalice,alice.mp3\nbob,bob.mp3\n"
    );
}

#[tokio::test]
async fn it_should_evict_and_retry_when_library_is_full_and_confirmed() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(
        &["adam", "bella", "clyde"],
        &[("adam", "v1"), ("bella", "v2"), ("clyde", "v3")],
    )
    .unwrap();
    mount_tts_ok(&ctx.server, "v1", 1).await;
    mount_tts_error_once(&ctx.server, "v2", library_full_body()).await;
    mount_tts_ok(&ctx.server, "v2", 1).await;
    mount_tts_ok(&ctx.server, "v3", 1).await;
    mount_library(&ctx.server, &["lib1", "lib2"]).await;
    // The first listed entry goes before every retried voice
    mount_delete(&ctx.server, "lib1", 2).await;

    let config = ctx.config(&[("CONFIRM_EVICTION", "yes")]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stopped, None);
    assert_eq!(summary.saved_count(), 3);
    assert_eq!(
        ctx.audio_files().unwrap(),
        vec!["adam.mp3", "bella.mp3", "clyde.mp3"]
    );

    let requests = ctx.server.received_requests().await.unwrap();
    let delete_index = requests
        .iter()
        .position(|r| r.method.as_str() == "DELETE")
        .unwrap();
    let retry_index = requests
        .iter()
        .rposition(|r| r.url.path() == "/v1/text-to-speech/v2")
        .unwrap();
    assert!(delete_index < retry_index);
}

#[tokio::test]
async fn it_should_stop_when_eviction_is_declined() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(
        &["adam", "bella", "clyde"],
        &[("adam", "v1"), ("bella", "v2"), ("clyde", "v3")],
    )
    .unwrap();
    mount_tts_ok(&ctx.server, "v1", 1).await;
    mount_tts_error_once(&ctx.server, "v2", library_full_body()).await;
    mount_tts_never(&ctx.server, "v3").await;
    mount_delete(&ctx.server, "lib1", 0).await;

    let config = ctx.config(&[("CONFIRM_EVICTION", "no")]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stopped, Some(StopReason::Declined));
    assert_eq!(ctx.report().unwrap(), "id,filename\nadam,adam.mp3\n");
}

#[tokio::test]
async fn it_should_stop_on_monthly_limit_and_keep_earlier_results() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(
        &["adam", "bella", "clyde"],
        &[("adam", "v1"), ("bella", "v2"), ("clyde", "v3")],
    )
    .unwrap();
    mount_tts_ok(&ctx.server, "v1", 1).await;
    mount_tts_error_once(&ctx.server, "v2", monthly_limit_body()).await;
    mount_tts_never(&ctx.server, "v3").await;

    let config = ctx.config(&[]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stopped, Some(StopReason::MonthlyEditLimitReached));
    assert_eq!(ctx.report().unwrap(), "id,filename\nadam,adam.mp3\n");
}

#[tokio::test]
async fn it_should_skip_unrecognized_errors_and_continue() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["adam", "bella"], &[("adam", "v1"), ("bella", "v2")])
        .unwrap();
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/v1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    mount_tts_ok(&ctx.server, "v2", 1).await;

    let config = ctx.config(&[("RECORD_FAILURES", "true")]).unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stopped, None);
    assert_eq!(
        ctx.report().unwrap(),
        "id,filename\nadam,FAILED\nbella,bella.mp3\n"
    );
}

#[tokio::test]
async fn it_should_fail_setup_when_favorites_are_missing() {
    let ctx = TestContext::new().await.unwrap();

    let config = ctx.config(&[]).unwrap();
    let result = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::VoiceSource(_)));
    assert!(err.is_setup_error());
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn it_should_not_start_when_cancelled() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["adam"], &[("adam", "v1")]).unwrap();
    mount_tts_never(&ctx.server, "v1").await;
    let token = CancellationToken::new();
    token.cancel();

    let config = ctx.config(&[]).unwrap();
    let summary = BatchController::from_config(&config, token)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stopped, Some(StopReason::Cancelled));
}

#[tokio::test]
async fn it_should_retry_local_server_until_it_answers() {
    let ctx = TestContext::new().await.unwrap();
    ctx.write_voices(&["narrator"], &[("narrator", "speaker_01")])
        .unwrap();
    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFaudio".to_vec()))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let config = ctx
        .config(&[
            ("SYNTHESIS_BACKEND", "local"),
            ("RETRY_DELAY_SECS", "0.01"),
            ("REPORT_COLUMNS", "name_local_path"),
        ])
        .unwrap();
    let summary = BatchController::from_config(&config, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.saved_count(), 1);
    let expected_path = ctx.audio_dir().join("narrator.mp3");
    assert_eq!(
        ctx.report().unwrap(),
        format!("name,local_path\nnarrator,{}\n", expected_path.display())
    );
}
