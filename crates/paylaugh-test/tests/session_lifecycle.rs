//! Session controller lifecycle tests
//!
//! All tests run on paused tokio time: the poller ticks at 0, 150, 300, ...
//! ms after `start`, and sleeping in the test lets exactly those ticks run.

use std::time::Duration;

use paylaugh_core::{FrameSize, Money, PaylaughError};
use paylaugh_runtime::{
    FailureKind, OverlayStyle, SessionConfig, SessionController, SessionStatus,
    GENERIC_FAILURE_MESSAGE, PERMISSION_DENIED_MESSAGE,
};
use paylaugh_test::{
    RecordingRenderer, ScriptStep, ScriptedCamera, ScriptedExpressionSource, face,
};

type TestSession = SessionController<ScriptedExpressionSource, ScriptedCamera, RecordingRenderer>;

struct Harness {
    session: TestSession,
    source: ScriptedExpressionSource,
    camera: paylaugh_test::StreamControl,
    renderer: RecordingRenderer,
}

fn harness_with(config: SessionConfig, camera: ScriptedCamera) -> Harness {
    let source = ScriptedExpressionSource::new();
    let renderer = RecordingRenderer::new();
    let control = camera.control();
    let session =
        SessionController::new(config, source.clone(), camera, renderer.clone()).unwrap();

    Harness {
        session,
        source,
        camera: control,
        renderer,
    }
}

fn harness() -> Harness {
    harness_with(SessionConfig::default(), ScriptedCamera::granting())
}

async fn running() -> Harness {
    let mut h = harness();
    h.session.initialize().await.unwrap();
    h
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_full_lifecycle_bills_and_releases() {
    let mut h = running().await;
    h.source.push_happy(0.95);
    assert_eq!(h.session.status(), SessionStatus::Ready);
    assert_eq!(h.source.loaded_from().as_deref(), Some(paylaugh_runtime::MODELS_URL));

    h.session.start().await.unwrap();
    sleep_ms(10).await;

    let stats = h.session.stats();
    assert_eq!(stats.total_laughs, 1);
    assert_eq!(stats.current_bill, Money::from_cents(30));

    let frame = h.renderer.last_frame().unwrap();
    assert_eq!(frame.status, SessionStatus::Running);
    assert_eq!(frame.overlays.len(), 1);
    assert_eq!(frame.overlays[0].style, OverlayStyle::Billed);
    assert_eq!(frame.overlays[0].label, "LAUGH DETECTED! (95%)");
    assert!(frame.celebration.is_some());

    h.session.stop().await;
    assert_eq!(h.session.status(), SessionStatus::Stopped);
    assert_eq!(h.camera.stops(), 1);
    assert_eq!(
        h.renderer.statuses(),
        vec![SessionStatus::Ready, SessionStatus::Running, SessionStatus::Stopped]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let mut h = running().await;
    h.session.start().await.unwrap();
    sleep_ms(400).await;

    h.session.stop().await;
    let frames = h.renderer.frame_count();
    h.session.stop().await;
    h.session.stop().await;
    sleep_ms(1000).await;

    assert_eq!(h.camera.stops(), 1);
    assert_eq!(h.session.status(), SessionStatus::Stopped);
    // Nothing reaches the renderer after teardown
    assert_eq!(h.renderer.frame_count(), frames);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_initialize() {
    let mut h = harness();
    h.session.stop().await;

    assert_eq!(h.session.status(), SessionStatus::Stopped);
    assert_eq!(h.camera.requests(), 0);
    assert_eq!(h.camera.stops(), 0);
    assert!(matches!(
        h.session.initialize().await,
        Err(PaylaughError::InvalidTransition { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stop_without_start_releases_stream() {
    let mut h = running().await;
    h.session.stop().await;

    assert_eq!(h.camera.stops(), 1);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_stream() {
    let h = running().await;
    let control = h.camera.clone();
    drop(h);

    assert_eq!(control.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_requires_ready() {
    let mut h = harness();
    let err = h.session.start().await.unwrap_err();
    assert_eq!(err.to_string(), "Cannot start while session is initializing");

    h.session.initialize().await.unwrap();
    h.session.start().await.unwrap();
    assert!(h.session.start().await.is_err());
    h.session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_enters_error() {
    let mut h = harness_with(SessionConfig::default(), ScriptedCamera::denying());
    h.source.push_happy(0.99);

    let err = h.session.initialize().await.unwrap_err();
    assert_eq!(err, PaylaughError::PermissionDenied);
    assert_eq!(h.session.status(), SessionStatus::Error);
    assert_eq!(
        h.session.state().failure().map(|f| f.kind),
        Some(FailureKind::PermissionDenied)
    );

    assert!(h.session.start().await.is_err());
    sleep_ms(1000).await;
    h.session.stop().await;

    // Error is kept after teardown; nothing was polled or billed
    assert_eq!(h.session.status(), SessionStatus::Error);
    assert!(h.session.stats().is_zero());
    assert_eq!(h.source.calls(), 0);

    let errors = h.renderer.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), PERMISSION_DENIED_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_model_load_failure_skips_camera() {
    let source =
        ScriptedExpressionSource::failing_load(PaylaughError::ResourceLoadFailure(String::new()));
    let camera = ScriptedCamera::granting();
    let control = camera.control();
    let renderer = RecordingRenderer::new();
    let mut session =
        SessionController::new(SessionConfig::default(), source, camera, renderer.clone()).unwrap();

    let err = session.initialize().await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(session.status(), SessionStatus::Error);
    assert_eq!(control.requests(), 0);
    assert_eq!(renderer.errors()[0].message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_camera_reports_detail() {
    let mut h = harness_with(
        SessionConfig::default(),
        ScriptedCamera::unavailable("No camera found"),
    );

    let err = h.session.initialize().await.unwrap_err();
    assert_eq!(err, PaylaughError::DeviceUnavailable("No camera found".into()));
    assert_eq!(h.renderer.errors()[0].message(), "No camera found");
}

#[tokio::test(start_paused = true)]
async fn test_inference_error_is_skipped() {
    let mut h = running().await;
    h.source.push_failure("backend hiccup").push_happy(0.95);

    h.session.start().await.unwrap();
    sleep_ms(200).await;

    let poll = h.session.poll_stats();
    assert_eq!(poll.inference_errors, 1);
    assert_eq!(poll.laughs_billed, 1);
    assert_eq!(h.session.stats().total_laughs, 1);
    assert_eq!(h.session.status(), SessionStatus::Running);

    h.session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_paused_stream_is_not_polled() {
    let mut h = running().await;
    h.source.push_happy(0.95);
    h.camera.pause();

    h.session.start().await.unwrap();
    sleep_ms(500).await;

    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.camera.frames_served(), 0);
    assert!(h.session.poll_stats().skipped_not_playing >= 3);
    assert!(h.session.stats().is_zero());

    h.camera.resume();
    sleep_ms(150).await;
    assert_eq!(h.camera.frames_served(), 1);
    assert_eq!(h.session.stats().total_laughs, 1);

    h.session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_result_discarded_on_stop() {
    let mut h = running().await;
    h.source
        .push(ScriptStep::faces(vec![face(0.99)]).delayed(Duration::from_millis(1000)));

    h.session.start().await.unwrap();
    sleep_ms(100).await;
    h.session.stop().await;

    assert!(h.session.stats().is_zero());
    assert_eq!(h.session.poll_stats().discarded_after_teardown, 1);
    assert_eq!(h.renderer.frame_count(), 0);
    assert_eq!(h.camera.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stuck_inference_is_aborted_after_grace() {
    let config = SessionConfig {
        teardown_grace: Duration::from_millis(500),
        ..SessionConfig::default()
    };
    let mut h = harness_with(config, ScriptedCamera::granting());
    h.session.initialize().await.unwrap();
    h.source
        .push(ScriptStep::faces(vec![face(0.99)]).delayed(Duration::from_secs(60)));

    h.session.start().await.unwrap();
    sleep_ms(10).await;

    let started = tokio::time::Instant::now();
    h.session.stop().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(h.camera.stops(), 1);
    assert!(h.session.stats().is_zero());
    assert_eq!(h.session.status(), SessionStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_crowd_bills_once_per_tick() {
    let mut h = running().await;
    h.source.push_crowd(&[0.95, 0.97, 0.2]);

    h.session.start().await.unwrap();
    sleep_ms(10).await;

    assert_eq!(h.session.stats().total_laughs, 1);
    let frame = h.renderer.last_frame().unwrap();
    let styles: Vec<OverlayStyle> = frame.overlays.iter().map(|o| o.style).collect();
    assert_eq!(
        styles,
        vec![OverlayStyle::Billed, OverlayStyle::Laughing, OverlayStyle::Neutral]
    );

    h.session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_celebration_expires() {
    let mut h = running().await;
    h.source.push_happy(0.95);

    h.session.start().await.unwrap();
    sleep_ms(2000).await;
    h.session.stop().await;

    let frames = h.renderer.snapshot().frames;
    let (celebrating, quiet): (Vec<_>, Vec<_>) =
        frames.iter().partition(|f| f.at.as_millis() < 1500);

    assert!(!celebrating.is_empty());
    assert!(!quiet.is_empty());
    assert!(celebrating.iter().all(|f| f.celebration.is_some()));
    assert!(quiet.iter().all(|f| f.celebration.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_overlays_scaled_to_display() {
    let config = SessionConfig {
        display_size: Some(FrameSize::new(1280, 960)),
        ..SessionConfig::default()
    };
    let mut h = harness_with(config, ScriptedCamera::granting());
    h.session.initialize().await.unwrap();
    h.source.push_happy(0.3);

    h.session.start().await.unwrap();
    sleep_ms(10).await;
    h.session.stop().await;

    let frame = h.renderer.last_frame().unwrap();
    let bbox = frame.overlays[0].bounding_box;
    let original = face(0.3).bounding_box;
    assert_eq!(frame.display_size, FrameSize::new(1280, 960));
    assert_eq!(bbox.x, original.x * 2.0);
    assert_eq!(bbox.width, original.width * 2.0);
    assert_eq!(frame.overlays[0].label, "STATUS: NEUTRAL (30%)");
}

#[tokio::test(start_paused = true)]
async fn test_sessions_do_not_share_state() {
    let mut a = running().await;
    let mut b = running().await;
    a.source.push_happy(0.99);

    a.session.start().await.unwrap();
    b.session.start().await.unwrap();
    sleep_ms(10).await;

    assert_eq!(a.session.stats().total_laughs, 1);
    assert!(b.session.stats().is_zero());
    assert_ne!(a.session.id(), b.session.id());

    a.session.stop().await;
    b.session.stop().await;
}
