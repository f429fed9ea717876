//! Scripted capability doubles
//!
//! Every double is a cheap handle over shared state: keep a clone in the test
//! and move the other into the controller, then inspect what happened.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use paylaugh_core::{
    BoundingBox, Detection, ExpressionScores, FrameSize, PaylaughError, PaylaughResult,
};
use paylaugh_runtime::{
    Camera, CaptureConstraints, DetectorOptions, ExpressionSource, MediaStream, RenderFrame,
    RenderSink, SessionFailure, SessionStatus, VideoFrame,
};

// ============================================================================
// EXPRESSION SOURCE
// ============================================================================

/// One scripted answer of the detector
#[derive(Debug, Clone)]
pub struct ScriptStep {
    /// Simulated inference latency
    pub delay: Duration,
    pub result: PaylaughResult<Vec<Detection>>,
}

impl ScriptStep {
    pub fn faces(detections: Vec<Detection>) -> Self {
        ScriptStep {
            delay: Duration::ZERO,
            result: Ok(detections),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ScriptStep {
            delay: Duration::ZERO,
            result: Err(PaylaughError::InferenceFailed(message.into())),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<ScriptStep>,
    load_error: Option<PaylaughError>,
    loaded_from: Option<String>,
    calls: u64,
}

/// Detector double answering from a queue of scripted steps
///
/// Once the queue is empty every call reports no faces.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExpressionSource {
    script: Arc<Mutex<Script>>,
}

/// A single face with the given happy probability
pub fn face(happy: f32) -> Detection {
    Detection::new(
        BoundingBox::new(200.0, 120.0, 160.0, 160.0),
        ExpressionScores::happy(happy),
    )
}

impl ScriptedExpressionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose model loading fails with `err`
    pub fn failing_load(err: PaylaughError) -> Self {
        let source = Self::new();
        source.script.lock().load_error = Some(err);
        source
    }

    pub fn push(&self, step: ScriptStep) -> &Self {
        self.script.lock().steps.push_back(step);
        self
    }

    /// Queue one frame with a single face
    pub fn push_happy(&self, happy: f32) -> &Self {
        self.push(ScriptStep::faces(vec![face(happy)]))
    }

    /// Queue one frame with one face per probability
    pub fn push_crowd(&self, happy: &[f32]) -> &Self {
        self.push(ScriptStep::faces(happy.iter().map(|&p| face(p)).collect()))
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(ScriptStep::failure(message))
    }

    /// Number of `detect_all` calls so far
    pub fn calls(&self) -> u64 {
        self.script.lock().calls
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().steps.len()
    }

    /// Location `load_models` was called with
    pub fn loaded_from(&self) -> Option<String> {
        self.script.lock().loaded_from.clone()
    }
}

impl ExpressionSource for ScriptedExpressionSource {
    async fn load_models(&mut self, base_uri: &str) -> PaylaughResult<()> {
        let mut script = self.script.lock();
        script.loaded_from = Some(base_uri.to_string());
        script.load_error.clone().map_or(Ok(()), Err)
    }

    fn detect_all(
        &mut self,
        _frame: &VideoFrame,
        _options: &DetectorOptions,
    ) -> impl Future<Output = PaylaughResult<Vec<Detection>>> + Send {
        let step = {
            let mut script = self.script.lock();
            script.calls += 1;
            script.steps.pop_front()
        };

        async move {
            let Some(step) = step else {
                return Ok(Vec::new());
            };
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
            step.result
        }
    }
}

// ============================================================================
// CAMERA
// ============================================================================

/// How the scripted camera answers a stream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraBehavior {
    Grant,
    Deny,
    Unavailable(String),
}

#[derive(Debug, Default)]
struct StreamShared {
    paused: AtomicBool,
    requests: AtomicUsize,
    stops: AtomicUsize,
    frames: AtomicU64,
}

/// Test-side control over the scripted camera and its stream
#[derive(Debug, Clone, Default)]
pub struct StreamControl {
    shared: Arc<StreamShared>,
}

impl StreamControl {
    /// Pause the video; the poller must stop calling the detector
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.shared.requests.load(Ordering::SeqCst)
    }

    /// How many times the stream was stopped
    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }

    /// Frames handed to the poller
    pub fn frames_served(&self) -> u64 {
        self.shared.frames.load(Ordering::SeqCst)
    }
}

/// Camera double
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    behavior: CameraBehavior,
    /// Reported size; the requested ideal size when `None`
    size: Option<FrameSize>,
    control: StreamControl,
}

impl ScriptedCamera {
    pub fn new(behavior: CameraBehavior) -> Self {
        ScriptedCamera {
            behavior,
            size: None,
            control: StreamControl::default(),
        }
    }

    pub fn granting() -> Self {
        Self::new(CameraBehavior::Grant)
    }

    pub fn denying() -> Self {
        Self::new(CameraBehavior::Deny)
    }

    pub fn unavailable(reason: &str) -> Self {
        Self::new(CameraBehavior::Unavailable(reason.to_string()))
    }

    pub fn with_size(mut self, size: FrameSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn control(&self) -> StreamControl {
        self.control.clone()
    }
}

impl Camera for ScriptedCamera {
    type Stream = ScriptedStream;

    async fn request_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> PaylaughResult<ScriptedStream> {
        self.control.shared.requests.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            CameraBehavior::Grant => Ok(ScriptedStream {
                control: self.control.clone(),
                size: self.size.unwrap_or_else(|| constraints.ideal_size()),
                sequence: 0,
            }),
            CameraBehavior::Deny => Err(PaylaughError::PermissionDenied),
            CameraBehavior::Unavailable(reason) => {
                Err(PaylaughError::DeviceUnavailable(reason.clone()))
            }
        }
    }
}

/// Stream handed out by [`ScriptedCamera`]
#[derive(Debug)]
pub struct ScriptedStream {
    control: StreamControl,
    size: FrameSize,
    sequence: u64,
}

impl MediaStream for ScriptedStream {
    fn is_playing(&self) -> bool {
        let shared = &self.control.shared;
        !shared.paused.load(Ordering::SeqCst) && shared.stops.load(Ordering::SeqCst) == 0
    }

    fn current_frame(&mut self) -> Option<VideoFrame> {
        self.sequence += 1;
        self.control.shared.frames.fetch_add(1, Ordering::SeqCst);
        Some(VideoFrame::new(self.sequence, self.size))
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn stop(&mut self) {
        self.control.shared.stops.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// RENDERER
// ============================================================================

/// Everything a [`RecordingRenderer`] received
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    pub frames: Vec<RenderFrame>,
    pub errors: Vec<SessionFailure>,
    pub statuses: Vec<SessionStatus>,
}

/// Render sink that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<RenderLog>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RenderLog {
        self.log.lock().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.log.lock().frames.len()
    }

    pub fn last_frame(&self) -> Option<RenderFrame> {
        self.log.lock().frames.last().cloned()
    }

    pub fn errors(&self) -> Vec<SessionFailure> {
        self.log.lock().errors.clone()
    }

    pub fn statuses(&self) -> Vec<SessionStatus> {
        self.log.lock().statuses.clone()
    }
}

impl RenderSink for RecordingRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        self.log.lock().frames.push(frame.clone());
    }

    fn show_error(&mut self, failure: &SessionFailure) {
        self.log.lock().errors.push(failure.clone());
    }

    fn status_changed(&mut self, status: SessionStatus) {
        self.log.lock().statuses.push(status);
    }
}
