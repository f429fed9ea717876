//! Session lifecycle controller
//!
//! ```text
//! Initializing ──initialize()──▶ Ready ──start()──▶ Running
//!      │                                               │
//!      └──── acquisition failure ──▶ Error            stop()
//!                                                      ▼
//!                                                   Stopped
//! ```
//!
//! `stop()` is accepted in every state. A session that failed stays in
//! `Error`; the only recovery is a fresh controller.

use std::fmt;
use std::sync::Arc;

use paylaugh_billing::LaughMeter;
use paylaugh_core::{Clock, PaylaughError, PaylaughResult, SessionId, SessionStats};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::poller::PollTask;
use crate::{
    Camera, ExpressionSource, MonotonicClock, PollStats, PollerHandle, RenderSink, SessionConfig,
    StatsView, StreamGuard,
};

/// Message shown when the camera permission was refused
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Camera access denied. Please allow camera permissions and refresh.";

/// Message shown for any other acquisition failure without its own detail
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to initialize camera or AI models.";

/// Which acquisition step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    PermissionDenied,
    ResourceLoadFailure,
    DeviceUnavailable,
}

/// Fatal session failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind:?}: {detail}")]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl SessionFailure {
    /// Classify an acquisition error; `None` for errors that are not fatal
    pub fn from_error(err: &PaylaughError) -> Option<Self> {
        let (kind, detail) = match err {
            PaylaughError::PermissionDenied => (FailureKind::PermissionDenied, String::new()),
            PaylaughError::ResourceLoadFailure(d) => (FailureKind::ResourceLoadFailure, d.clone()),
            PaylaughError::DeviceUnavailable(d) => (FailureKind::DeviceUnavailable, d.clone()),
            _ => return None,
        };
        Some(SessionFailure { kind, detail })
    }

    /// The single human-readable message shown to the user
    pub fn message(&self) -> String {
        match self.kind {
            FailureKind::PermissionDenied => PERMISSION_DENIED_MESSAGE.to_string(),
            _ if self.detail.trim().is_empty() => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => self.detail.clone(),
        }
    }

    pub fn to_error(&self) -> PaylaughError {
        match self.kind {
            FailureKind::PermissionDenied => PaylaughError::PermissionDenied,
            FailureKind::ResourceLoadFailure => {
                PaylaughError::ResourceLoadFailure(self.detail.clone())
            }
            FailureKind::DeviceUnavailable => PaylaughError::DeviceUnavailable(self.detail.clone()),
        }
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Ready,
    Running,
    Error(SessionFailure),
    Stopped,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Initializing => SessionStatus::Initializing,
            SessionState::Ready => SessionStatus::Ready,
            SessionState::Running => SessionStatus::Running,
            SessionState::Error(_) => SessionStatus::Error,
            SessionState::Stopped => SessionStatus::Stopped,
        }
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        match self {
            SessionState::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Payload-free session state, for render frames and status bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionStatus {
    Initializing,
    Ready,
    Running,
    Error,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Initializing => "initializing",
            SessionStatus::Ready => "ready",
            SessionStatus::Running => "running",
            SessionStatus::Error => "error",
            SessionStatus::Stopped => "stopped",
        }
    }

    /// "System: Active" on the dashboard, once camera and models are up
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Ready | SessionStatus::Running)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle controller
///
/// Acquires the model and the camera, runs the detection polling task and
/// tears everything down again. One controller is one session; its
/// statistics start at zero and are discarded with it.
pub struct SessionController<S, C, R>
where
    S: ExpressionSource,
    C: Camera,
    R: RenderSink,
{
    id: SessionId,
    config: SessionConfig,
    state: SessionState,
    camera: C,
    source: Option<S>,
    stream: Option<StreamGuard<C::Stream>>,
    renderer: Arc<Mutex<R>>,
    clock: Arc<dyn Clock>,
    view: StatsView,
    poller: Option<PollerHandle>,
}

impl<S, C, R> SessionController<S, C, R>
where
    S: ExpressionSource,
    C: Camera,
    R: RenderSink,
{
    /// Create a session on the monotonic runtime clock
    pub fn new(config: SessionConfig, source: S, camera: C, renderer: R) -> PaylaughResult<Self> {
        Self::with_clock(config, source, camera, renderer, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        config: SessionConfig,
        source: S,
        camera: C,
        renderer: R,
        clock: Arc<dyn Clock>,
    ) -> PaylaughResult<Self> {
        config.validate()?;

        let id = SessionId::next();
        tracing::debug!(session = %id, "session created");

        Ok(SessionController {
            id,
            config,
            state: SessionState::Initializing,
            camera,
            source: Some(source),
            stream: None,
            renderer: Arc::new(Mutex::new(renderer)),
            clock,
            view: StatsView::new(),
            poller: None,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Live billing statistics
    pub fn stats(&self) -> SessionStats {
        self.view.stats()
    }

    pub fn poll_stats(&self) -> PollStats {
        self.view.poll_stats()
    }

    /// Cloneable read-only handle on the live statistics
    pub fn stats_view(&self) -> StatsView {
        self.view.clone()
    }

    /// Shared handle on the render sink
    pub fn renderer(&self) -> Arc<Mutex<R>> {
        Arc::clone(&self.renderer)
    }

    /// Load the model assets, then acquire the camera
    ///
    /// Any failure is fatal: the session moves to `Error`, the render sink
    /// shows one message, and the error is returned.
    pub async fn initialize(&mut self) -> PaylaughResult<()> {
        self.require(SessionStatus::Initializing, "initialize")?;

        let Some(source) = self.source.as_mut() else {
            return Err(self.transition_error("initialize"));
        };

        tracing::info!(session = %self.id, uri = %self.config.model_base_uri, "loading models");
        if let Err(e) = source.load_models(&self.config.model_base_uri).await {
            let e = match e {
                e if e.is_fatal() => e,
                other => PaylaughError::ResourceLoadFailure(other.to_string()),
            };
            return Err(self.fail(e));
        }
        tracing::info!(session = %self.id, "models loaded");

        let stream = match self.camera.request_stream(self.config.capture).await {
            Ok(stream) => stream,
            Err(e) => {
                let e = match e {
                    e if e.is_fatal() => e,
                    other => PaylaughError::DeviceUnavailable(other.to_string()),
                };
                return Err(self.fail(e));
            }
        };
        self.stream = Some(StreamGuard::new(stream));

        self.set_state(SessionState::Ready);
        Ok(())
    }

    /// Start detection polling
    pub async fn start(&mut self) -> PaylaughResult<()> {
        self.require(SessionStatus::Ready, "start")?;

        let (source, stream) = match (self.source.take(), self.stream.take()) {
            (Some(source), Some(stream)) => (source, stream),
            (source, stream) => {
                self.source = source;
                self.stream = stream;
                return Err(self.transition_error("start"));
            }
        };

        let task = PollTask {
            session: self.id,
            config: self.config.clone(),
            source,
            stream,
            meter: LaughMeter::with_config(self.config.billing),
            renderer: Arc::clone(&self.renderer),
            clock: Arc::clone(&self.clock),
            view: self.view.clone(),
        };
        self.poller = Some(task.spawn());

        self.set_state(SessionState::Running);
        Ok(())
    }

    /// Tear the session down
    ///
    /// Stops polling, waits (bounded) for an in-flight inference and drops its
    /// result, and releases the camera stream. Safe in any state and safe to
    /// call repeatedly.
    pub async fn stop(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            if !poller.shutdown().await {
                tracing::warn!(session = %self.id, "polling task was aborted during teardown");
            }
        }
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }

        match self.state {
            SessionState::Stopped | SessionState::Error(_) => {}
            _ => self.set_state(SessionState::Stopped),
        }
    }

    fn require(&self, expected: SessionStatus, action: &'static str) -> PaylaughResult<()> {
        if self.status() == expected {
            Ok(())
        } else {
            Err(self.transition_error(action))
        }
    }

    fn transition_error(&self, action: &'static str) -> PaylaughError {
        PaylaughError::InvalidTransition {
            from: self.status().as_str(),
            action,
        }
    }

    fn fail(&mut self, err: PaylaughError) -> PaylaughError {
        if let Some(failure) = SessionFailure::from_error(&err) {
            tracing::error!(session = %self.id, error = %err, "session initialization failed");
            self.renderer.lock().show_error(&failure);
            self.set_state(SessionState::Error(failure));
        }
        err
    }

    fn set_state(&mut self, state: SessionState) {
        let status = state.status();
        tracing::info!(session = %self.id, from = %self.status(), to = %status, "session state changed");
        self.state = state;
        self.renderer.lock().status_changed(status);
    }
}

impl<S, C, R> fmt::Debug for SessionController<S, C, R>
where
    S: ExpressionSource,
    C: Camera,
    R: RenderSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("stats", &self.view.stats())
            .finish_non_exhaustive()
    }
}
