//! Render boundary

use paylaugh_core::{FrameSize, SessionId, SessionStats, SessionTime};
use serde::Serialize;

use crate::{Celebration, OverlayBox, SessionFailure, SessionStatus};

/// Everything the render layer needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub session: SessionId,
    pub at: SessionTime,
    pub status: SessionStatus,
    pub stats: SessionStats,
    pub overlays: Vec<OverlayBox>,
    pub celebration: Option<Celebration>,
    /// Surface the overlay coordinates refer to
    pub display_size: FrameSize,
}

/// Consumer of session output
///
/// Never called after the session has been torn down.
pub trait RenderSink: Send + 'static {
    /// Redraw video overlays and statistics
    fn render(&mut self, frame: &RenderFrame);

    /// Show the single fatal message of a failed session
    fn show_error(&mut self, failure: &SessionFailure);

    fn status_changed(&mut self, _status: SessionStatus) {}
}

/// Sink that only emits trace events; for headless sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl RenderSink for TracingRenderer {
    fn render(&mut self, frame: &RenderFrame) {
        tracing::trace!(
            session = %frame.session,
            faces = frame.overlays.len(),
            laughs = frame.stats.total_laughs,
            bill = %frame.stats.current_bill,
            celebrating = frame.celebration.is_some(),
            "frame"
        );
    }

    fn show_error(&mut self, failure: &SessionFailure) {
        tracing::error!(kind = ?failure.kind, "{}", failure.message());
    }

    fn status_changed(&mut self, status: SessionStatus) {
        tracing::debug!(?status, "status changed");
    }
}
