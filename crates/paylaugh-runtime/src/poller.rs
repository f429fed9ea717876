//! Detection polling task
//!
//! One task per running session. It owns the expression source, the camera
//! stream and the billing reducer, so every tick is serialized and the
//! reducer has a single writer. The controller talks to it through a watch
//! channel and reads its output through shared, lock-protected snapshots.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use paylaugh_billing::LaughMeter;
use paylaugh_core::{Clock, Detection, DetectionSample, SessionId, SessionStats};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    build_overlays, CelebrationTimer, ExpressionSource, MediaStream, RenderFrame, RenderSink,
    SessionConfig, SessionStatus, StreamGuard,
};

/// Counters kept by the polling task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    /// Interval ticks observed
    pub ticks: u64,
    /// Ticks skipped because the video was paused or ended
    pub skipped_not_playing: u64,
    /// Ticks skipped because no frame was available yet
    pub skipped_no_frame: u64,
    /// Detector calls made
    pub inference_calls: u64,
    /// Detector calls that failed and were skipped
    pub inference_errors: u64,
    /// Faces handed to the reducer
    pub samples_evaluated: u64,
    pub laughs_billed: u64,
    /// Detector results that completed after shutdown was requested
    pub discarded_after_teardown: u64,
    /// Wall time of the last completed tick, inference included
    pub last_tick: Duration,
}

/// Read-only handle on a session's live statistics
///
/// Cheap to clone; every clone observes the same session.
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    stats: Arc<RwLock<SessionStats>>,
    poll: Arc<RwLock<PollStats>>,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current billing statistics
    pub fn stats(&self) -> SessionStats {
        *self.stats.read()
    }

    /// Current polling counters
    pub fn poll_stats(&self) -> PollStats {
        *self.poll.read()
    }

    fn set_stats(&self, stats: SessionStats) {
        *self.stats.write() = stats;
    }

    fn record(&self, f: impl FnOnce(&mut PollStats)) {
        f(&mut self.poll.write());
    }
}

/// Everything a polling task takes ownership of
pub(crate) struct PollTask<S, M, R>
where
    S: ExpressionSource,
    M: MediaStream,
    R: RenderSink,
{
    pub session: SessionId,
    pub config: SessionConfig,
    pub source: S,
    pub stream: StreamGuard<M>,
    pub meter: LaughMeter,
    pub renderer: Arc<Mutex<R>>,
    pub clock: Arc<dyn Clock>,
    pub view: StatsView,
}

impl<S, M, R> PollTask<S, M, R>
where
    S: ExpressionSource,
    M: MediaStream,
    R: RenderSink,
{
    /// Spawn the task on the current tokio runtime
    pub fn spawn(self) -> PollerHandle {
        let (shutdown, rx) = watch::channel(false);
        let grace = self.config.teardown_grace;
        let task = tokio::spawn(self.run(rx));

        PollerHandle {
            shutdown,
            task: Some(task),
            grace,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut celebration = CelebrationTimer::new(self.config.celebration);

        tracing::info!(
            session = %self.session,
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "detection polling started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            if self.tick(&shutdown, &mut celebration).await.is_break() {
                break;
            }
        }

        self.stream.release();
        tracing::info!(session = %self.session, "detection polling stopped");
    }

    async fn tick(
        &mut self,
        shutdown: &watch::Receiver<bool>,
        celebration: &mut CelebrationTimer,
    ) -> ControlFlow<()> {
        let started = Instant::now();
        self.view.record(|p| p.ticks += 1);

        let frame = match self.stream.get_mut() {
            Some(stream) if stream.is_playing() => stream.current_frame(),
            Some(_) => {
                self.view.record(|p| p.skipped_not_playing += 1);
                return ControlFlow::Continue(());
            }
            None => return ControlFlow::Break(()),
        };
        let Some(frame) = frame else {
            self.view.record(|p| p.skipped_no_frame += 1);
            return ControlFlow::Continue(());
        };

        self.view.record(|p| p.inference_calls += 1);
        let result = self.source.detect_all(&frame, &self.config.detector).await;

        if *shutdown.borrow() {
            self.view.record(|p| p.discarded_after_teardown += 1);
            tracing::debug!(session = %self.session, "discarding detections finished after stop");
            return ControlFlow::Break(());
        }

        let detections = match result {
            Ok(detections) => detections,
            Err(e) => {
                tracing::warn!(session = %self.session, error = %e, "inference failed, skipping tick");
                self.view.record(|p| p.inference_errors += 1);
                return ControlFlow::Continue(());
            }
        };

        let samples: Vec<DetectionSample> = detections.iter().map(Detection::to_sample).collect();
        let now = self.clock.now();
        let outcome = self.meter.evaluate_frame(&samples, now);
        self.view.set_stats(outcome.stats);

        if let Some(laugh) = outcome.laugh() {
            celebration.trigger(laugh);
        }

        let display_size = self.config.display_size.unwrap_or_else(|| {
            self.stream
                .get()
                .map(MediaStream::frame_size)
                .unwrap_or_default()
                .or_ideal()
        });
        let render = RenderFrame {
            session: self.session,
            at: now,
            status: SessionStatus::Running,
            stats: outcome.stats,
            overlays: build_overlays(&outcome, frame.size.or_ideal(), display_size),
            celebration: celebration.active(now),
            display_size,
        };
        self.renderer.lock().render(&render);

        let elapsed = started.elapsed();
        self.view.record(|p| {
            p.samples_evaluated += samples.len() as u64;
            p.laughs_billed += u64::from(outcome.accepted);
            p.last_tick = elapsed;
        });

        ControlFlow::Continue(())
    }
}

/// Controller-side handle on a spawned polling task
///
/// Dropping the handle aborts the task, which releases the stream.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    grace: Duration,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal shutdown and wait for the task to finish
    ///
    /// An in-flight inference is awaited for at most the grace period; after
    /// that the task is aborted. Returns false if the task had to be aborted
    /// or ended abnormally.
    pub async fn shutdown(&mut self) -> bool {
        self.shutdown.send_replace(true);

        let Some(mut task) = self.task.take() else {
            return true;
        };

        match tokio::time::timeout(self.grace, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "polling task ended abnormally");
                false
            }
            Err(_) => {
                tracing::warn!(
                    grace_ms = self.grace.as_millis() as u64,
                    "polling task did not stop in time, aborting"
                );
                task.abort();
                let _ = task.await;
                false
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
