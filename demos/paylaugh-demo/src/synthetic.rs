//! Synthetic camera and detector
//!
//! Stand-ins for a webcam and a face/expression model. The audience's mood
//! is driven from the keyboard so the billing can be watched live.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use paylaugh_core::{
    BoundingBox, Detection, ExpressionScores, FrameSize, PaylaughError, PaylaughResult,
};
use paylaugh_runtime::{
    Camera, CaptureConstraints, DetectorOptions, ExpressionSource, MediaStream, VideoFrame,
};

/// Shared audience mood
#[derive(Clone, Default)]
pub struct Mood {
    /// Ticks of laughter left
    laughing: Arc<AtomicU32>,
}

impl Mood {
    /// Make the audience laugh for the next `ticks` detections
    pub fn burst(&self, ticks: u32) {
        self.laughing.store(ticks, Ordering::SeqCst);
    }

    fn take_tick(&self) -> bool {
        self.laughing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Detector that reads the audience's mood
pub struct SyntheticDetector {
    mood: Mood,
    rng: StdRng,
    faces: usize,
}

impl SyntheticDetector {
    pub fn new(mood: Mood, faces: usize, seed: u64) -> Self {
        SyntheticDetector {
            mood,
            rng: StdRng::seed_from_u64(seed),
            faces: faces.max(1),
        }
    }

    fn face(&mut self, index: usize, laughing: bool) -> Detection {
        let happy = if laughing {
            self.rng.gen_range(0.86..=0.99)
        } else if self.rng.gen_bool(0.02) {
            // Spontaneous chuckle
            self.rng.gen_range(0.86..=0.95)
        } else {
            self.rng.gen_range(0.02..0.55)
        };
        let jitter: f32 = self.rng.gen_range(-4.0..4.0);

        Detection::new(
            BoundingBox::new(60.0 + index as f32 * 190.0 + jitter, 140.0 + jitter, 150.0, 170.0),
            ExpressionScores::happy(happy),
        )
    }
}

impl ExpressionSource for SyntheticDetector {
    async fn load_models(&mut self, base_uri: &str) -> PaylaughResult<()> {
        tracing::debug!(base_uri, "loading synthetic models");
        tokio::time::sleep(Duration::from_millis(600)).await;
        Ok(())
    }

    fn detect_all(
        &mut self,
        _frame: &VideoFrame,
        _options: &DetectorOptions,
    ) -> impl Future<Output = PaylaughResult<Vec<Detection>>> + Send {
        let latency = Duration::from_millis(self.rng.gen_range(15..60));
        let result = if self.rng.gen_bool(0.01) {
            Err(PaylaughError::InferenceFailed(
                "synthetic backend dropped a frame".into(),
            ))
        } else {
            let laughing = self.mood.take_tick();
            Ok((0..self.faces).map(|i| self.face(i, laughing)).collect())
        };

        async move {
            tokio::time::sleep(latency).await;
            result
        }
    }
}

/// Video controls shared with the keyboard loop
#[derive(Clone, Default)]
pub struct VideoControl {
    paused: Arc<AtomicBool>,
}

impl VideoControl {
    /// Toggle pause; returns true if now paused
    pub fn toggle(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Camera that asks "the user" for permission
pub struct SyntheticCamera {
    granted: bool,
    video: VideoControl,
}

impl SyntheticCamera {
    pub fn new(granted: bool, video: VideoControl) -> Self {
        SyntheticCamera { granted, video }
    }
}

impl Camera for SyntheticCamera {
    type Stream = SyntheticStream;

    async fn request_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> PaylaughResult<SyntheticStream> {
        tokio::time::sleep(Duration::from_millis(300)).await;
        if !self.granted {
            return Err(PaylaughError::PermissionDenied);
        }

        Ok(SyntheticStream {
            video: self.video.clone(),
            size: constraints.ideal_size(),
            sequence: 0,
            stopped: false,
        })
    }
}

pub struct SyntheticStream {
    video: VideoControl,
    size: FrameSize,
    sequence: u64,
    stopped: bool,
}

impl MediaStream for SyntheticStream {
    fn is_playing(&self) -> bool {
        !self.stopped && !self.video.paused.load(Ordering::SeqCst)
    }

    fn current_frame(&mut self) -> Option<VideoFrame> {
        self.sequence += 1;
        Some(VideoFrame::new(self.sequence, self.size))
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn stop(&mut self) {
        self.stopped = true;
        tracing::debug!(frames = self.sequence, "synthetic camera stopped");
    }
}
