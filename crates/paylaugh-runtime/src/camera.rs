//! Camera boundary and stream ownership

use std::future::Future;

use paylaugh_core::{FrameSize, PaylaughResult};
use serde::Serialize;

use crate::CaptureConstraints;

/// Handle on the current video frame
///
/// Pixel data stays with the capture backend; the detector receives this
/// handle and resolves it against its own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoFrame {
    /// Frame counter of the stream
    pub sequence: u64,
    /// Dimensions the detector sees
    pub size: FrameSize,
}

impl VideoFrame {
    pub fn new(sequence: u64, size: FrameSize) -> Self {
        VideoFrame { sequence, size }
    }
}

/// A live capture stream
pub trait MediaStream: Send + 'static {
    /// False while the video is paused or has ended
    fn is_playing(&self) -> bool;

    /// Latest frame, if one is available
    fn current_frame(&mut self) -> Option<VideoFrame>;

    /// Reported video dimensions; zero when not yet known
    fn frame_size(&self) -> FrameSize;

    /// Stop every track of the stream, releasing the device
    fn stop(&mut self);
}

/// Capability interface over the camera
pub trait Camera: Send + 'static {
    type Stream: MediaStream;

    /// Ask for a stream close to the given constraints
    ///
    /// Fails with `PermissionDenied` when the user declines and with
    /// `DeviceUnavailable` when there is no usable device.
    fn request_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> impl Future<Output = PaylaughResult<Self::Stream>> + Send;
}

/// Owns a stream and stops it exactly once, on `release` or on drop
pub struct StreamGuard<M: MediaStream> {
    stream: Option<M>,
}

impl<M: MediaStream> StreamGuard<M> {
    pub fn new(stream: M) -> Self {
        StreamGuard {
            stream: Some(stream),
        }
    }

    pub fn get(&self) -> Option<&M> {
        self.stream.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut M> {
        self.stream.as_mut()
    }

    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    /// Stop the stream. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop();
                tracing::info!("camera stream released");
                true
            }
            None => false,
        }
    }
}

impl<M: MediaStream> Drop for StreamGuard<M> {
    fn drop(&mut self) {
        self.release();
    }
}
