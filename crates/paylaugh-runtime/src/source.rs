//! Expression source boundary
//!
//! The face/expression model is external. The runtime only needs two
//! operations from it, so it is modelled as a capability that tests replace
//! with scripted doubles.

use std::future::Future;

use paylaugh_core::{Detection, PaylaughResult};

use crate::{DetectorOptions, VideoFrame};

/// Capability interface over an external face/expression detector
pub trait ExpressionSource: Send + 'static {
    /// Fetch the detector and expression model assets from `base_uri`
    ///
    /// Fails with `ResourceLoadFailure` when the assets cannot be fetched.
    fn load_models(&mut self, base_uri: &str) -> impl Future<Output = PaylaughResult<()>> + Send;

    /// Detect every face in `frame` and score its expressions
    ///
    /// Errors here are transient: the poller logs them and retries on the
    /// next tick.
    fn detect_all(
        &mut self,
        frame: &VideoFrame,
        options: &DetectorOptions,
    ) -> impl Future<Output = PaylaughResult<Vec<Detection>>> + Send;
}
