//! Session configuration

use std::time::Duration;

use paylaugh_core::{
    BillingConfig, FrameSize, PaylaughError, PaylaughResult, IDEAL_FRAME_HEIGHT, IDEAL_FRAME_WIDTH,
};
use serde::Serialize;

/// Default location of the expression model assets
pub const MODELS_URL: &str = "https://justadudewhohacks.github.io/face-api.js/models";

/// Detection polling period
pub const POLL_INTERVAL_MS: u64 = 150;

/// How long the celebration overlay stays up after a billed laugh
pub const CELEBRATION_MS: u64 = 1500;

/// How long `stop` waits for an in-flight inference before aborting the poller
pub const TEARDOWN_GRACE_MS: u64 = 2000;

/// Options forwarded to the face detector on every call
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DetectorOptions {
    /// Detector input resolution; must be a multiple of 32
    pub input_size: u32,
    /// Minimum face confidence for a detection to be reported
    pub score_threshold: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        DetectorOptions {
            input_size: 416,
            score_threshold: 0.5,
        }
    }
}

/// Capture constraints passed to the camera
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        CaptureConstraints {
            ideal_width: IDEAL_FRAME_WIDTH,
            ideal_height: IDEAL_FRAME_HEIGHT,
        }
    }
}

impl CaptureConstraints {
    pub fn ideal_size(&self) -> FrameSize {
        FrameSize::new(self.ideal_width, self.ideal_height)
    }
}

/// Session configuration
#[derive(Clone, Debug, Serialize)]
pub struct SessionConfig {
    /// Pricing, threshold and cooldown
    pub billing: BillingConfig,
    /// Polling period of the detection loop
    pub poll_interval: Duration,
    /// Celebration overlay duration
    pub celebration: Duration,
    /// Upper bound on waiting for in-flight inference at teardown
    pub teardown_grace: Duration,
    /// Base location of the model assets
    pub model_base_uri: String,
    pub capture: CaptureConstraints,
    pub detector: DetectorOptions,
    /// Overlay surface size; defaults to the stream's frame size
    pub display_size: Option<FrameSize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            billing: BillingConfig::default(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            celebration: Duration::from_millis(CELEBRATION_MS),
            teardown_grace: Duration::from_millis(TEARDOWN_GRACE_MS),
            model_base_uri: MODELS_URL.to_string(),
            capture: CaptureConstraints::default(),
            detector: DetectorOptions::default(),
            display_size: None,
        }
    }
}

impl SessionConfig {
    /// Lower ceiling and shorter cooldown; for demonstrations
    pub fn short_show() -> Self {
        SessionConfig {
            billing: BillingConfig::short_show(),
            ..Default::default()
        }
    }

    pub fn with_billing(mut self, billing: BillingConfig) -> Self {
        self.billing = billing;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_model_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.model_base_uri = uri.into();
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> PaylaughResult<()> {
        self.billing.validate()?;

        if self.poll_interval.is_zero() {
            return Err(PaylaughError::InvalidConfig(
                "poll interval must be non-zero".into(),
            ));
        }
        if self.model_base_uri.trim().is_empty() {
            return Err(PaylaughError::InvalidConfig(
                "model base location is empty".into(),
            ));
        }
        if self.detector.input_size == 0 || self.detector.input_size % 32 != 0 {
            return Err(PaylaughError::InvalidConfig(format!(
                "detector input size {} is not a positive multiple of 32",
                self.detector.input_size
            )));
        }
        if !(0.0..1.0).contains(&self.detector.score_threshold) {
            return Err(PaylaughError::InvalidConfig(format!(
                "detector score threshold {} outside [0, 1)",
                self.detector.score_threshold
            )));
        }
        if self.capture.ideal_width == 0 || self.capture.ideal_height == 0 {
            return Err(PaylaughError::InvalidConfig(
                "capture size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
