//! Detections - what the external expression detector reports per face
//!
//! The detector itself lives outside this workspace. These types are the
//! boundary shape of its results, plus the reduced per-face sample the
//! billing reducer consumes.

use serde::Serialize;

/// Ideal capture width requested from the camera
pub const IDEAL_FRAME_WIDTH: u32 = 640;
/// Ideal capture height requested from the camera
pub const IDEAL_FRAME_HEIGHT: u32 = 480;

/// Pixel dimensions of a video frame or display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        FrameSize { width, height }
    }

    /// The 640×480 size requested at capture time
    pub const fn ideal() -> Self {
        FrameSize::new(IDEAL_FRAME_WIDTH, IDEAL_FRAME_HEIGHT)
    }

    /// Replace zero dimensions (stream metadata not yet known) with the ideal size
    pub fn or_ideal(self) -> Self {
        FrameSize {
            width: if self.width == 0 { IDEAL_FRAME_WIDTH } else { self.width },
            height: if self.height == 0 { IDEAL_FRAME_HEIGHT } else { self.height },
        }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        FrameSize::ideal()
    }
}

/// Axis-aligned face box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        BoundingBox { x, y, width, height }
    }

    /// Rescale from the detector's frame size to a display size
    pub fn rescale(&self, from: FrameSize, to: FrameSize) -> BoundingBox {
        let from = from.or_ideal();
        let to = to.or_ideal();
        let sx = to.width as f32 / from.width as f32;
        let sy = to.height as f32 / from.height as f32;

        BoundingBox {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// Expression probabilities for one face, each in [0.0 - 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExpressionScores {
    pub neutral: f32,
    pub happy: f32,
    pub sad: f32,
    pub angry: f32,
    pub fearful: f32,
    pub disgusted: f32,
    pub surprised: f32,
}

impl ExpressionScores {
    /// Face that is happy with probability `p`, neutral otherwise
    pub fn happy(p: f32) -> Self {
        let p = clamp_probability(p);
        ExpressionScores {
            neutral: 1.0 - p,
            happy: p,
            ..Default::default()
        }
    }

    /// Dominant expression
    pub fn dominant(&self) -> (&'static str, f32) {
        let expressions = [
            ("neutral", self.neutral),
            ("happy", self.happy),
            ("sad", self.sad),
            ("angry", self.angry),
            ("fearful", self.fearful),
            ("disgusted", self.disgusted),
            ("surprised", self.surprised),
        ];

        expressions
            .iter()
            .copied()
            .filter(|(_, v)| !v.is_nan())
            .fold(("neutral", 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
    }
}

/// Clamp a detector probability into [0, 1]; NaN becomes 0
#[inline]
pub fn clamp_probability(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// One detected face as reported by the expression source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub expressions: ExpressionScores,
}

impl Detection {
    pub fn new(bounding_box: BoundingBox, expressions: ExpressionScores) -> Self {
        Detection {
            bounding_box,
            expressions,
        }
    }

    /// Reduce to the sample the billing reducer consumes
    pub fn to_sample(&self) -> DetectionSample {
        DetectionSample::new(self.bounding_box, self.expressions.happy)
    }
}

/// Per-frame, per-face input to the billing reducer
/// INVARIANT: happy_probability is always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionSample {
    pub bounding_box: BoundingBox,
    happy_probability: f32,
}

impl DetectionSample {
    pub fn new(bounding_box: BoundingBox, happy_probability: f32) -> Self {
        DetectionSample {
            bounding_box,
            happy_probability: clamp_probability(happy_probability),
        }
    }

    /// Sample with no meaningful box, for driving the reducer directly
    pub fn with_probability(happy_probability: f32) -> Self {
        Self::new(BoundingBox::default(), happy_probability)
    }

    #[inline]
    pub fn happy_probability(&self) -> f32 {
        self.happy_probability
    }

    /// Probability as a rounded percentage, as shown on overlay labels
    pub fn happy_percent(&self) -> u8 {
        (self.happy_probability * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_clamps_probability() {
        assert_eq!(DetectionSample::with_probability(1.7).happy_probability(), 1.0);
        assert_eq!(DetectionSample::with_probability(-0.2).happy_probability(), 0.0);
        assert_eq!(DetectionSample::with_probability(f32::NAN).happy_probability(), 0.0);
    }

    #[test]
    fn test_happy_percent_rounds() {
        assert_eq!(DetectionSample::with_probability(0.926).happy_percent(), 93);
        assert_eq!(DetectionSample::with_probability(0.124).happy_percent(), 12);
    }

    #[test]
    fn test_dominant_expression() {
        let mut scores = ExpressionScores::happy(0.7);
        assert_eq!(scores.dominant().0, "happy");

        scores.surprised = 0.9;
        assert_eq!(scores.dominant(), ("surprised", 0.9));

        assert_eq!(ExpressionScores::default().dominant().0, "neutral");
    }

    #[test]
    fn test_detection_to_sample() {
        let det = Detection::new(
            BoundingBox::new(10.0, 20.0, 100.0, 120.0),
            ExpressionScores::happy(0.9),
        );
        let sample = det.to_sample();
        assert_eq!(sample.happy_probability(), 0.9);
        assert_eq!(sample.bounding_box.width, 100.0);
    }

    #[test]
    fn test_rescale_box() {
        let b = BoundingBox::new(32.0, 24.0, 64.0, 48.0);
        let scaled = b.rescale(FrameSize::new(320, 240), FrameSize::new(640, 480));
        assert_eq!(scaled, BoundingBox::new(64.0, 48.0, 128.0, 96.0));
    }

    #[test]
    fn test_zero_size_falls_back_to_ideal() {
        assert_eq!(FrameSize::new(0, 0).or_ideal(), FrameSize::ideal());
        assert_eq!(FrameSize::new(1280, 0).or_ideal(), FrameSize::new(1280, 480));
    }
}
