//! Per-frame evaluation
//!
//! One polling tick yields zero or more faces. All of them share the tick's
//! timestamp, so with a non-zero cooldown at most one of them can be billed.
//! A zero cooldown bills every face above the threshold.

use paylaugh_core::{DetectionSample, LaughEvent, SessionStats, SessionTime};

use crate::{LaughMeter, Verdict};

/// Verdict for one face in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVerdict {
    pub sample: DetectionSample,
    pub verdict: Verdict,
}

/// Result of evaluating every face of one frame
#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    pub faces: Vec<FaceVerdict>,
    pub accepted: u32,
    pub cooling_down: u32,
    pub below_threshold: u32,
    /// Statistics after the whole frame was applied
    pub stats: SessionStats,
}

impl FrameOutcome {
    /// The last laugh billed in this frame, if any
    pub fn laugh(&self) -> Option<LaughEvent> {
        self.faces.iter().rev().find_map(|f| f.verdict.laugh())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl LaughMeter {
    /// Evaluate every face of a frame, in detector order
    pub fn evaluate_frame<'a, I>(&mut self, samples: I, now: SessionTime) -> FrameOutcome
    where
        I: IntoIterator<Item = &'a DetectionSample>,
    {
        let mut outcome = FrameOutcome::default();

        for sample in samples {
            let eval = self.evaluate(sample, now);
            match eval.verdict {
                Verdict::Accepted(_) => outcome.accepted += 1,
                Verdict::CoolingDown { .. } => outcome.cooling_down += 1,
                Verdict::BelowThreshold => outcome.below_threshold += 1,
            }
            outcome.faces.push(FaceVerdict {
                sample: *sample,
                verdict: eval.verdict,
            });
        }

        outcome.stats = self.stats();
        outcome
    }
}
