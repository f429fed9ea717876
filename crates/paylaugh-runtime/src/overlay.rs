//! Overlay model - what the render layer draws on top of the video
//!
//! Boxes and labels per detected face, the celebration shown after each
//! billed laugh, and the dashboard projection of the session statistics.

use std::fmt;
use std::time::Duration;

use paylaugh_billing::{FrameOutcome, Verdict};
use paylaugh_core::{BillingConfig, FrameSize, LaughEvent, SessionStats, SessionTime};
use serde::Serialize;

/// Stroke color for faces that are laughing
pub const LAUGH_COLOR: &str = "#22c55e";
/// Stroke color for neutral faces
pub const NEUTRAL_COLOR: &str = "#dc2626";

/// Box style keyed by the reducer's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlayStyle {
    /// This face was billed on this tick
    Billed,
    /// Laughing, but inside the cooldown window
    Laughing,
    Neutral,
}

impl OverlayStyle {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Accepted(_) => OverlayStyle::Billed,
            Verdict::CoolingDown { .. } => OverlayStyle::Laughing,
            Verdict::BelowThreshold => OverlayStyle::Neutral,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            OverlayStyle::Billed | OverlayStyle::Laughing => LAUGH_COLOR,
            OverlayStyle::Neutral => NEUTRAL_COLOR,
        }
    }

    pub fn line_width(self) -> u8 {
        3
    }

    /// Dash pattern (dash, gap)
    pub fn line_dash(self) -> (u8, u8) {
        (10, 5)
    }

    pub fn is_laughing(self) -> bool {
        !matches!(self, OverlayStyle::Neutral)
    }
}

/// One face box in display coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub bounding_box: paylaugh_core::BoundingBox,
    pub style: OverlayStyle,
    pub label: String,
    pub happy_percent: u8,
}

/// Label drawn above a face box
pub fn face_label(style: OverlayStyle, happy_percent: u8) -> String {
    if style.is_laughing() {
        format!("LAUGH DETECTED! ({}%)", happy_percent)
    } else {
        format!("STATUS: NEUTRAL ({}%)", happy_percent)
    }
}

/// Build one overlay box per face, rescaled from frame to display size
pub fn build_overlays(outcome: &FrameOutcome, frame: FrameSize, display: FrameSize) -> Vec<OverlayBox> {
    outcome
        .faces
        .iter()
        .map(|face| {
            let style = OverlayStyle::from_verdict(&face.verdict);
            let happy_percent = face.sample.happy_percent();
            OverlayBox {
                bounding_box: face.sample.bounding_box.rescale(frame, display),
                style,
                label: face_label(style, happy_percent),
                happy_percent,
            }
        })
        .collect()
}

/// Celebration shown after a billed laugh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Celebration {
    pub laugh: LaughEvent,
    pub until: SessionTime,
}

impl Celebration {
    pub fn remaining(&self, now: SessionTime) -> Duration {
        self.until.saturating_since(now)
    }
}

/// Tracks the transient celebration overlay
#[derive(Debug, Clone)]
pub struct CelebrationTimer {
    duration: Duration,
    current: Option<Celebration>,
}

impl CelebrationTimer {
    pub fn new(duration: Duration) -> Self {
        CelebrationTimer {
            duration,
            current: None,
        }
    }

    /// Start (or restart) the celebration for `laugh`
    pub fn trigger(&mut self, laugh: LaughEvent) -> Celebration {
        let celebration = Celebration {
            laugh,
            until: laugh.timestamp + self.duration,
        };
        self.current = Some(celebration);
        celebration
    }

    /// Active celebration at `now`, if any
    pub fn active(&mut self, now: SessionTime) -> Option<Celebration> {
        match self.current {
            Some(c) if now < c.until => Some(c),
            Some(_) => {
                self.current = None;
                None
            }
            None => None,
        }
    }
}

/// Text projection of the session for dashboards and status bars
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub total_laughs: u64,
    pub bill: String,
    pub season_ticket: bool,
    pub system_active: bool,
    pub rate: String,
    pub sensitivity: String,
}

impl Dashboard {
    pub fn project(stats: &SessionStats, billing: &BillingConfig, system_active: bool) -> Self {
        Dashboard {
            total_laughs: stats.total_laughs,
            bill: stats.current_bill.to_string(),
            season_ticket: stats.is_maxed,
            system_active,
            rate: format!("{} / Laugh", billing.price_per_laugh),
            sensitivity: format!("{}%", billing.sensitivity_percent()),
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TOTAL LAUGHS: {}", self.total_laughs)?;
        write!(f, "CURRENT BILL: {}", self.bill)?;
        if self.season_ticket {
            write!(f, "  [SEASON TICKET ACTIVE]")?;
        }
        writeln!(f)?;
        write!(
            f,
            "System: {} | Rate: {} | Sensitivity: {}",
            if self.system_active { "Active" } else { "Offline" },
            self.rate,
            self.sensitivity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylaugh_billing::LaughMeter;
    use paylaugh_core::{BoundingBox, DetectionSample, LaughId, Money};

    fn laugh_at(ms: u64) -> LaughEvent {
        LaughEvent {
            id: LaughId::FIRST,
            timestamp: SessionTime::from_millis(ms),
            bill_after: Money::from_cents(30),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(face_label(OverlayStyle::Billed, 93), "LAUGH DETECTED! (93%)");
        assert_eq!(face_label(OverlayStyle::Laughing, 90), "LAUGH DETECTED! (90%)");
        assert_eq!(face_label(OverlayStyle::Neutral, 12), "STATUS: NEUTRAL (12%)");
    }

    #[test]
    fn test_build_overlays_styles_and_scaling() {
        let mut meter = LaughMeter::new();
        let samples = [
            DetectionSample::new(BoundingBox::new(10.0, 10.0, 20.0, 20.0), 0.95),
            DetectionSample::new(BoundingBox::new(40.0, 10.0, 20.0, 20.0), 0.3),
        ];
        let outcome = meter.evaluate_frame(&samples, SessionTime::ZERO);

        let boxes = build_overlays(&outcome, FrameSize::new(320, 240), FrameSize::new(640, 480));

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].style, OverlayStyle::Billed);
        assert_eq!(boxes[0].style.color(), LAUGH_COLOR);
        assert_eq!(boxes[0].bounding_box, BoundingBox::new(20.0, 20.0, 40.0, 40.0));
        assert_eq!(boxes[1].style, OverlayStyle::Neutral);
        assert_eq!(boxes[1].label, "STATUS: NEUTRAL (30%)");
    }

    #[test]
    fn test_celebration_lasts_its_duration() {
        let mut timer = CelebrationTimer::new(Duration::from_millis(1500));
        assert!(timer.active(SessionTime::ZERO).is_none());

        timer.trigger(laugh_at(1000));
        assert!(timer.active(SessionTime::from_millis(1000)).is_some());
        let c = timer.active(SessionTime::from_millis(2499)).unwrap();
        assert_eq!(c.remaining(SessionTime::from_millis(2499)), Duration::from_millis(1));
        assert!(timer.active(SessionTime::from_millis(2500)).is_none());
    }

    #[test]
    fn test_new_laugh_restarts_celebration() {
        let mut timer = CelebrationTimer::new(Duration::from_millis(1500));
        timer.trigger(laugh_at(0));
        timer.trigger(laugh_at(1400));
        assert!(timer.active(SessionTime::from_millis(2000)).is_some());
    }

    #[test]
    fn test_dashboard_projection() {
        let stats = SessionStats {
            total_laughs: 80,
            current_bill: Money::from_units(24, 0),
            is_maxed: true,
        };
        let dash = Dashboard::project(&stats, &BillingConfig::default(), true);

        assert_eq!(dash.bill, "€24.00");
        assert_eq!(dash.rate, "€0.30 / Laugh");
        assert_eq!(dash.sensitivity, "85%");

        let text = dash.to_string();
        assert!(text.contains("SEASON TICKET ACTIVE"));
        assert!(text.contains("System: Active"));
    }
}
