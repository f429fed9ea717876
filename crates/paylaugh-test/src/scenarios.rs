//! Reference scenarios
//!
//! Canonical billing and lifecycle runs, shared by the integration tests and
//! the benches.

use std::time::Duration;

use paylaugh_billing::LaughMeter;
use paylaugh_core::{
    BillingConfig, DetectionSample, Money, PaylaughResult, SessionStats, SessionTime,
};
use paylaugh_runtime::{SessionConfig, SessionController, SessionStatus};

use crate::scripted::{RecordingRenderer, ScriptedCamera, ScriptedExpressionSource};

/// Outcome of a reducer scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioResult {
    pub stats: SessionStats,
    /// Per-sample acceptance, in input order
    pub accepted: Vec<bool>,
}

/// Feed `(probability, time_ms)` pairs through a fresh meter
pub fn run_samples(config: BillingConfig, samples: &[(f32, u64)]) -> ScenarioResult {
    let mut meter = LaughMeter::with_config(config);
    let accepted = samples
        .iter()
        .map(|&(p, t)| {
            meter
                .evaluate(&DetectionSample::with_probability(p), SessionTime::from_millis(t))
                .laugh_accepted()
        })
        .collect();

    ScenarioResult {
        stats: meter.stats(),
        accepted,
    }
}

/// Threshold and cooldown: [0.5, 0.9, 0.92] at [0, 10, 20] ms, 1 s cooldown
pub fn scenario_threshold_and_cooldown() -> ScenarioResult {
    let config = BillingConfig {
        cooldown: Duration::from_millis(1000),
        ..Default::default()
    };
    run_samples(config, &[(0.5, 0), (0.9, 10), (0.92, 20)])
}

/// Ceiling: `laughs` well-spaced laughs at €0.30 against a €3.00 ceiling
pub fn scenario_ceiling(laughs: u64) -> ScenarioResult {
    let config = BillingConfig {
        price_per_laugh: Money::from_cents(30),
        max_bill: Money::from_units(3, 0),
        ..Default::default()
    };
    let spacing = config.cooldown.as_millis() as u64 + 1;
    let samples: Vec<(f32, u64)> = (0..laughs).map(|i| (0.99, i * spacing)).collect();
    run_samples(config, &samples)
}

/// Outcome of a lifecycle scenario
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub status: SessionStatus,
    pub stats: SessionStats,
    pub detector_calls: u64,
    pub stream_requests: usize,
    pub stream_stops: usize,
    pub messages: Vec<String>,
}

/// Permission denied: the camera refuses, the session must fail cleanly
///
/// Must run inside a tokio runtime.
pub async fn scenario_permission_denied() -> PaylaughResult<LifecycleReport> {
    let source = ScriptedExpressionSource::new();
    source.push_happy(0.99);
    let camera = ScriptedCamera::denying();
    let control = camera.control();
    let renderer = RecordingRenderer::new();

    let mut session = SessionController::new(
        SessionConfig::default(),
        source.clone(),
        camera,
        renderer.clone(),
    )?;

    let _ = session.initialize().await;
    // Polling must not start from a failed session
    let _ = session.start().await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.stop().await;

    Ok(LifecycleReport {
        status: session.status(),
        stats: session.stats(),
        detector_calls: source.calls(),
        stream_requests: control.requests(),
        stream_stops: control.stops(),
        messages: renderer.errors().iter().map(|f| f.message()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylaugh_runtime::PERMISSION_DENIED_MESSAGE;

    #[test]
    fn test_scenario_threshold_and_cooldown() {
        let result = scenario_threshold_and_cooldown();
        assert_eq!(result.accepted, vec![false, true, false]);
        assert_eq!(result.stats.total_laughs, 1);
    }

    #[test]
    fn test_scenario_ceiling_exact() {
        let ten = scenario_ceiling(10);
        assert_eq!(ten.stats.current_bill, Money::from_units(3, 0));
        assert_eq!(ten.stats.current_bill.to_string(), "€3.00");
        assert!(ten.stats.is_maxed);

        let eleven = scenario_ceiling(11);
        assert_eq!(eleven.stats.total_laughs, 11);
        assert_eq!(eleven.stats.current_bill, Money::from_units(3, 0));
        assert!(eleven.accepted.iter().all(|&a| a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_permission_denied() {
        let report = scenario_permission_denied().await.unwrap();

        assert_eq!(report.status, SessionStatus::Error);
        assert!(report.stats.is_zero());
        assert_eq!(report.detector_calls, 0);
        assert_eq!(report.stream_requests, 1);
        assert_eq!(report.stream_stops, 0);
        assert_eq!(report.messages, vec![PERMISSION_DENIED_MESSAGE.to_string()]);
    }
}
