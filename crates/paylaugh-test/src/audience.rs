//! Seeded audience simulator
//!
//! Generates happy-probability traces for a room of faces, tick by tick, so
//! long sessions can be replayed through the billing reducer
//! deterministically.

use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use paylaugh_billing::LaughMeter;
use paylaugh_core::{BillingConfig, BoundingBox, DetectionSample, SessionStats, SessionTime};

/// Audience behaviour
#[derive(Debug, Clone)]
pub struct AudienceConfig {
    /// Faces in view
    pub faces: usize,
    /// Per-tick chance that a calm face starts laughing
    pub laugh_chance: f64,
    /// Ticks a laugh lasts
    pub laugh_ticks: u32,
    /// Happy probability range while laughing
    pub laughing: (f32, f32),
    /// Happy probability range while calm
    pub calm: (f32, f32),
    pub tick: Duration,
}

impl Default for AudienceConfig {
    fn default() -> Self {
        AudienceConfig {
            faces: 1,
            laugh_chance: 0.05,
            laugh_ticks: 6,
            laughing: (0.86, 1.0),
            calm: (0.0, 0.6),
            tick: Duration::from_millis(150),
        }
    }
}

impl AudienceConfig {
    /// Nobody laughs
    pub fn tough_crowd() -> Self {
        AudienceConfig {
            laugh_chance: 0.0,
            ..Default::default()
        }
    }

    /// A small table that laughs often
    pub fn lively() -> Self {
        AudienceConfig {
            faces: 3,
            laugh_chance: 0.15,
            ..Default::default()
        }
    }

    /// Laughs at everything, all the time
    pub fn hysterical() -> Self {
        AudienceConfig {
            faces: 4,
            laugh_chance: 1.0,
            laugh_ticks: 1000,
            ..Default::default()
        }
    }
}

/// One tick of generated samples
#[derive(Debug, Clone)]
pub struct AudienceTick {
    pub at: SessionTime,
    pub samples: Vec<DetectionSample>,
}

/// Deterministic audience generator
pub struct Audience {
    config: AudienceConfig,
    rng: StdRng,
    /// Remaining laugh ticks per face
    laughing: Vec<u32>,
    now: SessionTime,
}

impl Audience {
    pub fn new(config: AudienceConfig, seed: u64) -> Self {
        let laughing = vec![0; config.faces];
        Audience {
            config,
            rng: StdRng::seed_from_u64(seed),
            laughing,
            now: SessionTime::ZERO,
        }
    }

    fn face_box(index: usize) -> BoundingBox {
        BoundingBox::new(40.0 + index as f32 * 150.0, 140.0, 120.0, 120.0)
    }

    /// Generate the next tick
    pub fn next_tick(&mut self) -> AudienceTick {
        let laughing = Uniform::new_inclusive(self.config.laughing.0, self.config.laughing.1);
        let calm = Uniform::new_inclusive(self.config.calm.0, self.config.calm.1);

        let mut samples = Vec::with_capacity(self.config.faces);
        for index in 0..self.config.faces {
            if self.laughing[index] == 0 && self.rng.gen_bool(self.config.laugh_chance) {
                self.laughing[index] = self.config.laugh_ticks;
            }

            let happy = if self.laughing[index] > 0 {
                self.laughing[index] -= 1;
                laughing.sample(&mut self.rng)
            } else {
                calm.sample(&mut self.rng)
            };
            samples.push(DetectionSample::new(Self::face_box(index), happy));
        }

        let tick = AudienceTick {
            at: self.now,
            samples,
        };
        self.now = self.now + self.config.tick;
        tick
    }

    /// Generate `ticks` ticks
    pub fn trace(&mut self, ticks: usize) -> Vec<AudienceTick> {
        (0..ticks).map(|_| self.next_tick()).collect()
    }
}

/// Outcome of replaying a trace through a fresh meter
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub stats: SessionStats,
    /// Timestamps of the accepted laughs
    pub accepted_at: Vec<SessionTime>,
    /// Faces that were above threshold while cooling down
    pub suppressed: u64,
}

/// Replay a trace through a fresh meter
pub fn replay(config: BillingConfig, trace: &[AudienceTick]) -> ReplayReport {
    let mut meter = LaughMeter::with_config(config);
    let mut accepted_at = Vec::new();
    let mut suppressed = 0;

    for tick in trace {
        let outcome = meter.evaluate_frame(&tick.samples, tick.at);
        if outcome.laugh().is_some() {
            accepted_at.push(tick.at);
        }
        suppressed += u64::from(outcome.cooling_down);
    }

    ReplayReport {
        stats: meter.stats(),
        accepted_at,
        suppressed,
    }
}
