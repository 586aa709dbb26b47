//! Lunge form classification and hold countdown.
//!
//! A lunge (or split squat) is held correctly when one knee is bent and the other leg is
//! straight. [`KneeCriteria`] checks this for a single frame, and [`HoldTimer`] counts down while
//! the posture is held, restarting from scratch whenever the form breaks.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::angle::KneeAngles;

/// An inclusive range of joint angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, degrees: f32) -> bool {
        self.min <= degrees && degrees <= self.max
    }
}

/// Acceptable knee angles for a held lunge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KneeCriteria {
    /// Range of the bent (front) knee.
    pub bent: AngleRange,
    /// Range of the straight (back) leg.
    pub straight: AngleRange,
}

impl Default for KneeCriteria {
    fn default() -> Self {
        Self {
            bent: Self::DEFAULT_BENT,
            straight: Self::DEFAULT_STRAIGHT,
        }
    }
}

impl KneeCriteria {
    pub const DEFAULT_BENT: AngleRange = AngleRange::new(115.0, 140.0);
    pub const DEFAULT_STRAIGHT: AngleRange = AngleRange::new(160.0, 180.0);

    /// Returns whether one knee is bent and the other straight. Either leg may be in front.
    pub fn is_met(&self, knees: KneeAngles) -> bool {
        (self.bent.contains(knees.left) && self.straight.contains(knees.right))
            || (self.bent.contains(knees.right) && self.straight.contains(knees.left))
    }

    /// Classifies a pair of knee angles.
    pub fn classify(&self, knees: KneeAngles) -> Label {
        if self.is_met(knees) {
            Label::Good
        } else {
            Label::Adjust
        }
    }
}

/// Per-frame form classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Good,
    Adjust,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Good => "good",
            Label::Adjust => "adjust",
        }
    }

    /// Returns the feedback message to show the performer.
    pub fn message(&self) -> &'static str {
        match self {
            Label::Good => "Good! Keep going!",
            Label::Adjust => "Squat down!",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a hold attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The posture is not currently held.
    Idle,
    /// The posture is held and the countdown is running.
    Holding,
    /// The countdown reached zero. Stays this way until [`HoldTimer::reset`] is called.
    Complete,
}

/// Snapshot of a [`HoldTimer`]'s state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldState {
    pub phase: Phase,
    /// Whole seconds left until the hold is complete.
    pub remaining_seconds: u64,
    /// When the current hold started. [`None`] while [`Phase::Idle`].
    pub started_at: Option<Instant>,
}

/// Countdown for holding a posture for a fixed duration without interruption.
#[derive(Debug, Clone)]
pub struct HoldTimer {
    duration: Duration,
    state: HoldState,
}

impl Default for HoldTimer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION)
    }
}

impl HoldTimer {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

    /// Creates a hold timer that completes after the posture was held for `duration`.
    ///
    /// The countdown has a resolution of whole seconds, any sub-second part of `duration` is
    /// ignored.
    pub fn new(duration: Duration) -> Self {
        let duration = Duration::from_secs(duration.as_secs());
        Self {
            duration,
            state: idle(duration),
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn state(&self) -> HoldState {
        self.state
    }

    /// Advances the timer by one frame.
    ///
    /// `criteria_met` indicates whether the posture is held in this frame, and `now` is the time
    /// the frame was captured. `now` must come from a monotonic clock and must not go backwards
    /// between calls.
    pub fn update(&mut self, criteria_met: bool, now: Instant) -> HoldState {
        let total = self.duration.as_secs();
        match (self.state.phase, criteria_met) {
            (Phase::Complete, _) => {}
            (Phase::Idle, false) => {}
            (Phase::Holding, false) => {
                log::debug!(
                    "hold interrupted with {}s remaining",
                    self.state.remaining_seconds
                );
                self.state = idle(self.duration);
            }
            (Phase::Idle, true) => {
                self.state = HoldState {
                    phase: Phase::Holding,
                    remaining_seconds: total,
                    started_at: Some(now),
                };
                self.check_complete();
            }
            (Phase::Holding, true) => {
                if let Some(started_at) = self.state.started_at {
                    let elapsed = now.saturating_duration_since(started_at).as_secs();
                    self.state.remaining_seconds = total.saturating_sub(elapsed);
                }
                self.check_complete();
            }
        }
        self.state
    }

    /// Discards the current attempt and returns to [`Phase::Idle`].
    pub fn reset(&mut self) {
        self.state = idle(self.duration);
    }

    fn check_complete(&mut self) {
        if self.state.remaining_seconds == 0 {
            log::debug!("hold complete after {:?}", self.duration);
            self.state.phase = Phase::Complete;
        }
    }
}

fn idle(duration: Duration) -> HoldState {
    HoldState {
        phase: Phase::Idle,
        remaining_seconds: duration.as_secs(),
        started_at: None,
    }
}
