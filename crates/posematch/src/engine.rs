//! Per-frame processing pipelines.
//!
//! The engines own their configuration and all mutable state, so independent sessions can run
//! side by side without sharing anything.

use std::time::Instant;

use crate::angle::KneeAngles;
use crate::config::Config;
use crate::gate::{leg_to_torso_ratio, Gate};
use crate::hold::{HoldState, HoldTimer, KneeCriteria, Label, Phase};
use crate::landmark::{Landmarks, Snapshot};
use crate::session::{Session, Summary};
use crate::similarity::{FrameScore, Scorer};
use crate::timer::Timer;

/// Scores a live pose stream against a reference stream, frame by frame.
pub struct ComparisonEngine {
    scorer: Scorer,
    gate: Gate,
    session: Session,
    t_score: Timer,
}

impl ComparisonEngine {
    /// Creates an engine for one comparison session.
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: config.scorer(),
            gate: config.gate(),
            session: Session::new(),
            t_score: Timer::new("score"),
        })
    }

    /// Processes one pair of simultaneous frames.
    ///
    /// Returns [`None`] if either stream has no usable pose in this frame. The frame pair is still
    /// counted by the [`Session`].
    pub fn process(&mut self, reference: &Snapshot, live: &Snapshot) -> Option<FrameScore> {
        let (Some(reference), Some(live)) = (
            usable(&self.gate, reference, "reference"),
            usable(&self.gate, live, "live"),
        ) else {
            self.session.skip();
            return None;
        };

        let score = self.t_score.time(|| self.scorer.score(reference, live));
        log::trace!(
            "frame {}: angle {:.2}%, position {:.2}%, average {:.2}%",
            self.session.frames_seen(),
            score.angle_similarity,
            score.position_similarity,
            score.average_similarity,
        );
        self.session.record(score);
        Some(score)
    }

    /// Processes two streams until either of them ends, and summarizes the session.
    pub fn run<R, L>(&mut self, reference: R, live: L) -> Summary
    where
        R: IntoIterator<Item = Snapshot>,
        L: IntoIterator<Item = Snapshot>,
    {
        for (reference, live) in reference.into_iter().zip(live) {
            self.process(&reference, &live);
        }
        self.finalize()
    }

    /// Summarizes all frames processed so far.
    pub fn finalize(&self) -> Summary {
        let summary = self.session.finalize();
        match &summary {
            Summary::Scored(report) => log::info!(
                "session: {}/{} frames scored, average similarity {:.2}%",
                report.frame_count,
                report.frames_seen,
                report.average_similarity,
            ),
            Summary::InsufficientData { frames_seen } => {
                log::info!("session: none of {frames_seen} frames could be scored")
            }
        }
        summary
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns profiling timers for this engine.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_score].into_iter()
    }
}

/// Result of processing one frame with a [`FormEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub label: Label,
    /// The measured knee angles, or [`None`] if the frame had no usable pose.
    pub knee_angles: Option<KneeAngles>,
    pub state: HoldState,
}

impl Feedback {
    /// Returns whether the hold has been completed.
    pub fn is_complete(&self) -> bool {
        self.state.phase == Phase::Complete
    }
}

/// Checks lunge form on a single pose stream and times how long it is held.
pub struct FormEngine {
    gate: Gate,
    criteria: KneeCriteria,
    timer: HoldTimer,
    t_classify: Timer,
}

impl FormEngine {
    /// Returns an error if `config` is invalid.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: config.gate(),
            criteria: config.knee,
            timer: HoldTimer::new(config.hold_duration()),
            t_classify: Timer::new("classify"),
        })
    }

    /// Processes one frame captured at `now`.
    ///
    /// Frames without a usable pose count as bad form and interrupt a running hold.
    pub fn process(&mut self, snapshot: &Snapshot, now: Instant) -> Feedback {
        let knee_angles = usable(&self.gate, snapshot, "performer").map(KneeAngles::measure);
        let label = match knee_angles {
            Some(knees) => self.t_classify.time(|| self.criteria.classify(knees)),
            None => Label::Adjust,
        };
        if let Some(knees) = knee_angles {
            log::trace!("knees: left {:.1}°, right {:.1}° ({label})", knees.left, knees.right);
        }

        let before = self.timer.state().phase;
        let state = self.timer.update(label == Label::Good, now);
        if state.phase != before {
            log::debug!("hold phase: {before:?} -> {:?}", state.phase);
        }

        Feedback {
            label,
            knee_angles,
            state,
        }
    }

    /// Returns the current hold state without processing a frame.
    pub fn state(&self) -> HoldState {
        self.timer.state()
    }

    /// Abandons the current hold attempt, allowing a completed hold to be repeated.
    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_classify].into_iter()
    }
}

/// Returns the landmarks of `snapshot` if it holds a pose that passes `gate`.
fn usable<'a>(gate: &Gate, snapshot: &'a Snapshot, stream: &str) -> Option<&'a Landmarks> {
    let Some(landmarks) = snapshot.landmarks() else {
        log::debug!("{stream}: no pose detected");
        return None;
    };
    if !gate.is_usable(landmarks) {
        log::debug!("{stream}: hips not visible enough, skipping frame");
        return None;
    }
    if let Some(ratio) = leg_to_torso_ratio(landmarks) {
        log::trace!("{stream}: leg/torso ratio {ratio:.2}");
    }
    Some(landmarks)
}
