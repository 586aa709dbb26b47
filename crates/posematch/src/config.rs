//! Scoring and feedback configuration.
//!
//! A [`Config`] can be built in code, starting from [`Config::default`], or loaded from a TOML
//! file. Every key is optional:
//!
//! ```toml
//! visibility_threshold = 0.8
//! hold_seconds = 30
//! position_scale = 1.0
//! joint_sampling = "distinct"   # or "per_triple"
//! # replaces the default list; order matters
//! # triples = [["left_hip", "left_knee", "left_ankle"], ...]
//!
//! [knee]
//! bent = { min = 115.0, max = 140.0 }
//! straight = { min = 160.0, max = 180.0 }
//! ```

use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::body::{JointTriple, DEFAULT_TRIPLES};
use crate::gate::Gate;
use crate::hold::{AngleRange, HoldTimer, KneeCriteria};
use crate::similarity::{JointSampling, Scorer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Minimum visibility of both hips for a pose to be used.
    pub visibility_threshold: f32,
    /// How long the lunge has to be held, in seconds.
    pub hold_seconds: u64,
    /// Joint distance at which the position similarity reaches 0%.
    pub position_scale: f32,
    pub joint_sampling: JointSampling,
    /// Angle measurements compared between poses, in vector order.
    pub triples: Vec<JointTriple>,
    pub knee: KneeCriteria,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            visibility_threshold: Gate::DEFAULT_VISIBILITY_THRESHOLD,
            hold_seconds: HoldTimer::DEFAULT_DURATION.as_secs(),
            position_scale: 1.0,
            joint_sampling: JointSampling::default(),
            triples: DEFAULT_TRIPLES.to_vec(),
            knee: KneeCriteria::default(),
        }
    }
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file '{}'", path.display()))
    }

    /// Parses and validates a configuration from TOML source.
    pub fn parse(toml: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this configuration to TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that all parameters are within their valid ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.visibility_threshold),
            "visibility threshold must be between 0.0 and 1.0, got {}",
            self.visibility_threshold
        );
        ensure!(
            self.position_scale > 0.0 && self.position_scale.is_finite(),
            "position scale must be positive, got {}",
            self.position_scale
        );
        validate_range("knee.bent", self.knee.bent)?;
        validate_range("knee.straight", self.knee.straight)?;

        ensure!(!self.triples.is_empty(), "at least one joint triple is required");
        for (i, triple) in self.triples.iter().enumerate() {
            ensure!(
                triple.vertex != triple.start && triple.vertex != triple.end,
                "joint triple #{} ({}) uses its vertex as an endpoint",
                i + 1,
                triple
            );
        }
        Ok(())
    }

    /// Sets the minimum hip visibility.
    #[inline]
    pub fn visibility_threshold(self, threshold: f32) -> Self {
        Self {
            visibility_threshold: threshold,
            ..self
        }
    }

    /// Sets the hold duration, in whole seconds.
    #[inline]
    pub fn hold_seconds(self, seconds: u64) -> Self {
        Self {
            hold_seconds: seconds,
            ..self
        }
    }

    #[inline]
    pub fn position_scale(self, scale: f32) -> Self {
        Self {
            position_scale: scale,
            ..self
        }
    }

    #[inline]
    pub fn joint_sampling(self, sampling: JointSampling) -> Self {
        Self {
            joint_sampling: sampling,
            ..self
        }
    }

    #[inline]
    pub fn knee(self, knee: KneeCriteria) -> Self {
        Self { knee, ..self }
    }

    /// Replaces the list of compared joint angles.
    #[inline]
    pub fn triples(self, triples: impl Into<Vec<JointTriple>>) -> Self {
        Self {
            triples: triples.into(),
            ..self
        }
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_secs(self.hold_seconds)
    }

    /// Builds the visibility gate described by this configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (see [`Config::validate`]).
    pub fn gate(&self) -> Gate {
        Gate::new(self.visibility_threshold)
    }

    /// Builds the pose scorer described by this configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (see [`Config::validate`]).
    pub fn scorer(&self) -> Scorer {
        let mut scorer = Scorer::new(self.triples.clone());
        scorer.set_joint_sampling(self.joint_sampling);
        scorer.set_position_scale(self.position_scale);
        scorer
    }
}

fn validate_range(name: &str, range: AngleRange) -> anyhow::Result<()> {
    ensure!(
        range.min <= range.max,
        "{name}: minimum {} is larger than maximum {}",
        range.min,
        range.max
    );
    ensure!(
        range.min >= 0.0 && range.max <= 180.0,
        "{name}: range {}..={} exceeds 0..=180 degrees",
        range.min,
        range.max
    );
    Ok(())
}
