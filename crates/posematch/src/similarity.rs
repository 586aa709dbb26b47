//! Pose similarity scoring.
//!
//! Two poses are compared in two ways:
//!
//! * **Angle similarity** compares the *shape* of the poses: every [`JointTriple`] yields one
//!   joint angle per pose, and the cosine similarity of the two angle vectors is reported as a
//!   percentage. This is independent of where the person stands in the frame and how large they
//!   appear.
//! * **Position similarity** compares *where* the joints are: the 3D Euclidean distance between
//!   corresponding landmarks is averaged and mapped to a percentage via `(1 - distance) * 100`.
//!   This is a heuristic rather than a normalized metric. The average distance is usually well
//!   below 1.0 in normalized coordinates, but poses that are far apart yield negative values,
//!   which are reported as-is.
//!
//! Both are averaged into a single [`FrameScore::average_similarity`].

use itertools::Itertools;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::angle::joint_angles;
use crate::body::{Joint, JointTriple, DEFAULT_TRIPLES};
use crate::landmark::Landmarks;

/// Similarity of one pair of poses, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameScore {
    /// Cosine similarity of the joint angle vectors, times 100.
    ///
    /// 100 means identical joint angles (up to a common scale factor).
    pub angle_similarity: f32,
    /// `(1 - average joint distance) * 100`. Can be negative.
    pub position_similarity: f32,
    /// Arithmetic mean of [`angle_similarity`][Self::angle_similarity] and
    /// [`position_similarity`][Self::position_similarity].
    pub average_similarity: f32,
}

impl FrameScore {
    pub fn new(angle_similarity: f32, position_similarity: f32) -> Self {
        Self {
            angle_similarity,
            position_similarity,
            average_similarity: (angle_similarity + position_similarity) / 2.0,
        }
    }
}

/// Selects the joints whose distances are averaged for the position similarity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointSampling {
    /// Every joint referenced by any triple, counted once.
    #[default]
    Distinct,
    /// Every joint of every triple, so joints shared by several triples are weighted higher.
    PerTriple,
}

/// Compares pairs of poses.
#[derive(Debug, Clone)]
pub struct Scorer {
    triples: Vec<JointTriple>,
    /// Joints entering the position similarity, derived from `triples` and the sampling mode.
    joints: Vec<Joint>,
    position_scale: f32,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_TRIPLES.to_vec())
    }
}

impl Scorer {
    /// Creates a scorer measuring the angles of `triples`, in that order.
    ///
    /// # Panics
    ///
    /// This method panics if `triples` is empty.
    pub fn new(triples: Vec<JointTriple>) -> Self {
        assert!(!triples.is_empty(), "need at least one joint triple");
        let joints = sample_joints(&triples, JointSampling::default());
        Self {
            triples,
            joints,
            position_scale: 1.0,
        }
    }

    /// Sets which joints contribute to the position similarity.
    ///
    /// By default, [`JointSampling::Distinct`] is used.
    pub fn set_joint_sampling(&mut self, sampling: JointSampling) {
        self.joints = sample_joints(&self.triples, sampling);
    }

    /// Sets the distance at which the position similarity reaches 0%.
    ///
    /// Joint distances are divided by this value before being mapped to a percentage. The default
    /// of 1.0 treats the normalized image coordinates as-is.
    ///
    /// # Panics
    ///
    /// This method panics if `scale` is not a positive, finite number.
    pub fn set_position_scale(&mut self, scale: f32) {
        assert!(scale > 0.0 && scale.is_finite());
        self.position_scale = scale;
    }

    pub fn triples(&self) -> &[JointTriple] {
        &self.triples
    }

    /// Scores the similarity of two detected poses.
    pub fn score(&self, a: &Landmarks, b: &Landmarks) -> FrameScore {
        let angles_a = joint_angles(a, &self.triples);
        let angles_b = joint_angles(b, &self.triples);
        let angle_similarity = cosine_similarity(&angles_a, &angles_b) * 100.0;

        let distance = average_distance(a, b, &self.joints) / self.position_scale;
        let position_similarity = (1.0 - distance) * 100.0;

        FrameScore::new(angle_similarity, position_similarity)
    }
}

fn sample_joints(triples: &[JointTriple], sampling: JointSampling) -> Vec<Joint> {
    let all = triples.iter().flat_map(|triple| triple.joints());
    match sampling {
        JointSampling::Distinct => all.unique().collect(),
        JointSampling::PerTriple => all.collect(),
    }
}

/// Computes the cosine similarity of two equal-length vectors.
///
/// If either vector is all zeros, the similarity is undefined, and 0.0 is returned.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[track_caller]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "angle vectors have different lengths");
    // Accumulated in f64 so that tiny non-zero angles don't underflow to a zero norm.
    let (dot, norm2_a, norm2_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, aa, bb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, aa + x * x, bb + y * y)
        },
    );

    // `sqrt(n * n) == n` holds exactly, so a vector compared with itself yields exactly 1.0.
    let denom = (norm2_a * norm2_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom) as f32
}

/// Averages the 3D distance between corresponding `joints` of `a` and `b`.
fn average_distance(a: &Landmarks, b: &Landmarks, joints: &[Joint]) -> f32 {
    let total: f32 = joints
        .iter()
        .map(|&joint| {
            let pa = Point3::from(a.joint(joint).position());
            let pb = Point3::from(b.joint(joint).position());
            nalgebra::distance(&pa, &pb)
        })
        .sum();
    total / joints.len() as f32
}
