//! Usability checks for detected poses.

use crate::body::Joint;
use crate::landmark::Landmarks;

/// Rejects poses whose hips are not clearly visible.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    visibility_threshold: f32,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VISIBILITY_THRESHOLD)
    }
}

impl Gate {
    pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.8;

    /// Creates a gate that requires a visibility of at least `visibility_threshold` on both hips.
    ///
    /// # Panics
    ///
    /// This method panics when `visibility_threshold` is not in range 0.0 to 1.0.
    pub fn new(visibility_threshold: f32) -> Self {
        assert!((0.0..=1.0).contains(&visibility_threshold));
        Self {
            visibility_threshold,
        }
    }

    #[inline]
    pub fn visibility_threshold(&self) -> f32 {
        self.visibility_threshold
    }

    /// Returns whether `landmarks` is reliable enough to be scored.
    pub fn is_usable(&self, landmarks: &Landmarks) -> bool {
        [Joint::LeftHip, Joint::RightHip]
            .into_iter()
            .all(|hip| landmarks.joint(hip).visibility() >= self.visibility_threshold)
    }
}

/// Computes the ratio between the length of the longer leg and the average torso length.
///
/// Lengths are vertical distances in normalized image coordinates (shoulder to hip, hip to
/// ankle). Legs that appear much shorter than usual indicate that the camera doesn't capture the
/// full body.
///
/// Returns [`None`] when the torso has zero height.
pub fn leg_to_torso_ratio(landmarks: &Landmarks) -> Option<f32> {
    let height = |a: Joint, b: Joint| (landmarks.joint(a).y() - landmarks.joint(b).y()).abs();

    let torso = (height(Joint::RightShoulder, Joint::RightHip)
        + height(Joint::LeftShoulder, Joint::LeftHip))
        / 2.0;
    let leg = height(Joint::RightHip, Joint::RightAnkle)
        .max(height(Joint::LeftHip, Joint::LeftAnkle));

    if torso == 0.0 {
        return None;
    }
    Some(leg / torso)
}
