//! Joint angle extraction.

use nalgebra::Vector2;

use crate::body::{JointTriple, LEFT_KNEE, RIGHT_KNEE};
use crate::landmark::{Landmark, Landmarks};

/// Computes the angle at `p2` formed by the line segments to `p1` and `p3`, in degrees.
///
/// Only the X and Y coordinates are taken into account. The result is always in range 0° to 180°.
///
/// All coordinates must be finite.
pub fn compute_angle(p1: [f32; 2], p2: [f32; 2], p3: [f32; 2]) -> f32 {
    let [a, b, c] = [p1, p2, p3].map(Vector2::from);
    let to_start = a - b;
    let to_end = c - b;

    let radians = to_end.y.atan2(to_end.x) - to_start.y.atan2(to_start.x);
    let mut angle = radians.to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }

    // rounding can push us a hair past either end
    angle.clamp(0.0, 180.0)
}

/// Computes the angle of `triple` on a set of landmarks.
pub fn joint_angle(landmarks: &Landmarks, triple: &JointTriple) -> f32 {
    let [p1, p2, p3] = triple.joints().map(|joint| xy(landmarks.joint(joint)));
    compute_angle(p1, p2, p3)
}

/// Computes the angle of every triple in `triples`, in order.
pub fn joint_angles(landmarks: &Landmarks, triples: &[JointTriple]) -> Vec<f32> {
    triples
        .iter()
        .map(|triple| joint_angle(landmarks, triple))
        .collect()
}

/// Hip-knee-ankle angles of both legs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KneeAngles {
    pub left: f32,
    pub right: f32,
}

impl KneeAngles {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Measures both knee angles of a pose.
    pub fn measure(landmarks: &Landmarks) -> Self {
        Self {
            left: joint_angle(landmarks, &LEFT_KNEE),
            right: joint_angle(landmarks, &RIGHT_KNEE),
        }
    }
}

fn xy(lm: Landmark) -> [f32; 2] {
    [lm.x(), lm.y()]
}
