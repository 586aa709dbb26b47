//! Body pose landmark indices and the joint triples measured on them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of landmarks in a body pose snapshot.
pub const NUM_LANDMARKS: usize = 33;

/// A named body landmark.
///
/// The discriminant is the landmark's index in the pose model's output, and is stable across
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Joint {
    /// Returns the landmark index of this joint.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Three joints defining an angle measurement at `vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[Joint; 3]", into = "[Joint; 3]")]
pub struct JointTriple {
    pub start: Joint,
    pub vertex: Joint,
    pub end: Joint,
}

impl JointTriple {
    pub const fn new(start: Joint, vertex: Joint, end: Joint) -> Self {
        Self { start, vertex, end }
    }

    /// Returns the joints of this triple in `start, vertex, end` order.
    #[inline]
    pub fn joints(&self) -> [Joint; 3] {
        [self.start, self.vertex, self.end]
    }
}

impl From<[Joint; 3]> for JointTriple {
    fn from([start, vertex, end]: [Joint; 3]) -> Self {
        Self { start, vertex, end }
    }
}

impl From<JointTriple> for [Joint; 3] {
    fn from(triple: JointTriple) -> Self {
        triple.joints()
    }
}

impl fmt::Display for JointTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}-{:?}", self.start, self.vertex, self.end)
    }
}

/// The angle measurements compared between two poses, in vector order.
pub const DEFAULT_TRIPLES: &[JointTriple] = &TRIPLES;

const TRIPLES: [JointTriple; 23] = {
    use Joint::*;
    const fn t(start: Joint, vertex: Joint, end: Joint) -> JointTriple {
        JointTriple::new(start, vertex, end)
    }
    [
        // arms
        t(LeftShoulder, LeftElbow, LeftWrist),
        t(RightShoulder, RightElbow, RightWrist),
        // legs
        t(LeftHip, LeftKnee, LeftAnkle),
        t(RightHip, RightKnee, RightAnkle),
        // torso
        t(LeftShoulder, LeftHip, LeftKnee),
        t(RightShoulder, RightHip, RightKnee),
        // hands
        t(LeftElbow, LeftWrist, LeftThumb),
        t(RightElbow, RightWrist, RightThumb),
        t(LeftIndex, LeftWrist, LeftPinky),
        t(RightIndex, RightWrist, RightPinky),
        t(LeftWrist, LeftPinky, LeftIndex),
        t(RightWrist, RightPinky, RightIndex),
        // feet
        t(LeftKnee, LeftAnkle, LeftHeel),
        t(RightKnee, RightAnkle, RightHeel),
        t(LeftAnkle, LeftHeel, LeftFootIndex),
        t(RightAnkle, RightHeel, RightFootIndex),
        t(LeftAnkle, LeftFootIndex, LeftHeel),
        t(RightAnkle, RightFootIndex, RightHeel),
        // face
        t(LeftEar, LeftEyeOuter, LeftEye),
        t(RightEar, RightEyeOuter, RightEye),
        t(LeftEye, LeftEyeInner, Nose),
        t(RightEye, RightEyeInner, Nose),
        t(LeftEyeInner, Nose, RightEyeInner),
    ]
};

/// Hip-knee-ankle triple of the left leg.
pub const LEFT_KNEE: JointTriple =
    JointTriple::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle);

/// Hip-knee-ankle triple of the right leg.
pub const RIGHT_KNEE: JointTriple =
    JointTriple::new(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_triples() {
        assert_eq!(DEFAULT_TRIPLES.len(), 23);
        assert_eq!(DEFAULT_TRIPLES[2], LEFT_KNEE);
        assert_eq!(DEFAULT_TRIPLES[3], RIGHT_KNEE);
        for triple in DEFAULT_TRIPLES {
            assert_ne!(triple.vertex, triple.start, "{triple}");
            assert_ne!(triple.vertex, triple.end, "{triple}");
            for joint in triple.joints() {
                assert!(joint.index() < NUM_LANDMARKS);
            }
        }
    }

    #[test]
    fn joint_names() {
        let triple: JointTriple =
            serde_json::from_str(r#"["left_hip", "left_knee", "left_foot_index"]"#).unwrap();
        assert_eq!(
            triple,
            JointTriple::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftFootIndex)
        );
        assert_eq!(Joint::RightFootIndex.index(), 32);

        serde_json::from_str::<JointTriple>(r#"["left_hip", "left_knee", "tail"]"#).unwrap_err();
        serde_json::from_str::<JointTriple>(r#"["left_hip", "left_knee"]"#).unwrap_err();
    }
}
