//! Landmark collections and per-frame snapshots.

use anyhow::{bail, ensure};

use crate::body::{Joint, NUM_LANDMARKS};

type Position = [f32; 3];

/// An ordered collection of landmarks, indexed by [`Joint`] index.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    positions: Box<[Position]>,
    visibility: Box<[f32]>,
}

impl Landmarks {
    /// Creates a new [`Landmarks`] collection containing `len` preallocated landmarks.
    ///
    /// All landmarks will start with all coordinates at `0.0` and a visibility of `1.0`.
    pub fn new(len: usize) -> Self {
        Self {
            positions: vec![[0.0, 0.0, 0.0]; len].into_boxed_slice(),
            visibility: vec![1.0; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Landmark> + Clone + '_ {
        (0..self.positions.len()).map(|i| self.get(i))
    }

    pub fn get(&self, index: usize) -> Landmark {
        Landmark::new(self.positions[index]).with_visibility(self.visibility[index])
    }

    /// Returns the landmark of `joint`.
    ///
    /// # Panics
    ///
    /// Panics if this collection has fewer than [`NUM_LANDMARKS`] entries.
    #[inline]
    pub fn joint(&self, joint: Joint) -> Landmark {
        self.get(joint.index())
    }

    pub fn set(&mut self, index: usize, landmark: Landmark) {
        self.positions[index] = landmark.pos;
        self.visibility[index] = landmark.visibility;
    }

    pub fn map_positions(&mut self, mut f: impl FnMut(Position) -> Position) {
        for pos in self.positions.iter_mut() {
            *pos = f(*pos);
        }
    }
}

impl FromIterator<Landmark> for Landmarks {
    fn from_iter<T: IntoIterator<Item = Landmark>>(iter: T) -> Self {
        let (positions, visibility): (Vec<_>, Vec<_>) =
            iter.into_iter().map(|lm| (lm.pos, lm.visibility)).unzip();
        Self {
            positions: positions.into_boxed_slice(),
            visibility: visibility.into_boxed_slice(),
        }
    }
}

/// A single detected body landmark.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Landmark {
    pos: Position,
    visibility: f32,
}

impl Landmark {
    /// Creates a fully visible landmark at `position`.
    pub fn new(position: Position) -> Self {
        Self {
            pos: position,
            visibility: 1.0,
        }
    }

    pub fn with_visibility(self, visibility: f32) -> Self {
        Self { visibility, ..self }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }

    /// Returns the detector's confidence that this landmark is visible, from 0.0 to 1.0.
    #[inline]
    pub fn visibility(&self) -> f32 {
        self.visibility
    }
}

/// The pose estimation result for one frame of one stream.
///
/// A snapshot is either *detected*, holding exactly [`NUM_LANDMARKS`] landmarks with finite
/// coordinates, or *missing* when the pose model found nobody in the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    landmarks: Option<Landmarks>,
}

impl Snapshot {
    /// Creates a snapshot of a detected pose.
    ///
    /// Returns an error if `landmarks` does not contain exactly [`NUM_LANDMARKS`] entries, or if
    /// any coordinate is NaN or infinite.
    pub fn detected(landmarks: Landmarks) -> anyhow::Result<Self> {
        ensure!(
            landmarks.len() == NUM_LANDMARKS,
            "expected {} landmarks, got {}",
            NUM_LANDMARKS,
            landmarks.len()
        );
        for (i, lm) in landmarks.iter().enumerate() {
            if !lm.position().iter().all(|c| c.is_finite()) {
                bail!("landmark {} has non-finite position {:?}", i, lm.position());
            }
            ensure!(
                (0.0..=1.0).contains(&lm.visibility()),
                "landmark {} has visibility {} outside of 0.0 to 1.0",
                i,
                lm.visibility()
            );
        }

        Ok(Self {
            landmarks: Some(landmarks),
        })
    }

    /// Creates a snapshot for a frame without a pose.
    pub fn missing() -> Self {
        Self { landmarks: None }
    }

    #[inline]
    pub fn is_detected(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Returns the detected landmarks, or [`None`] if no pose was detected in this frame.
    #[inline]
    pub fn landmarks(&self) -> Option<&Landmarks> {
        self.landmarks.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_validation() {
        let snapshot = Snapshot::detected(Landmarks::new(NUM_LANDMARKS)).unwrap();
        assert!(snapshot.is_detected());
        assert_eq!(snapshot.landmarks().unwrap().len(), NUM_LANDMARKS);

        Snapshot::detected(Landmarks::new(NUM_LANDMARKS + 6)).unwrap_err();
        Snapshot::detected(Landmarks::new(0)).unwrap_err();

        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        landmarks.set(Joint::LeftKnee.index(), Landmark::new([0.5, f32::NAN, 0.0]));
        Snapshot::detected(landmarks).unwrap_err();

        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        landmarks.set(
            Joint::Nose.index(),
            Landmark::new([f32::INFINITY, 0.0, 0.0]),
        );
        Snapshot::detected(landmarks).unwrap_err();

        for visibility in [7.5, -0.1, f32::NAN] {
            let mut landmarks = Landmarks::new(NUM_LANDMARKS);
            landmarks.set(
                Joint::LeftHip.index(),
                Landmark::new([0.5, 0.5, 0.0]).with_visibility(visibility),
            );
            Snapshot::detected(landmarks).unwrap_err();
        }
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        landmarks.set(
            Joint::LeftHip.index(),
            Landmark::new([0.5, 0.5, 0.0]).with_visibility(0.0),
        );
        Snapshot::detected(landmarks).unwrap();

        let missing = Snapshot::missing();
        assert!(!missing.is_detected());
        assert!(missing.landmarks().is_none());
    }

    #[test]
    fn get_set() {
        let mut landmarks = Landmarks::new(NUM_LANDMARKS);
        landmarks.set(
            Joint::RightHip.index(),
            Landmark::new([0.25, 0.5, -0.1]).with_visibility(0.3),
        );
        let hip = landmarks.joint(Joint::RightHip);
        assert_eq!(hip.position(), [0.25, 0.5, -0.1]);
        assert_eq!(hip.visibility(), 0.3);
        assert_eq!(landmarks.joint(Joint::LeftHip).visibility(), 1.0);

        landmarks.map_positions(|[x, y, z]| [x + 1.0, y, z]);
        assert_eq!(landmarks.joint(Joint::RightHip).x(), 1.25);
        assert_eq!(landmarks.joint(Joint::Nose).x(), 1.0);

        let collected = landmarks.iter().collect::<Landmarks>();
        assert_eq!(collected, landmarks);
    }
}
