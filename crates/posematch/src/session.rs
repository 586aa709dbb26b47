//! Per-session aggregation of frame scores.

use std::fmt;

use serde::Serialize;

use crate::similarity::FrameScore;

/// Accumulates the [`FrameScore`]s of one comparison run.
#[derive(Debug, Default, Clone)]
pub struct Session {
    scores: Vec<FrameScore>,
    frames_seen: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the score of a frame pair.
    pub fn record(&mut self, score: FrameScore) {
        self.scores.push(score);
        self.frames_seen += 1;
    }

    /// Records a frame pair that could not be scored (eg. because no pose was detected).
    pub fn skip(&mut self) {
        self.frames_seen += 1;
    }

    /// Returns the recorded scores, in the order they were recorded.
    pub fn scores(&self) -> &[FrameScore] {
        &self.scores
    }

    /// Returns the number of frame pairs seen, including the ones that weren't scored.
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Computes the summary statistics over all recorded scores.
    pub fn finalize(&self) -> Summary {
        if self.scores.is_empty() {
            return Summary::InsufficientData {
                frames_seen: self.frames_seen,
            };
        }

        let n = self.scores.len() as f32;
        let mean = |f: fn(&FrameScore) -> f32| self.scores.iter().map(f).sum::<f32>() / n;

        Summary::Scored(SessionReport {
            frame_count: self.scores.len(),
            frames_seen: self.frames_seen,
            angle_similarity: mean(|s| s.angle_similarity),
            position_similarity: mean(|s| s.position_similarity),
            average_similarity: mean(|s| s.average_similarity),
        })
    }
}

/// Result of [`Session::finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    /// At least one frame pair was scored.
    Scored(SessionReport),
    /// No frame pair could be scored, so no means can be computed.
    InsufficientData { frames_seen: usize },
}

impl Summary {
    /// Returns the [`SessionReport`], if any frames were scored.
    pub fn report(&self) -> Option<&SessionReport> {
        match self {
            Summary::Scored(report) => Some(report),
            Summary::InsufficientData { .. } => None,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Scored(report) => fmt::Display::fmt(report, f),
            Summary::InsufficientData { frames_seen } => {
                write!(f, "insufficient data: none of {frames_seen} frames could be scored")
            }
        }
    }
}

/// Mean similarity over all scored frames of a session, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionReport {
    /// Number of scored frame pairs.
    pub frame_count: usize,
    /// Number of frame pairs seen, scored or not.
    pub frames_seen: usize,
    pub angle_similarity: f32,
    pub position_similarity: f32,
    pub average_similarity: f32,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scored frames: {} of {}", self.frame_count, self.frames_seen)?;
        writeln!(f, "Average Angle Similarity: {:.2}%", self.angle_similarity)?;
        writeln!(f, "Average Position Similarity: {:.2}%", self.position_similarity)?;
        write!(f, "Overall Average Similarity: {:.2}%", self.average_similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(average: f32) -> FrameScore {
        FrameScore {
            angle_similarity: average,
            position_similarity: average,
            average_similarity: average,
        }
    }

    #[test]
    fn empty() {
        let session = Session::new();
        assert_eq!(
            session.finalize(),
            Summary::InsufficientData { frames_seen: 0 }
        );
        assert!(session.finalize().report().is_none());
    }

    #[test]
    fn only_skipped() {
        let mut session = Session::new();
        session.skip();
        session.skip();
        assert_eq!(
            session.finalize(),
            Summary::InsufficientData { frames_seen: 2 }
        );
    }

    #[test]
    fn means() {
        let mut session = Session::new();
        session.record(score(80.0));
        session.skip();
        session.record(score(90.0));
        session.record(score(100.0));

        let summary = session.finalize();
        let report = summary.report().unwrap();
        assert_eq!(report.frame_count, 3);
        assert_eq!(report.frames_seen, 4);
        assert_eq!(report.average_similarity, 90.0);
        assert_eq!(report.angle_similarity, 90.0);
        assert_eq!(report.position_similarity, 90.0);
        assert_eq!(session.scores().len(), 3);
    }

    #[test]
    fn separate_means() {
        let mut session = Session::new();
        session.record(FrameScore::new(100.0, 40.0));
        session.record(FrameScore::new(90.0, -20.0));

        let report = *session.finalize().report().unwrap();
        assert_eq!(report.angle_similarity, 95.0);
        assert_eq!(report.position_similarity, 10.0);
        assert_eq!(report.average_similarity, 52.5);
    }

    #[test]
    fn display() {
        let mut session = Session::new();
        session.record(FrameScore::new(99.5, 81.0));
        let text = session.finalize().to_string();
        assert!(text.contains("Average Angle Similarity: 99.50%"), "{text}");
        assert!(text.contains("Average Position Similarity: 81.00%"), "{text}");
        assert!(text.contains("Overall Average Similarity: 90.25%"), "{text}");

        let text = Session::new().finalize().to_string();
        assert!(text.starts_with("insufficient data"), "{text}");
    }
}
