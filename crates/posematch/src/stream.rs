//! Recorded landmark streams.
//!
//! A recording is a UTF-8 text file with one JSON value per frame, one frame per line. A frame is
//! either `null` when no pose was detected, or an array of 33 `[x, y, z, visibility]` arrays in
//! [`Joint`][crate::body::Joint] order. Blank lines are ignored.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context;

use crate::landmark::{Landmark, Landmarks, Snapshot};

/// Reads [`Snapshot`]s from a JSON-lines recording.
pub struct LandmarkReader<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl LandmarkReader<BufReader<File>> {
    /// Opens a recording file.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark stream '{}'", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LandmarkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Reads the next frame, or returns `Ok(None)` at the end of the stream.
    pub fn read(&mut self) -> anyhow::Result<Option<Snapshot>> {
        loop {
            self.line.clear();
            let result = self.reader.read_line(&mut self.line);
            // a line with invalid UTF-8 is consumed even though reading it fails
            self.line_number += 1;
            let n = result.with_context(|| format!("failed to read line {}", self.line_number))?;
            if n == 0 {
                return Ok(None);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            return parse_frame(line)
                .with_context(|| format!("invalid frame on line {}", self.line_number))
                .map(Some);
        }
    }
}

impl<R: BufRead> Iterator for LandmarkReader<R> {
    type Item = anyhow::Result<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

fn parse_frame(line: &str) -> anyhow::Result<Snapshot> {
    let frame: Option<Vec<[f32; 4]>> = serde_json::from_str(line)?;
    match frame {
        None => Ok(Snapshot::missing()),
        Some(landmarks) => Snapshot::detected(
            landmarks
                .into_iter()
                .map(|[x, y, z, visibility]| Landmark::new([x, y, z]).with_visibility(visibility))
                .collect::<Landmarks>(),
        ),
    }
}
