//! Pose landmark geometry and scoring.
//!
//! This library consumes body pose landmarks produced by an external pose estimation model (one
//! set of 33 landmarks per frame, see [`body::Joint`]) and derives two kinds of motion quality
//! signals:
//!
//! * Form feedback for a single performer: the knee angles are checked against a lunge posture,
//!   and a countdown tracks how long the posture is held ([`engine::FormEngine`]).
//! * Similarity between two independent pose streams, eg. a reference recording and a live
//!   performer, scored frame by frame and summarized per session ([`engine::ComparisonEngine`]).
//!
//! Acquiring frames, running the pose model and drawing overlays is left to the caller.
//!
//! # Coordinates
//!
//! Landmark coordinates are normalized to the input image: X points to the right and Y points
//! *down*, both in range 0.0 to 1.0. Z is a unitless relative depth as output by the network.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log levels configured by [`init_logger!`].

pub mod angle;
pub mod body;
pub mod config;
pub mod engine;
pub mod gate;
pub mod hold;
pub mod landmark;
pub mod session;
pub mod similarity;
pub mod stream;
pub mod timer;


use log::LevelFilter;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library will log at *debug* level, unless overridden by `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
