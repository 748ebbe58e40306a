//! Placement pipeline: target computation, edge flipping and viewport clamping
//!
//! Every function here is pure. The overlay engine feeds them a consistent
//! snapshot of measurements taken at the start of a refresh.

pub mod calculator;
pub mod clamp;
pub mod collision;

pub use calculator::{compute_against_anchor, compute_at_coordinates};
pub use clamp::clamp_to_viewport;
pub use collision::{clearance, place_with_flip, FlipContext, Offsets, Placement};
