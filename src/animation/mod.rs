//! Growth animation over the combined vertex buffer
//!
//! A built tree stays static; the animator owns a live copy of its vertex
//! positions and reveals them ring by ring on each tick.

pub mod growth;
pub mod easing;

pub use growth::{TreeAnimator, BranchAnimator};
pub use easing::{Easing, ease};
