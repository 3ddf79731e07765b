//! Core types shared across the perception pipeline.

mod point;
mod pose;
mod random;

pub use point::{GridCoord, PointSet, PolarSet};
pub use pose::Pose;
pub use random::RandomSource;
