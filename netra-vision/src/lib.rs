//! # NetraVision
//!
//! Camera perception library for a ground rover: rectifies a forward
//! camera frame into a top-down view, classifies terrain, and accumulates
//! classified observations into a persistent world map.
//!
//! ## Overview
//!
//! The pipeline converts one RGB frame plus the rover pose into:
//!
//! - **VisionImage** - binary obstacle / target / navigable masks
//! - **Navigation signals** - polar (distance, angle) point sets for
//!   navigable terrain and for detected targets
//! - **WorldMap update** - attitude-gated accumulation of classified
//!   points into a 3-channel occupancy grid
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netra_vision::{Perception, PerceptionConfig, Pose, RandomSource, WorldMap};
//!
//! let config = PerceptionConfig::default();
//! let mut map = WorldMap::new(config.world_size);
//! let mut rng = RandomSource::new(0);
//! let perception = Perception::new(config);
//!
//! let update = perception.process(&frame, &pose, &mut map, &mut rng);
//! println!("{} navigable points", update.nav.len());
//! ```
//!
//! ## Coordinate Frames
//!
//! - **Image**: origin top-left, x right (column), y down (row)
//! - **Rover**: origin at the camera, x forward, y left, angles CCW
//! - **World**: integer grid cells, origin bottom-left, yaw in degrees

pub mod core;

pub mod classify;
pub mod config;
pub mod frame;
pub mod grid;
pub mod io;
pub mod pipeline;
pub mod project;
pub mod rectify;
pub mod selector;

pub use core::{GridCoord, PointSet, PolarSet, Pose, RandomSource};

pub use config::PerceptionConfig;
pub use frame::{Frame, Mask, VisionImage};
pub use grid::{MapCoverage, WorldMap};
pub use pipeline::{Perception, PerceptionUpdate};
pub use rectify::Calibration;
