//! Full perception step: one camera frame in, vision masks, navigation
//! signals, and a world-map update out.

use crate::classify;
use crate::config::PerceptionConfig;
use crate::core::{PolarSet, Pose, RandomSource};
use crate::frame::{Frame, VisionImage};
use crate::grid::WorldMap;
use crate::project::{impose_range, rover_coords, to_polar, to_world};
use crate::rectify::{self, Calibration};
use crate::selector;

/// Output of one perception step.
#[derive(Clone, Debug)]
pub struct PerceptionUpdate {
    /// Classified masks over the rectified frame.
    pub vision: VisionImage,
    /// Resolved navigable-terrain signal.
    pub nav: PolarSet,
    /// Target signal (unfiltered; targets are tracked at any range).
    pub targets: PolarSet,
}

/// The perception pipeline: fixed calibration plus thresholds.
pub struct Perception {
    config: PerceptionConfig,
    calibration: Calibration,
}

impl Perception {
    /// Build the pipeline for the configured frame geometry.
    pub fn new(config: PerceptionConfig) -> Self {
        let calibration = Calibration::for_frame(
            config.frame_width,
            config.frame_height,
            config.dst_size,
            config.bottom_offset,
        );
        Self {
            config,
            calibration,
        }
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Run one perception step.
    ///
    /// Rectifies the sky-cropped frame, classifies terrain, converts the
    /// classified pixels to rover and world coordinates, accumulates them
    /// into `map` when the attitude gate passes, and resolves the
    /// navigation signal.
    pub fn process(
        &self,
        frame: &Frame,
        pose: &Pose,
        map: &mut WorldMap,
        rng: &mut RandomSource,
    ) -> PerceptionUpdate {
        let cfg = &self.config;

        let cropped = frame.below_horizon(cfg.horizon_row);
        let warped = rectify::warp(&cropped, &self.calibration);
        let blurred = classify::gaussian_blur(&warped);

        let navigable = classify::navigable_mask(&warped, &blurred, cfg.nav_threshold);
        let obstacles = classify::obstacle_mask(&warped, &blurred, cfg.obstacle_threshold);
        let targets = classify::target_mask(&warped, cfg.target_low, cfg.target_high);

        let nav_points = impose_range(&rover_coords(&navigable), cfg.max_range);
        let obstacle_points = impose_range(&rover_coords(&obstacles), cfg.max_range);
        let target_points = rover_coords(&targets);

        // Accumulate only frames taken near level: rectification assumes
        // a flat ground plane, and tilt breaks that assumption.
        if pose.is_level(cfg.roll_limit, cfg.pitch_limit) {
            let obstacle_cells = to_world(&obstacle_points, pose, cfg.world_scale, cfg.world_size);
            let target_cells = to_world(&target_points, pose, cfg.world_scale, cfg.world_size);
            let nav_cells = to_world(&nav_points, pose, cfg.world_scale, cfg.world_size);
            map.integrate(&obstacle_cells, &target_cells, &nav_cells);
        } else {
            tracing::debug!(
                roll = pose.roll,
                pitch = pose.pitch,
                "attitude outside tolerance, skipping map update"
            );
        }

        let whole = to_polar(&nav_points);
        let nav = selector::resolve_nav_signal(&cropped, &self.calibration, cfg, &whole, rng);
        let target_signal = to_polar(&target_points);

        PerceptionUpdate {
            vision: VisionImage {
                obstacles,
                targets,
                navigable,
            },
            nav,
            targets: target_signal,
        }
    }
}
