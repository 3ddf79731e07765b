//! Perception configuration.

use serde::Deserialize;

/// Thresholds and geometry constants for the perception pipeline.
///
/// Defaults reproduce the tuned values the pipeline was calibrated with;
/// retuning any of them shifts classification recall and map fidelity.
#[derive(Clone, Debug, Deserialize)]
pub struct PerceptionConfig {
    /// Camera frame width in pixels (default: 320)
    #[serde(default = "default_frame_width")]
    pub frame_width: usize,

    /// Camera frame height in pixels (default: 160)
    #[serde(default = "default_frame_height")]
    pub frame_height: usize,

    /// Rows above this index are sky and get zeroed (default: 80)
    #[serde(default = "default_horizon_row")]
    pub horizon_row: usize,

    /// RGB thresholds a navigable pixel must exceed (default: 160,160,160)
    #[serde(default = "default_nav_threshold")]
    pub nav_threshold: [u8; 3],

    /// Weak-navigability thresholds; failing all marks an obstacle
    /// (default: 85,85,85)
    #[serde(default = "default_obstacle_threshold")]
    pub obstacle_threshold: [u8; 3],

    /// Inclusive lower RGB bound of the target signature (default: 100,100,0)
    #[serde(default = "default_target_low")]
    pub target_low: [u8; 3],

    /// Inclusive upper RGB bound of the target signature (default: 255,255,55)
    #[serde(default = "default_target_high")]
    pub target_high: [u8; 3],

    /// Half-width of the rectified destination square in pixels (default: 5)
    #[serde(default = "default_dst_size")]
    pub dst_size: f32,

    /// Offset of the destination square from the frame bottom (default: 6)
    #[serde(default = "default_bottom_offset")]
    pub bottom_offset: f32,

    /// Radial trust limit for map accumulation, rover-frame units
    /// (default: 80)
    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// World map side length in cells (default: 200)
    #[serde(default = "default_world_size")]
    pub world_size: usize,

    /// Rectified pixels per world unit (default: 10)
    #[serde(default = "default_world_scale")]
    pub world_scale: f32,

    /// Roll tolerance for map updates, degrees (default: 0.5)
    #[serde(default = "default_roll_limit")]
    pub roll_limit: f32,

    /// Pitch tolerance for map updates, degrees (default: 0.5)
    #[serde(default = "default_pitch_limit")]
    pub pitch_limit: f32,

    /// Mean-angle magnitude below which a half-view counts as straight,
    /// radians (default: 0.5)
    #[serde(default = "default_straight_angle")]
    pub straight_angle: f32,

    /// Mean-angle magnitude above which a half-view dominates, radians
    /// (default: 0.6)
    #[serde(default = "default_dominant_angle")]
    pub dominant_angle: f32,

    /// Mean-angle magnitude below which the other half counts as minor,
    /// radians (default: 0.4)
    #[serde(default = "default_minor_angle")]
    pub minor_angle: f32,

    /// Pixel-count difference under which the halves tie (default: 150)
    #[serde(default = "default_tie_margin")]
    pub tie_margin: usize,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            horizon_row: default_horizon_row(),
            nav_threshold: default_nav_threshold(),
            obstacle_threshold: default_obstacle_threshold(),
            target_low: default_target_low(),
            target_high: default_target_high(),
            dst_size: default_dst_size(),
            bottom_offset: default_bottom_offset(),
            max_range: default_max_range(),
            world_size: default_world_size(),
            world_scale: default_world_scale(),
            roll_limit: default_roll_limit(),
            pitch_limit: default_pitch_limit(),
            straight_angle: default_straight_angle(),
            dominant_angle: default_dominant_angle(),
            minor_angle: default_minor_angle(),
            tie_margin: default_tie_margin(),
        }
    }
}

// Default value functions
fn default_frame_width() -> usize {
    320
}
fn default_frame_height() -> usize {
    160
}
fn default_horizon_row() -> usize {
    80
}
fn default_nav_threshold() -> [u8; 3] {
    [160, 160, 160]
}
fn default_obstacle_threshold() -> [u8; 3] {
    [85, 85, 85]
}
fn default_target_low() -> [u8; 3] {
    [100, 100, 0]
}
fn default_target_high() -> [u8; 3] {
    [255, 255, 55]
}
fn default_dst_size() -> f32 {
    5.0
}
fn default_bottom_offset() -> f32 {
    6.0
}
fn default_max_range() -> f32 {
    80.0
}
fn default_world_size() -> usize {
    200
}
fn default_world_scale() -> f32 {
    10.0
}
fn default_roll_limit() -> f32 {
    0.5
}
fn default_pitch_limit() -> f32 {
    0.5
}
fn default_straight_angle() -> f32 {
    0.5
}
fn default_dominant_angle() -> f32 {
    0.6
}
fn default_minor_angle() -> f32 {
    0.4
}
fn default_tie_margin() -> usize {
    150
}
