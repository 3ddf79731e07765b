//! Configuration loading for MaruNav

use crate::error::{MaruError, Result};
use netra_vision::PerceptionConfig;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct MaruConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub perception: PerceptionConfig,
    #[serde(default)]
    pub output: OutputConfig,

    /// Seed for the randomized recovery/tie-break choices
    /// (default: 0 = entropy)
    #[serde(default)]
    pub seed: u64,
}

/// Network connection settings
#[derive(Clone, Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Simulator IP address (default: 127.0.0.1)
    #[serde(default = "default_sim_ip")]
    pub sim_ip: String,

    /// TCP port number (default: 4567)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Path to save the world-map image
    #[serde(default = "default_map_path")]
    pub map_path: String,
}

/// Decision-controller parameters
#[derive(Clone, Debug, Deserialize)]
pub struct DriveConfig {
    /// Throttle setting when accelerating (default: 0.3)
    #[serde(default = "default_throttle_set")]
    pub throttle_set: f32,

    /// Brake setting when braking (default: 10)
    #[serde(default = "default_brake_set")]
    pub brake_set: f32,

    /// Brake setting for hard stops near targets and steering recovery
    /// (default: 20)
    #[serde(default = "default_brake_hard")]
    pub brake_hard: f32,

    /// Creep throttle while homing on a target (default: 0.07)
    #[serde(default = "default_creep_throttle")]
    pub creep_throttle: f32,

    /// Maximum velocity before coasting (default: 2.4)
    #[serde(default = "default_max_vel")]
    pub max_vel: f32,

    /// Steering clip range in degrees (default: 15)
    #[serde(default = "default_steer_limit")]
    pub steer_limit: f32,

    /// Navigable-pixel count below which forward mode stops (default: 100)
    #[serde(default = "default_stop_forward")]
    pub stop_forward: usize,

    /// Navigable-pixel count required to resume from stop (default: 500)
    #[serde(default = "default_go_forward")]
    pub go_forward: usize,

    /// Velocity below which the rover counts as settled (default: 0.2)
    #[serde(default = "default_settle_vel")]
    pub settle_vel: f32,

    // --- Recovery and stuck detection parameters ---
    /// Per-axis position tolerance for stuck detection (default: 0.01)
    #[serde(default = "default_stuck_tolerance")]
    pub stuck_tolerance: f32,

    /// Consecutive still cycles before recovery triggers (default: 40)
    #[serde(default = "default_max_pos_count")]
    pub max_pos_count: u32,

    /// Steering band around the previous angle that counts as locked
    /// (default: 2)
    #[serde(default = "default_steer_band")]
    pub steer_band: f32,

    /// Steering magnitude above which lock detection applies (default: 10)
    #[serde(default = "default_steer_lock_min")]
    pub steer_lock_min: f32,

    /// Consecutive locked-steering cycles before recovery (default: 200)
    #[serde(default = "default_max_steer_count")]
    pub max_steer_count: u32,

    /// Cycles spent rotating in place during recovery (default: 120)
    #[serde(default = "default_rotate_duration")]
    pub rotate_duration: u32,

    /// Cycles spent reversing after a pickup or when wedged (default: 88)
    #[serde(default = "default_reverse_duration")]
    pub reverse_duration: u32,

    /// Throttle while reversing (default: -0.3)
    #[serde(default = "default_reverse_throttle")]
    pub reverse_throttle: f32,

    /// Corrective steer while reversing (default: -5)
    #[serde(default = "default_reverse_steer")]
    pub reverse_steer: f32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            sim_ip: default_sim_ip(),
            port: default_port(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            throttle_set: default_throttle_set(),
            brake_set: default_brake_set(),
            brake_hard: default_brake_hard(),
            creep_throttle: default_creep_throttle(),
            max_vel: default_max_vel(),
            steer_limit: default_steer_limit(),
            stop_forward: default_stop_forward(),
            go_forward: default_go_forward(),
            settle_vel: default_settle_vel(),
            // Recovery and stuck detection
            stuck_tolerance: default_stuck_tolerance(),
            max_pos_count: default_max_pos_count(),
            steer_band: default_steer_band(),
            steer_lock_min: default_steer_lock_min(),
            max_steer_count: default_max_steer_count(),
            rotate_duration: default_rotate_duration(),
            reverse_duration: default_reverse_duration(),
            reverse_throttle: default_reverse_throttle(),
            reverse_steer: default_reverse_steer(),
        }
    }
}

impl Default for MaruConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            drive: DriveConfig::default(),
            perception: PerceptionConfig::default(),
            output: OutputConfig::default(),
            seed: 0,
        }
    }
}

// Default value functions
fn default_sim_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    4567
}
fn default_timeout() -> u64 {
    5000
}
fn default_map_path() -> String {
    "output/worldmap.png".to_string()
}

// Drive defaults
fn default_throttle_set() -> f32 {
    0.3
}
fn default_brake_set() -> f32 {
    10.0
}
fn default_brake_hard() -> f32 {
    20.0
}
fn default_creep_throttle() -> f32 {
    0.07
}
fn default_max_vel() -> f32 {
    2.4
}
fn default_steer_limit() -> f32 {
    15.0
}
fn default_stop_forward() -> usize {
    100
}
fn default_go_forward() -> usize {
    500
}
fn default_settle_vel() -> f32 {
    0.2
}

// Recovery and stuck detection defaults
fn default_stuck_tolerance() -> f32 {
    0.01
}
fn default_max_pos_count() -> u32 {
    40
}
fn default_steer_band() -> f32 {
    2.0
}
fn default_steer_lock_min() -> f32 {
    10.0
}
fn default_max_steer_count() -> u32 {
    200
}
fn default_rotate_duration() -> u32 {
    120
}
fn default_reverse_duration() -> u32 {
    88
}
fn default_reverse_throttle() -> f32 {
    -0.3
}
fn default_reverse_steer() -> f32 {
    -5.0
}

impl MaruConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MaruError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MaruConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the full address string for connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.connection.sim_ip, self.connection.port)
    }
}
