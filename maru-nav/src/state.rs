//! Rover state aggregate owned by the control loop.

use std::fmt;

use netra_vision::{PolarSet, Pose, VisionImage, WorldMap};

use crate::client::Telemetry;

/// Active state of the decision machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Driving toward navigable terrain (initial state)
    #[default]
    Forward,
    /// Braking / waiting for a clear path
    Stop,
    /// Rotating in place to find a new heading
    Rotate,
    /// Reversing away after a pickup or when wedged
    PickedUp,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Forward => "forward",
            Mode::Stop => "stop",
            Mode::Rotate => "rotate",
            Mode::PickedUp => "pickedUp",
        };
        write!(f, "{}", name)
    }
}

/// The single mutable aggregate threaded through perception and decision.
///
/// Created once at startup and reused for the process lifetime; every
/// field except the world map is overwritten each control cycle.
#[derive(Debug)]
pub struct RoverState {
    // --- Telemetry (read-only to the core) ---
    /// Current pose from telemetry
    pub pose: Pose,
    /// Current velocity
    pub vel: f32,
    /// Within pickup range of a target
    pub near_sample: bool,
    /// Pickup currently executing
    pub picking_up: bool,

    // --- Vision outputs ---
    /// Classified masks from the last perception step
    pub vision: VisionImage,
    /// Resolved navigable-terrain signal
    pub nav: PolarSet,
    /// Target signal
    pub targets: PolarSet,

    // --- World map ---
    /// Persistent accumulation grid
    pub map: WorldMap,

    // --- Controller ---
    /// Active mode
    pub mode: Mode,
    /// Throttle output
    pub throttle: f32,
    /// Brake output
    pub brake: f32,
    /// Steering output in degrees
    pub steer: f32,

    // --- Stuck and steering-lock tracking ---
    /// Position at the previous cycle
    pub pos_prev: (f32, f32),
    /// Consecutive cycles without positional progress
    pub pos_count: u32,
    /// Steering angle at the previous cycle
    pub steer_prev: f32,
    /// Consecutive cycles at a locked steering angle
    pub steer_count: u32,

    // --- Mode timers ---
    /// Cycles spent in the current rotation
    pub rotate_timer: u32,
    /// Cycles spent reversing
    pub reverse_timer: u32,
    /// Steering direction chosen on entry into Rotate
    pub rotate_steer: f32,

    // --- Episode flags ---
    /// A target was sighted this cycle
    pub target_sighted: bool,
    /// Pickup request pending for the transport
    pub send_pickup: bool,
    /// Targets collected, mirrored from telemetry
    pub samples_collected: u32,
    /// Targets located, mirrored from telemetry
    pub samples_located: u32,
}

impl RoverState {
    /// Create the initial state for the given map and frame geometry.
    pub fn new(world_size: usize, frame_width: usize, frame_height: usize) -> Self {
        Self {
            pose: Pose::default(),
            vel: 0.0,
            near_sample: false,
            picking_up: false,
            vision: VisionImage::empty(frame_width, frame_height),
            nav: PolarSet::default(),
            targets: PolarSet::default(),
            map: WorldMap::new(world_size),
            mode: Mode::default(),
            throttle: 0.0,
            brake: 0.0,
            steer: 0.0,
            pos_prev: (0.0, 0.0),
            pos_count: 0,
            steer_prev: 0.0,
            steer_count: 0,
            rotate_timer: 0,
            reverse_timer: 0,
            rotate_steer: 0.0,
            target_sighted: false,
            send_pickup: false,
            samples_collected: 0,
            samples_located: 0,
        }
    }

    /// Overwrite the telemetry-fed fields from a new message.
    pub fn apply_telemetry(&mut self, telemetry: &Telemetry) {
        self.pose = telemetry.pose();
        self.vel = telemetry.speed;
        self.near_sample = telemetry.near_sample;
        self.picking_up = telemetry.picking_up;
        self.samples_collected = telemetry.samples_collected;
        self.samples_located = telemetry.samples_located;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let rover = RoverState::new(200, 320, 160);
        assert_eq!(rover.mode, Mode::Forward);
        assert_eq!(rover.pos_count, 0);
        assert!(rover.nav.is_empty());
        assert!(!rover.send_pickup);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::PickedUp.to_string(), "pickedUp");
        assert_eq!(Mode::Forward.to_string(), "forward");
    }
}
