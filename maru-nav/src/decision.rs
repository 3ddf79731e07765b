//! Decision state machine turning navigation signals into actuation.
//!
//! Four modes: `Forward` drives toward the mean navigable angle, `Stop`
//! brakes and waits for a clear path, `Rotate` spins in place, and
//! `PickedUp` reverses out of dead ends. Stuck and steering-lock
//! detection run every cycle and force recovery transitions; target
//! acquisition overrides steering in any mode. Every branch produces a
//! complete actuation triple; nothing in here can fail.

use netra_vision::RandomSource;

use crate::config::DriveConfig;
use crate::state::{Mode, RoverState};

/// The decision controller.
pub struct DecisionController {
    config: DriveConfig,
}

impl DecisionController {
    /// Create a controller with the given drive parameters.
    pub fn new(config: DriveConfig) -> Self {
        Self { config }
    }

    /// Run one decision step, updating mode and actuation in place.
    pub fn step(&self, rover: &mut RoverState, rng: &mut RandomSource) {
        self.check_stuck(rover, rng);
        self.check_steering_lock(rover);

        // Sighting status is re-derived from this cycle's data below.
        rover.target_sighted = false;

        if rover.nav.is_empty() {
            // No navigation data at all: fixed default creep.
            rover.throttle = self.config.throttle_set;
            rover.steer = 0.0;
            rover.brake = 0.0;
        } else {
            match rover.mode {
                Mode::PickedUp => self.reverse_out(rover),
                Mode::Forward => self.drive_forward(rover),
                Mode::Rotate => self.rotate_in_place(rover),
                Mode::Stop => self.hold_or_resume(rover),
            }
        }

        self.acquire_target(rover);
        self.request_pickup(rover);
    }

    /// Count cycles without positional progress while driving forward;
    /// saturation forces a randomized recovery mode.
    fn check_stuck(&self, rover: &mut RoverState, rng: &mut RandomSource) {
        let (px, py) = rover.pos_prev;
        let still = (rover.pose.x - px).abs() < self.config.stuck_tolerance
            && (rover.pose.y - py).abs() < self.config.stuck_tolerance;

        if still && rover.mode == Mode::Forward {
            rover.pos_count += 1;
        } else {
            rover.pos_count = 0;
        }
        rover.pos_prev = (rover.pose.x, rover.pose.y);

        if rover.pos_count >= self.config.max_pos_count {
            if rng.coin_flip() {
                rover.mode = Mode::PickedUp;
            } else {
                self.enter_rotate(rover, rng);
            }
            tracing::info!(mode = %rover.mode, "no positional progress, forcing recovery");
            rover.pos_count = 0;
        }
    }

    /// Count cycles with the steering pinned hard over; saturation forces
    /// a braked reverse.
    fn check_steering_lock(&self, rover: &mut RoverState) {
        let locked = (rover.steer - rover.steer_prev).abs() <= self.config.steer_band
            && rover.steer.abs() > self.config.steer_lock_min
            && !rover.target_sighted
            && rover.mode == Mode::Forward;

        if locked {
            rover.steer_count += 1;
        } else {
            rover.steer_count = 0;
        }

        if rover.steer_count >= self.config.max_steer_count {
            tracing::info!("steering locked hard over, backing away");
            rover.steer_count = 0;
            rover.brake = self.config.brake_hard;
            rover.steer = -self.config.steer_limit;
            rover.mode = Mode::PickedUp;
        }
        rover.steer_prev = rover.steer;
    }

    /// Enter `Rotate` with a randomly chosen direction held for the whole
    /// rotation.
    fn enter_rotate(&self, rover: &mut RoverState, rng: &mut RandomSource) {
        rover.rotate_steer = if rng.coin_flip() {
            self.config.steer_limit
        } else {
            -self.config.steer_limit
        };
        rover.rotate_timer = 0;
        rover.mode = Mode::Rotate;
    }

    /// `PickedUp`: reverse with a small corrective steer for a fixed
    /// number of cycles, frozen while a pickup is actually executing.
    fn reverse_out(&self, rover: &mut RoverState) {
        rover.steer = self.config.reverse_steer;
        rover.throttle = self.config.reverse_throttle;
        rover.brake = 0.0;

        if !rover.picking_up {
            rover.reverse_timer += 1;
        }
        if rover.reverse_timer > self.config.reverse_duration {
            rover.mode = Mode::Forward;
            rover.brake = self.config.brake_set;
            rover.reverse_timer = 0;
        }
    }

    /// `Forward`: accelerate along the mean navigable angle, or brake into
    /// `Stop` when terrain runs out.
    fn drive_forward(&self, rover: &mut RoverState) {
        if rover.nav.len() >= self.config.stop_forward {
            rover.throttle = if rover.vel < self.config.max_vel {
                self.config.throttle_set
            } else {
                0.0
            };
            rover.brake = 0.0;
            rover.steer = self.clip_steer(rover.nav.mean_angle_deg());
        } else {
            rover.throttle = 0.0;
            rover.brake = self.config.brake_set;
            rover.steer = 0.0;
            rover.mode = Mode::Stop;
            tracing::debug!("navigable terrain exhausted, stopping");
        }
    }

    /// `Rotate`: four-wheel turn in place for a fixed duration.
    fn rotate_in_place(&self, rover: &mut RoverState) {
        rover.throttle = 0.0;
        rover.brake = 0.0;
        rover.steer = rover.rotate_steer;

        rover.rotate_timer += 1;
        if rover.rotate_timer >= self.config.rotate_duration {
            rover.rotate_timer = 0;
            rover.mode = Mode::Forward;
        }
    }

    /// `Stop`: brake to a standstill, then either turn in place or resume
    /// forward once enough terrain is visible.
    fn hold_or_resume(&self, rover: &mut RoverState) {
        if rover.vel > self.config.settle_vel {
            rover.throttle = 0.0;
            rover.brake = self.config.brake_set;
            rover.steer = 0.0;
        } else if rover.nav.len() < self.config.go_forward {
            rover.throttle = 0.0;
            rover.brake = 0.0;
            rover.steer = -self.config.steer_limit;
        } else {
            rover.throttle = self.config.throttle_set;
            rover.brake = 0.0;
            rover.steer = self.clip_steer(rover.nav.mean_angle_deg());
            rover.mode = Mode::Forward;
        }
    }

    /// Steering overrides toward targets, regardless of mode.
    fn acquire_target(&self, rover: &mut RoverState) {
        if rover.near_sample {
            rover.target_sighted = true;
            rover.throttle = 0.0;
            rover.brake = self.config.brake_hard;
            rover.steer = 0.0;
        } else if !rover.targets.is_empty() {
            rover.target_sighted = true;
            rover.throttle = self.config.creep_throttle;
            rover.steer = self.clip_steer(rover.targets.mean_angle_deg());
        }
    }

    /// Stopped next to a target with no pickup running: raise the
    /// pickup-request flag and back away once it completes.
    fn request_pickup(&self, rover: &mut RoverState) {
        if rover.near_sample && rover.vel == 0.0 && !rover.picking_up {
            rover.send_pickup = true;
            rover.mode = Mode::PickedUp;
            tracing::info!("stopped at target, requesting pickup");
        }
    }

    #[inline]
    fn clip_steer(&self, angle_deg: f32) -> f32 {
        angle_deg.clamp(-self.config.steer_limit, self.config.steer_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netra_vision::PolarSet;

    fn controller() -> DecisionController {
        DecisionController::new(DriveConfig::default())
    }

    fn polar(n: usize, angle: f32) -> PolarSet {
        PolarSet {
            dist: vec![10.0; n],
            angles: vec![angle; n],
        }
    }

    fn rover_with_nav(n: usize, angle: f32) -> RoverState {
        let mut rover = RoverState::new(200, 320, 160);
        rover.nav = polar(n, angle);
        rover
    }

    /// First seed in a small range whose first flip matches `want`.
    fn seed_with_flip(want: bool) -> u64 {
        (1..=256)
            .find(|&s| RandomSource::new(s).coin_flip() == want)
            .expect("some seed produces each outcome")
    }

    #[test]
    fn test_forward_accelerates_toward_mean_angle() {
        let mut rover = rover_with_nav(600, 10f32.to_radians());
        rover.vel = 1.0;
        // Stay off the stuck path: the rover moved since last cycle.
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Forward);
        assert_eq!(rover.throttle, 0.3);
        assert_eq!(rover.brake, 0.0);
        assert!((rover.steer - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_forward_coasts_at_max_velocity() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.vel = 2.5;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.throttle, 0.0);
        assert_eq!(rover.brake, 0.0);
    }

    #[test]
    fn test_forward_steering_is_clipped() {
        let mut rover = rover_with_nav(600, 0.6);
        rover.pos_prev = (1.0, 1.0);
        controller().step(&mut rover, &mut RandomSource::new(1));
        assert_eq!(rover.steer, 15.0);

        let mut rover = rover_with_nav(600, -0.6);
        rover.pos_prev = (1.0, 1.0);
        controller().step(&mut rover, &mut RandomSource::new(1));
        assert_eq!(rover.steer, -15.0);
    }

    #[test]
    fn test_forward_brakes_into_stop_without_terrain() {
        let mut rover = rover_with_nav(50, 0.0);
        rover.vel = 1.0;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Stop);
        assert_eq!(rover.throttle, 0.0);
        assert_eq!(rover.brake, 10.0);
        assert_eq!(rover.steer, 0.0);
    }

    #[test]
    fn test_stop_keeps_braking_while_moving() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.mode = Mode::Stop;
        rover.vel = 1.0;

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Stop);
        assert_eq!(rover.brake, 10.0);
    }

    #[test]
    fn test_stop_turns_in_place_when_terrain_is_thin() {
        let mut rover = rover_with_nav(200, 0.0);
        rover.mode = Mode::Stop;
        rover.vel = 0.1;

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Stop);
        assert_eq!(rover.throttle, 0.0);
        assert_eq!(rover.brake, 0.0);
        assert_eq!(rover.steer, -15.0);
    }

    #[test]
    fn test_stop_resumes_forward_with_open_terrain() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.mode = Mode::Stop;
        rover.vel = 0.0;

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Forward);
        assert_eq!(rover.throttle, 0.3);
        assert_eq!(rover.brake, 0.0);
    }

    #[test]
    fn test_rotate_holds_direction_then_resumes() {
        let config = DriveConfig {
            rotate_duration: 2,
            ..Default::default()
        };
        let controller = DecisionController::new(config);

        let mut rover = rover_with_nav(600, 0.0);
        rover.mode = Mode::Rotate;
        rover.rotate_steer = 15.0;

        controller.step(&mut rover, &mut RandomSource::new(1));
        assert_eq!(rover.mode, Mode::Rotate);
        assert_eq!(rover.throttle, 0.0);
        assert_eq!(rover.brake, 0.0);
        assert_eq!(rover.steer, 15.0);
        assert_eq!(rover.rotate_timer, 1);

        controller.step(&mut rover, &mut RandomSource::new(1));
        assert_eq!(rover.mode, Mode::Forward);
        // The same counter that was incremented is reset.
        assert_eq!(rover.rotate_timer, 0);
    }

    #[test]
    fn test_picked_up_reverses_then_resumes() {
        let config = DriveConfig {
            reverse_duration: 3,
            ..Default::default()
        };
        let controller = DecisionController::new(config);

        let mut rover = rover_with_nav(600, 0.0);
        rover.mode = Mode::PickedUp;

        for expected_timer in 1..=3 {
            controller.step(&mut rover, &mut RandomSource::new(1));
            assert_eq!(rover.mode, Mode::PickedUp);
            assert_eq!(rover.throttle, -0.3);
            assert_eq!(rover.steer, -5.0);
            assert_eq!(rover.brake, 0.0);
            assert_eq!(rover.reverse_timer, expected_timer);
        }

        // Timer exceeds the duration: brake briefly and resume forward.
        controller.step(&mut rover, &mut RandomSource::new(1));
        assert_eq!(rover.mode, Mode::Forward);
        assert_eq!(rover.brake, 10.0);
        assert_eq!(rover.reverse_timer, 0);
    }

    #[test]
    fn test_picked_up_timer_frozen_while_picking_up() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.mode = Mode::PickedUp;
        rover.picking_up = true;

        for _ in 0..5 {
            controller().step(&mut rover, &mut RandomSource::new(1));
        }
        assert_eq!(rover.reverse_timer, 0);
        assert_eq!(rover.mode, Mode::PickedUp);
    }

    #[test]
    fn test_stuck_counter_saturates_into_recovery() {
        let config = DriveConfig {
            max_pos_count: 3,
            ..Default::default()
        };
        let controller = DecisionController::new(config);
        let mut rover = rover_with_nav(600, 0.0);
        let mut rng = RandomSource::new(9);

        controller.step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 1);
        controller.step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 2);
        assert_eq!(rover.mode, Mode::Forward);

        // Exactly max_pos_count consecutive still cycles trigger recovery.
        controller.step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 0);
        assert!(rover.mode == Mode::PickedUp || rover.mode == Mode::Rotate);
    }

    #[test]
    fn test_stuck_counter_resets_on_motion() {
        let config = DriveConfig {
            max_pos_count: 5,
            ..Default::default()
        };
        let controller = DecisionController::new(config);
        let mut rover = rover_with_nav(600, 0.0);
        let mut rng = RandomSource::new(9);

        controller.step(&mut rover, &mut rng);
        controller.step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 2);

        // Moving past the tolerance resets the counter the next cycle.
        rover.pose.x += 0.05;
        controller.step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 0);
        assert_eq!(rover.mode, Mode::Forward);
    }

    #[test]
    fn test_stuck_tolerance_is_per_axis() {
        let mut rover = rover_with_nav(600, 0.0);
        let mut rng = RandomSource::new(9);

        // Sub-tolerance drift still counts as stuck.
        controller().step(&mut rover, &mut rng);
        rover.pose.x += 0.005;
        rover.pose.y -= 0.005;
        controller().step(&mut rover, &mut rng);
        assert_eq!(rover.pos_count, 2);
    }

    #[test]
    fn test_stuck_recovery_reaches_both_modes() {
        let config = DriveConfig {
            max_pos_count: 1,
            ..Default::default()
        };
        let controller = DecisionController::new(config);

        let mut rover = rover_with_nav(600, 0.0);
        let mut heads = RandomSource::new(seed_with_flip(true));
        controller.step(&mut rover, &mut heads);
        assert_eq!(rover.mode, Mode::PickedUp);

        let mut rover = rover_with_nav(600, 0.0);
        let mut tails = RandomSource::new(seed_with_flip(false));
        controller.step(&mut rover, &mut tails);
        assert_eq!(rover.mode, Mode::Rotate);
        assert_eq!(rover.rotate_steer.abs(), 15.0);
        assert_eq!(rover.rotate_timer, 0);
    }

    #[test]
    fn test_steering_lock_forces_reverse() {
        let config = DriveConfig {
            max_steer_count: 3,
            ..Default::default()
        };
        let controller = DecisionController::new(config);

        // Hard right turn every cycle while the rover keeps moving.
        let mut rover = rover_with_nav(600, 0.3);
        let mut rng = RandomSource::new(9);

        let mut steps = 0;
        while rover.mode == Mode::Forward && steps < 10 {
            rover.pose.x += 0.05;
            controller.step(&mut rover, &mut rng);
            steps += 1;
        }

        assert_eq!(rover.mode, Mode::PickedUp);
        assert_eq!(rover.steer_count, 0);
        // The reverse branch ran in the same cycle the lock tripped.
        assert_eq!(rover.throttle, -0.3);
    }

    #[test]
    fn test_steering_lock_ignores_target_chase() {
        let config = DriveConfig {
            max_steer_count: 3,
            ..Default::default()
        };
        let controller = DecisionController::new(config);

        // Chasing a target off to the side pins the steering, but the
        // sighting suppresses lock detection.
        let mut rover = rover_with_nav(600, 0.3);
        rover.targets = polar(8, 0.3);
        let mut rng = RandomSource::new(9);

        for _ in 0..8 {
            rover.pose.x += 0.05;
            controller.step(&mut rover, &mut rng);
            assert_eq!(rover.mode, Mode::Forward);
            assert_eq!(rover.steer_count, 0);
        }
    }

    #[test]
    fn test_no_navigation_data_creeps() {
        let mut rover = rover_with_nav(0, 0.0);
        rover.mode = Mode::Forward;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert_eq!(rover.mode, Mode::Forward);
        assert_eq!(rover.throttle, 0.3);
        assert_eq!(rover.brake, 0.0);
        assert_eq!(rover.steer, 0.0);
    }

    #[test]
    fn test_near_sample_brakes_hard() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.near_sample = true;
        rover.vel = 0.5;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert!(rover.target_sighted);
        assert_eq!(rover.throttle, 0.0);
        assert_eq!(rover.brake, 20.0);
        assert_eq!(rover.steer, 0.0);
        // Still rolling: no pickup request yet.
        assert!(!rover.send_pickup);
        assert_eq!(rover.mode, Mode::Forward);
    }

    #[test]
    fn test_target_pixels_steer_creep() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.targets = polar(10, 0.1);
        rover.vel = 1.0;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert!(rover.target_sighted);
        assert_eq!(rover.throttle, 0.07);
        assert!((rover.steer - 0.1f32.to_degrees()).abs() < 1e-3);
    }

    #[test]
    fn test_pickup_requested_when_stopped_at_target() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.near_sample = true;
        rover.vel = 0.0;
        rover.picking_up = false;
        rover.pos_prev = (1.0, 1.0);

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert!(rover.send_pickup);
        assert_eq!(rover.mode, Mode::PickedUp);
        assert_eq!(rover.brake, 20.0);
    }

    #[test]
    fn test_no_second_request_while_picking_up() {
        let mut rover = rover_with_nav(600, 0.0);
        rover.near_sample = true;
        rover.vel = 0.0;
        rover.picking_up = true;
        rover.mode = Mode::PickedUp;

        controller().step(&mut rover, &mut RandomSource::new(1));

        assert!(!rover.send_pickup);
    }

    #[test]
    fn test_every_mode_produces_actuation() {
        for mode in [Mode::Forward, Mode::Stop, Mode::Rotate, Mode::PickedUp] {
            for nav_count in [0usize, 50, 600] {
                let mut rover = rover_with_nav(nav_count, 0.2);
                rover.mode = mode;
                rover.vel = 0.5;
                controller().step(&mut rover, &mut RandomSource::new(3));

                assert!(rover.throttle.is_finite());
                assert!(rover.brake.is_finite() && rover.brake >= 0.0);
                assert!(rover.steer.is_finite());
                assert!(rover.steer.abs() <= 15.0);
            }
        }
    }
}
