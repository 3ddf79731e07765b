//! One control cycle: telemetry in, a single command out.
//!
//! Perception and decision run synchronously to completion for every
//! inbound telemetry event; there is no overlap between cycles.

use netra_vision::{Perception, RandomSource};

use crate::client::{SimCommand, Telemetry};
use crate::config::MaruConfig;
use crate::decision::DecisionController;
use crate::error::Result;
use crate::state::RoverState;

/// The synchronous perception + decision pipeline.
pub struct ControlLoop {
    perception: Perception,
    controller: DecisionController,
    rng: RandomSource,
}

impl ControlLoop {
    /// Build the pipeline from configuration.
    pub fn new(config: &MaruConfig) -> Self {
        Self {
            perception: Perception::new(config.perception.clone()),
            controller: DecisionController::new(config.drive.clone()),
            rng: RandomSource::new(config.seed),
        }
    }

    /// Run one cycle against the rover state.
    ///
    /// Non-finite telemetry velocity skips perception and decision
    /// entirely and yields the neutral command; nothing is mutated beyond
    /// the telemetry mirror fields.
    pub fn cycle(&mut self, rover: &mut RoverState, telemetry: &Telemetry) -> Result<SimCommand> {
        rover.apply_telemetry(telemetry);

        if !rover.vel.is_finite() {
            tracing::warn!(vel = rover.vel, "non-finite velocity, emitting neutral command");
            return Ok(SimCommand::Drive {
                throttle: 0.0,
                brake: 0.0,
                steer: 0.0,
            });
        }

        let frame = telemetry.frame()?;
        let update = self
            .perception
            .process(&frame, &rover.pose, &mut rover.map, &mut self.rng);
        rover.vision = update.vision;
        rover.nav = update.nav;
        rover.targets = update.targets;

        self.controller.step(rover, &mut self.rng);

        // A pending pickup request replaces this cycle's drive command and
        // is re-armed only after the simulator acknowledges completion.
        if rover.send_pickup && !rover.picking_up {
            rover.send_pickup = false;
            return Ok(SimCommand::Pickup);
        }

        Ok(SimCommand::Drive {
            throttle: rover.throttle,
            brake: rover.brake,
            steer: rover.steer,
        })
    }
}
