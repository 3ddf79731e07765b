//! MaruNav - Rover decision controller
//!
//! Connects to the rover simulator, runs the perception pipeline and the
//! decision state machine once per telemetry event, and relays actuation
//! commands back. The accumulated world map is saved when the telemetry
//! stream ends.
//!
//! The control loop is single-threaded and synchronous: one cycle per
//! inbound telemetry message, perception then decision to completion,
//! then exactly one outbound command.

mod client;
mod config;
mod control;
mod decision;
mod error;
mod state;

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use client::{SimClient, SimCommand};
use config::MaruConfig;
use control::ControlLoop;
use error::{MaruError, Result};
use state::RoverState;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("maru_nav=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config = if args.len() > 1 && !args[1].starts_with("--") {
        // Load config from file
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        MaruConfig::load(config_path)?
    } else {
        // Check for --sim argument
        let sim_addr = args
            .iter()
            .position(|a| a == "--sim")
            .and_then(|i| args.get(i + 1))
            .cloned();

        let mut config = if Path::new("maru.toml").exists() {
            info!("Loading configuration from maru.toml");
            MaruConfig::load(Path::new("maru.toml"))?
        } else {
            info!("Using default configuration");
            MaruConfig::default()
        };

        // Override simulator address if provided
        if let Some(addr) = sim_addr {
            info!("Using simulator address: {}", addr);
            match addr.rsplit_once(':') {
                Some((ip, port)) => {
                    config.connection.sim_ip = ip.to_string();
                    config.connection.port = port
                        .parse()
                        .map_err(|e| MaruError::Config(format!("Invalid port: {}", e)))?;
                }
                None => config.connection.sim_ip = addr,
            }
        }

        config
    };

    info!("MaruNav v{}", env!("CARGO_PKG_VERSION"));
    info!("Connecting to {}", config.address());

    let mut rover = RoverState::new(
        config.perception.world_size,
        config.perception.frame_width,
        config.perception.frame_height,
    );
    let mut control = ControlLoop::new(&config);

    let timeout = Duration::from_millis(config.connection.timeout_ms);
    let mut client = SimClient::connect_timeout(&config.address(), timeout)?;
    info!("Connected, driving autonomously");

    // Rough cycles-per-second accounting for the status line
    let mut cycle_counter = 0u32;
    let mut second_counter = Instant::now();

    loop {
        let telemetry = match client.recv_telemetry() {
            Ok(t) => t,
            Err(e) => {
                info!("Telemetry stream ended: {}", e);
                break;
            }
        };

        let command = match control.cycle(&mut rover, &telemetry) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping cycle: {}", e);
                continue;
            }
        };

        if matches!(command, SimCommand::Pickup) {
            info!(
                "Pickup requested ({} collected so far)",
                rover.samples_collected
            );
        }
        client.send_command(&command)?;

        cycle_counter += 1;
        if second_counter.elapsed() >= Duration::from_secs(1) {
            debug!(
                "{} cycles/s, mode {}, {} nav points",
                cycle_counter,
                rover.mode,
                rover.nav.len()
            );
            cycle_counter = 0;
            second_counter = Instant::now();
        }
    }

    save_map(&config, &rover)?;

    info!("MaruNav finished");
    Ok(())
}

/// Save the accumulated world map to the configured path.
fn save_map(config: &MaruConfig, rover: &RoverState) -> Result<()> {
    let coverage = rover.map.coverage();
    info!(
        "Map statistics: {} navigable cells, {} obstacle cells, {} target cells",
        coverage.navigable, coverage.obstacles, coverage.targets
    );

    let map_path = Path::new(&config.output.map_path);
    if let Some(parent) = map_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    netra_vision::io::save_map_png(&rover.map, map_path)
        .map_err(|e| MaruError::Config(format!("Failed to save map: {}", e)))?;
    info!("Map saved to {:?}", map_path);

    Ok(())
}
