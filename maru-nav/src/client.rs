//! Simulator TCP client for receiving telemetry and sending commands.
//!
//! Framing is a 4-byte big-endian length prefix followed by a JSON
//! payload, in both directions. One telemetry message arrives per
//! simulator step; exactly one command goes back per cycle.

use crate::error::{MaruError, Result};
use netra_vision::{Frame, Pose};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Maximum accepted message size; a raw RGB frame dominates the payload.
const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// One telemetry message from the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    /// Rover position (x, y) in world units
    pub position: (f32, f32),
    /// Heading in degrees [0, 360)
    pub yaw: f32,
    /// Pitch in degrees [0, 360)
    pub pitch: f32,
    /// Roll in degrees [0, 360)
    pub roll: f32,
    /// Forward velocity
    pub speed: f32,
    /// Rover is within pickup range of a target
    pub near_sample: bool,
    /// A pickup is currently executing
    pub picking_up: bool,
    /// Camera frame width in pixels
    pub image_width: usize,
    /// Camera frame height in pixels
    pub image_height: usize,
    /// Raw interleaved RGB24 bytes
    pub image: Vec<u8>,
    /// Targets collected so far (if the simulator reports it)
    #[serde(default)]
    pub samples_collected: u32,
    /// Targets located so far (if the simulator reports it)
    #[serde(default)]
    pub samples_located: u32,
}

impl Telemetry {
    /// Camera frame, validated against the advertised dimensions.
    pub fn frame(&self) -> Result<Frame> {
        Frame::from_raw(self.image_width, self.image_height, self.image.clone()).ok_or_else(|| {
            MaruError::Protocol(format!(
                "frame size mismatch: {}x{} with {} bytes",
                self.image_width,
                self.image_height,
                self.image.len()
            ))
        })
    }

    /// Pose fields as a [`Pose`].
    pub fn pose(&self) -> Pose {
        Pose::new(
            self.position.0,
            self.position.1,
            self.yaw,
            self.pitch,
            self.roll,
        )
    }
}

/// Command sent back to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SimCommand {
    /// Actuation for this cycle
    Drive {
        /// Signed throttle
        throttle: f32,
        /// Non-negative brake
        brake: f32,
        /// Steering angle in degrees, clipped to the steering range
        steer: f32,
    },
    /// Request pickup of the nearby target
    Pickup,
}

/// TCP client for the rover simulator.
pub struct SimClient {
    stream: TcpStream,
}

impl SimClient {
    /// Connect with timeout.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        let addr: std::net::SocketAddr = addr
            .parse()
            .map_err(|e| MaruError::Config(format!("Invalid address: {}", e)))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Receive the next telemetry message (blocking).
    pub fn recv_telemetry(&mut self) -> Result<Telemetry> {
        let mut prefix = [0u8; 4];
        self.stream.read_exact(&mut prefix)?;
        let len = u32::from_be_bytes(prefix) as usize;
        if len == 0 || len > MAX_MESSAGE_SIZE {
            return Err(MaruError::Protocol(format!("invalid message length {}", len)));
        }

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        decode_telemetry(&payload)
    }

    /// Send a framed command.
    pub fn send_command(&mut self, command: &SimCommand) -> Result<()> {
        let framed = encode_command(command)?;
        self.stream.write_all(&framed)?;
        self.stream.flush()?;
        Ok(())
    }
}

fn decode_telemetry(payload: &[u8]) -> Result<Telemetry> {
    Ok(serde_json::from_slice(payload)?)
}

fn encode_command(command: &SimCommand) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(command)?;
    let mut framed = Vec::with_capacity(4 + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_be_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}
