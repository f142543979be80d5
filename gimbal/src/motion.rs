//! Motion device capability traits
//!
//! The gimbal session only needs a handful of operations from the motion
//! controller: detect the attached devices, home them, issue absolute moves
//! without blocking, and wait for an axis to go idle. Vendor integrations
//! implement [`MotionConnector`] / [`MotionConnection`]; kinematics, homing
//! and synchronization stay inside the vendor stack.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default velocity for gimbal moves (deg/s).
pub const DEFAULT_VELOCITY_DEG_S: f64 = 50.0;

/// Default acceleration for gimbal moves (deg/s²).
pub const DEFAULT_ACCELERATION_DEG_S2: f64 = 50.0;

/// Error at the motion device boundary
#[derive(Error, Debug)]
pub enum MotionError {
    /// Could not open or talk to the connection
    #[error("connection error on {port}: {message}")]
    Connection { port: String, message: String },

    /// Requested device index is not in the detected device list
    #[error("no {role} device at index {index} ({detected} devices detected)")]
    DeviceNotFound {
        role: &'static str,
        index: usize,
        detected: usize,
    },

    /// Device or axis reported a fault
    #[error("device {address} fault: {message}")]
    Fault { address: u8, message: String },
}

/// Result type for motion operations
pub type MotionResult<T> = Result<T, MotionError>;

/// A detected motion device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    /// Device address on the daisy chain
    pub address: u8,
}

impl Device {
    /// Reference to one of this device's axes (1-based axis number).
    pub fn axis(&self, axis_number: u8) -> AxisRef {
        AxisRef {
            device_address: self.address,
            axis_number,
        }
    }
}

/// A single rotational axis on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisRef {
    pub device_address: u8,
    /// 1-based axis number on the device
    pub axis_number: u8,
}

impl fmt::Display for AxisRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.device_address, self.axis_number)
    }
}

/// Velocity/acceleration profile for absolute moves, in degree units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    pub velocity_deg_s: f64,
    pub acceleration_deg_s2: f64,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            velocity_deg_s: DEFAULT_VELOCITY_DEG_S,
            acceleration_deg_s2: DEFAULT_ACCELERATION_DEG_S2,
        }
    }
}

/// Opens connections to the motion controller.
pub trait MotionConnector {
    type Connection: MotionConnection;

    /// Open a connection on the given port or bus name.
    ///
    /// The connection is released when the returned value is dropped.
    fn open(&mut self, port: &str) -> MotionResult<Self::Connection>;
}

/// An open connection to one or more daisy-chained motion devices.
pub trait MotionConnection {
    /// List the devices attached to this connection, in detection order.
    fn detect_devices(&mut self) -> MotionResult<Vec<Device>>;

    /// Home every axis of `device`. Blocks until homing completes.
    fn home_all_axes(&mut self, device: Device) -> MotionResult<()>;

    /// Start an absolute move of `axis` to `position_deg`.
    ///
    /// Returns as soon as the move is issued; use
    /// [`wait_until_idle`](Self::wait_until_idle) to wait for completion.
    fn move_absolute(
        &mut self,
        axis: AxisRef,
        position_deg: f64,
        profile: &MotionProfile,
    ) -> MotionResult<()>;

    /// Block until `axis` reports idle.
    fn wait_until_idle(&mut self, axis: AxisRef) -> MotionResult<()>;
}
