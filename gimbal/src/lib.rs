//! Motorized Gimbal Capture Sequencing
//!
//! Drives a two-axis motorized gimbal (azimuth/roll and field angle/yaw)
//! through a grid of angular positions, pausing at each one to capture an
//! image of a collimated light source, and records the per-capture metadata
//! needed by the downstream stray light analysis.
//!
//! # Modules
//!
//! - [`plan`] - Capture plans (azimuth x field angle grids) and position math
//! - [`motion`] - Motion-device capability traits consumed by the session
//! - [`capture`] - Image capture seam supplied by the integrator
//! - [`session`] - The gimbal session controller that runs a plan
//! - [`sidecar`] - The `config.slconf` capture configuration record
//! - [`config`] - Run configuration with documented defaults
//! - [`sim`] - In-process simulated gimbal for dry runs and tests

pub mod capture;
pub mod config;
pub mod motion;
pub mod plan;
pub mod session;
pub mod sidecar;
pub mod sim;

pub use capture::{CaptureError, ImageCapture};
pub use config::{ConfigError, PlanKind, ReferenceAngles, RunConfig, SessionConfig};
pub use motion::{AxisRef, Device, MotionConnection, MotionConnector, MotionError, MotionProfile};
pub use plan::{image_file_name, CapturePlan, PlannedPosition, Position};
pub use session::{GimbalError, GimbalSession, RunSummary};
pub use sidecar::{CaptureConfig, CaptureRecord, SidecarError, SIDECAR_FILE_NAME};
pub use sim::{MotionEvent, SimulatedGimbal};
