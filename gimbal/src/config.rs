//! Run configuration
//!
//! Every input the gimbal session needs, with defaults matching the sample
//! bench setup. A JSON file may override any subset of the fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::MotionProfile;
use crate::plan::{CapturePlan, Position};

/// Error loading a run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pause time {0} s")]
    InvalidPause(f64),
}

/// Absolute gimbal position where the camera is aligned with the light source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceAngles {
    pub azimuth_deg: f64,
    pub field_deg: f64,
}

impl From<ReferenceAngles> for Position {
    fn from(reference: ReferenceAngles) -> Self {
        Position::new(reference.azimuth_deg, reference.field_deg)
    }
}

/// Inputs to one gimbal session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory for images and the sidecar. Capture is skipped if absent or missing.
    pub output_dir: Option<PathBuf>,
    /// Image file extension without the dot
    pub image_extension: String,
    /// Settle time between the end of motion and the capture call
    pub pause_time_s: f64,
    pub reference: ReferenceAngles,
    /// Home every detected device before the first move
    pub home_before_run: bool,
    /// Serial port or bus name of the motion controller
    pub port: String,
    /// Index into the detected device list of the azimuth (roll) device
    pub azimuth_device_index: usize,
    /// Index into the detected device list of the field angle (yaw) device
    pub field_device_index: usize,
    pub motion_profile: MotionProfile,
    pub run_name: String,
    pub comment: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            image_extension: "png".to_string(),
            pause_time_s: 0.5,
            reference: ReferenceAngles::default(),
            home_before_run: false,
            port: "COM4".to_string(),
            azimuth_device_index: 1,
            field_device_index: 0,
            motion_profile: MotionProfile::default(),
            run_name: "sample_run_123abc".to_string(),
            comment: "This is a sample capture config".to_string(),
        }
    }
}

impl SessionConfig {
    /// Settle pause as a `Duration`.
    pub fn pause(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.pause_time_s)
            .map_err(|_| ConfigError::InvalidPause(self.pause_time_s))
    }
}

/// Which sample capture plan to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    HorizontalSweep,
    #[default]
    Star,
}

impl PlanKind {
    pub fn build(self) -> CapturePlan {
        match self {
            PlanKind::HorizontalSweep => CapturePlan::horizontal_sweep(),
            PlanKind::Star => CapturePlan::star(),
        }
    }
}

/// Full configuration for the `gimbal_sweep` entry point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub plan: PlanKind,
    #[serde(flatten)]
    pub session: SessionConfig,
}

impl RunConfig {
    /// Load from a JSON file. Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.session.pause()?;
        Ok(config)
    }
}
