//! Gimbal session controller
//!
//! Runs a capture plan on the motorized gimbal:
//!
//! 1. Open the motion connection (released when the session returns)
//! 2. Detect devices and select the azimuth and field angle axes
//! 3. Optionally home every detected device
//! 4. For each planned position, move both axes together, wait for both to
//!    settle, pause, capture an image and append a [`CaptureRecord`]
//! 5. Return both axes to the reference position, even if the sweep failed
//! 6. Write the `config.slconf` sidecar to the output directory

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::capture::{CaptureError, ImageCapture};
use crate::config::{ConfigError, SessionConfig};
use crate::motion::{
    AxisRef, Device, MotionConnection, MotionConnector, MotionError, MotionProfile, MotionResult,
};
use crate::plan::{image_file_name, CapturePlan, Position};
use crate::sidecar::{CaptureConfig, CaptureRecord, SidecarError, SIDECAR_FILE_NAME};

/// Axis number used on each single-axis gimbal device.
const GIMBAL_AXIS_NUMBER: u8 = 1;

/// Error during a gimbal session
#[derive(Error, Debug)]
pub enum GimbalError {
    /// Motion controller failure (connect, detect, home, move or wait)
    #[error("motion error: {0}")]
    Motion(#[from] MotionError),

    /// The bound image capture failed
    #[error("image capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Capture was requested (output directory exists) but nothing can take images
    #[error("output directory {0} exists but no image capture is bound")]
    CaptureNotBound(PathBuf),

    /// Invalid session configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output directory could not be created for the sidecar
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar could not be written
    #[error("failed to write capture config: {0}")]
    Sidecar(#[from] SidecarError),
}

/// Outcome of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Where the capture configuration was written
    pub sidecar_path: PathBuf,
    /// Number of plan positions visited (and recorded)
    pub positions_visited: usize,
    /// Number of capture calls made
    pub images_captured: usize,
}

/// The two gimbal axes selected for a session.
#[derive(Debug, Clone, Copy)]
struct GimbalAxes {
    azimuth: AxisRef,
    field: AxisRef,
}

/// Drives the gimbal through capture plans.
pub struct GimbalSession<C: MotionConnector> {
    connector: C,
    config: SessionConfig,
    capture: Option<Box<dyn ImageCapture>>,
}

impl<C: MotionConnector> GimbalSession<C> {
    /// Create a session with no image capture bound.
    pub fn new(connector: C, config: SessionConfig) -> Self {
        Self {
            connector,
            config,
            capture: None,
        }
    }

    /// Bind the image capture used when the output directory exists.
    pub fn with_capture(mut self, capture: impl ImageCapture + 'static) -> Self {
        self.capture = Some(Box::new(capture));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Run `plan`, returning `Ok(None)` without touching hardware if no plan is given.
    pub fn run(&mut self, plan: Option<&CapturePlan>) -> Result<Option<RunSummary>, GimbalError> {
        let Some(plan) = plan else {
            warn!("No capture plan specified, skipping gimbal session");
            return Ok(None);
        };

        let pause = self.config.pause()?;
        let output_dir = self.config.output_dir.clone().unwrap_or_default();
        let capture_enabled = output_dir.is_dir();

        if capture_enabled && self.capture.is_none() {
            return Err(GimbalError::CaptureNotBound(output_dir));
        }
        if !capture_enabled {
            warn!(
                "Output directory \"{}\" does not exist, image capture will be skipped",
                output_dir.display()
            );
        }

        let mut record = CaptureConfig::new(&self.config.run_name, &self.config.comment);
        let profile = self.config.motion_profile;
        let reference = Position::from(self.config.reference);

        let mut connection = self.connector.open(&self.config.port)?;

        let devices = connection.detect_devices()?;
        info!(
            "Found {} devices: {:?}",
            devices.len(),
            devices.iter().map(|d| d.address).collect::<Vec<_>>()
        );

        let axes = GimbalAxes {
            azimuth: select_axis(&devices, self.config.azimuth_device_index, "azimuth")?,
            field: select_axis(&devices, self.config.field_device_index, "field angle")?,
        };

        if self.config.home_before_run {
            for device in &devices {
                info!("Homing all axes of device with address {}", device.address);
                connection.home_all_axes(*device)?;
            }
        }

        let sweep = Sweep {
            plan,
            axes,
            reference,
            profile,
            pause,
            output_dir: &output_dir,
            extension: &self.config.image_extension,
        };
        let capture = if capture_enabled {
            self.capture.as_mut()
        } else {
            None
        };
        let swept = sweep.run(&mut connection, capture, &mut record);

        info!(
            "Returning to reference position (azimuth {}, field angle {})",
            reference.azimuth_deg, reference.field_deg
        );
        let parked = move_together(&mut connection, axes, reference, &profile);

        let images_captured = match (swept, parked) {
            (Ok(captured), Ok(())) => captured,
            (Ok(_), Err(park_err)) => return Err(park_err.into()),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(park_err)) => {
                warn!("Failed to return to reference after aborted sweep: {park_err}");
                return Err(err);
            }
        };
        info!("Captures complete");

        let sidecar_path = write_sidecar(&record, &output_dir)?;
        info!("Done");

        Ok(Some(RunSummary {
            sidecar_path,
            positions_visited: record.len(),
            images_captured,
        }))
    }
}

/// Per-run parameters for the position loop.
struct Sweep<'a> {
    plan: &'a CapturePlan,
    axes: GimbalAxes,
    reference: Position,
    profile: MotionProfile,
    pause: Duration,
    output_dir: &'a Path,
    extension: &'a str,
}

impl Sweep<'_> {
    /// Visit every planned position. Returns the number of images captured.
    fn run<M: MotionConnection>(
        &self,
        connection: &mut M,
        mut capture: Option<&mut Box<dyn ImageCapture>>,
        record: &mut CaptureConfig,
    ) -> Result<usize, GimbalError> {
        let total = self.plan.position_count();
        let mut captured = 0;

        for planned in self.plan.positions() {
            let commanded = planned.source.offset_from(self.reference);
            let image_path = self
                .output_dir
                .join(image_file_name(planned.index, self.extension));

            info!(
                "Moving to absolute position ({}/{}) with azimuth angle {} and field angle {} (degrees)...",
                planned.index, total, commanded.azimuth_deg, commanded.field_deg
            );
            move_together(connection, self.axes, commanded, &self.profile)?;
            info!("Movement complete");

            thread::sleep(self.pause);

            match capture.as_deref_mut() {
                Some(camera) => {
                    info!("Capturing image {}...", image_path.display());
                    camera.capture(&image_path)?;
                    captured += 1;
                    info!("Image capture complete");
                }
                None => info!("Capture skipped for {}", image_path.display()),
            }

            record.push(CaptureRecord {
                image_paths: image_path,
                source_field_angle_deg: planned.source.field_deg,
                source_azimuth_angle_deg: planned.source.azimuth_deg,
                source_comment: String::new(),
            });
        }

        Ok(captured)
    }
}

/// Pick the rotary axis of the device at `index` in the detected list.
fn select_axis(devices: &[Device], index: usize, role: &'static str) -> MotionResult<AxisRef> {
    devices
        .get(index)
        .map(|device| device.axis(GIMBAL_AXIS_NUMBER))
        .ok_or(MotionError::DeviceNotFound {
            role,
            index,
            detected: devices.len(),
        })
}

/// Issue both moves before waiting on either, so the axes travel together.
fn move_together<M: MotionConnection>(
    connection: &mut M,
    axes: GimbalAxes,
    target: Position,
    profile: &MotionProfile,
) -> MotionResult<()> {
    connection.move_absolute(axes.azimuth, target.azimuth_deg, profile)?;
    connection.move_absolute(axes.field, target.field_deg, profile)?;
    connection.wait_until_idle(axes.azimuth)?;
    connection.wait_until_idle(axes.field)
}

fn write_sidecar(record: &CaptureConfig, output_dir: &Path) -> Result<PathBuf, GimbalError> {
    if !output_dir.as_os_str().is_empty() && !output_dir.is_dir() {
        std::fs::create_dir_all(output_dir).map_err(|source| GimbalError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
    }

    let path = output_dir.join(SIDECAR_FILE_NAME);
    info!(
        "Writing configuration file {} ({} captures)",
        path.display(),
        record.len()
    );
    record.write_to(&path)?;
    Ok(path)
}
