//! Capture plans for the motorized gimbal
//!
//! A plan is the Cartesian product of a list of azimuth angles and a list of
//! field angles, visited azimuth-major (outer) then field-minor (inner).

use serde::{Deserialize, Serialize};

/// First field angle of the sample sweeps, in degrees.
const SWEEP_START_DEG: i32 = -45;

/// Last field angle of the sample sweeps, in degrees (inclusive).
const SWEEP_END_DEG: i32 = 45;

/// Field angle increment of the sample sweeps, in degrees.
const SWEEP_STEP_DEG: usize = 5;

/// Grid of gimbal positions to visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePlan {
    /// Azimuth (roll) angles in degrees, outer loop
    pub azimuth_angles: Vec<f64>,
    /// Field (yaw) angles in degrees, inner loop
    pub field_angles: Vec<f64>,
}

/// An (azimuth, field angle) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub azimuth_deg: f64,
    pub field_deg: f64,
}

impl Position {
    pub fn new(azimuth_deg: f64, field_deg: f64) -> Self {
        Self {
            azimuth_deg,
            field_deg,
        }
    }

    /// Commanded position for this source position relative to `reference`.
    ///
    /// `commanded = source - reference` on both axes.
    pub fn offset_from(&self, reference: Position) -> Position {
        Position {
            azimuth_deg: self.azimuth_deg - reference.azimuth_deg,
            field_deg: self.field_deg - reference.field_deg,
        }
    }
}

/// One cell of a capture plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedPosition {
    /// 1-based position index, used for image file names
    pub index: usize,
    /// Un-offset plan angles
    pub source: Position,
}

impl CapturePlan {
    pub fn new(azimuth_angles: Vec<f64>, field_angles: Vec<f64>) -> Self {
        Self {
            azimuth_angles,
            field_angles,
        }
    }

    /// Simple horizontal sweep: azimuth 0, field angles -45..=45 in 5 degree steps.
    pub fn horizontal_sweep() -> Self {
        Self::new(vec![0.0], sample_field_angles())
    }

    /// Star pattern: horizontal, diagonal and vertical camera orientations
    /// (azimuth 0, 45, 90) each swept over the same field angles.
    pub fn star() -> Self {
        Self::new(vec![0.0, 45.0, 90.0], sample_field_angles())
    }

    /// Total number of positions (m x n).
    pub fn position_count(&self) -> usize {
        self.azimuth_angles.len() * self.field_angles.len()
    }

    /// Iterate the grid azimuth-major with 1-based indices.
    pub fn positions(&self) -> impl Iterator<Item = PlannedPosition> + '_ {
        self.azimuth_angles
            .iter()
            .flat_map(move |&az| self.field_angles.iter().map(move |&fa| (az, fa)))
            .enumerate()
            .map(|(i, (az, fa))| PlannedPosition {
                index: i + 1,
                source: Position::new(az, fa),
            })
    }
}

fn sample_field_angles() -> Vec<f64> {
    (SWEEP_START_DEG..=SWEEP_END_DEG)
        .step_by(SWEEP_STEP_DEG)
        .map(f64::from)
        .collect()
}

/// Image file name for a 1-based position index, e.g. `cap00001.png`.
pub fn image_file_name(index: usize, extension: &str) -> String {
    format!("cap{index:05}.{extension}")
}
