//! Capture configuration sidecar (`config.slconf`)
//!
//! One JSON object per run linking each captured image to the source geometry
//! it was taken at. The analysis stage reads this file alongside the images.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the sidecar inside the output directory.
pub const SIDECAR_FILE_NAME: &str = "config.slconf";

/// Format version meaning "unversioned".
pub const UNVERSIONED: i32 = -1;

/// Error reading or writing the sidecar file
#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid capture config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Metadata for one captured position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Path of the image captured at this position
    pub image_paths: PathBuf,
    /// Plan field angle (not offset by the reference)
    pub source_field_angle_deg: f64,
    /// Plan azimuth angle (not offset by the reference)
    pub source_azimuth_angle_deg: f64,
    pub source_comment: String,
}

/// Run-level capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub captures: Vec<CaptureRecord>,
    pub run_name: String,
    pub comment: String,
    #[serde(default = "unversioned")]
    pub version: i32,
}

fn unversioned() -> i32 {
    UNVERSIONED
}

impl CaptureConfig {
    /// Empty, unversioned configuration for a new run.
    pub fn new(run_name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            captures: Vec::new(),
            run_name: run_name.into(),
            comment: comment.into(),
            version: UNVERSIONED,
        }
    }

    /// Append the record for the next position.
    pub fn push(&mut self, record: CaptureRecord) {
        self.captures.push(record);
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Serialize to `path` as JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), SidecarError> {
        let io_err = |source: std::io::Error| SidecarError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| SidecarError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// Parse a sidecar previously written with [`write_to`](Self::write_to).
    pub fn read_from(path: &Path) -> Result<Self, SidecarError> {
        let file = File::open(path).map_err(|source| SidecarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SidecarError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
