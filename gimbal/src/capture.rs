//! Image capture seam
//!
//! The session does not know how to trigger a camera. Integrators bind an
//! [`ImageCapture`] that produces and saves exactly one image at the given
//! path before returning. Closures of the form `FnMut(&Path) -> Result<(), CaptureError>`
//! implement the trait, which is usually the shortest way to wire a camera in.

use std::path::Path;

use thiserror::Error;

/// Error raised by an image capture implementation
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Camera trigger or readout failed
    #[error("capture failed: {0}")]
    Device(String),

    /// Image could not be written
    #[error("failed to save image: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces and persists one image per call.
pub trait ImageCapture {
    /// Capture an image and save it to `path`.
    ///
    /// The parent directory exists and the extension is already chosen.
    /// Must not return until the file is written.
    fn capture(&mut self, path: &Path) -> Result<(), CaptureError>;
}

impl<F> ImageCapture for F
where
    F: FnMut(&Path) -> Result<(), CaptureError>,
{
    fn capture(&mut self, path: &Path) -> Result<(), CaptureError> {
        self(path)
    }
}
