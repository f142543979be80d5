//! Analysis engine boundary
//!
//! The engine is a licensed vendor library. It must be initialized once per
//! process and terminated when finished; [`EngineSession`] ties both calls to
//! a scope.

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Class of an engine-reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Every floating license seat is in use
    FloatingLicense,
    /// License missing, expired or invalid
    License,
    /// Any other engine error
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorCategory::FloatingLicense => write!(f, "floating license"),
            ErrorCategory::License => write!(f, "license"),
            ErrorCategory::Other => write!(f, "engine"),
        }
    }
}

/// Error returned by an analysis engine
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Categorized error with the engine's numeric error id
    #[error("{category} error {error_id}: {message}")]
    Engine {
        category: ErrorCategory,
        error_id: i32,
        message: String,
    },

    /// Anything the engine could not categorize
    #[error("{0}")]
    Unclassified(String),
}

/// Batch stray light analysis engine.
pub trait AnalysisEngine {
    /// Load the library and acquire a license.
    fn initialize(&mut self) -> Result<(), AnalysisError>;

    /// Analyze the run described by `config_path` with the settings in `ini_path`.
    ///
    /// Paths are absolute with forward slashes. Returns the JSON manifest of
    /// the output files that were generated.
    fn stray_light_batch(
        &mut self,
        ini_path: &str,
        config_path: &str,
    ) -> Result<String, AnalysisError>;

    /// Release the library and its license.
    fn terminate(&mut self);
}

/// Initialized engine that terminates when dropped.
pub struct EngineSession<'a, E: AnalysisEngine> {
    engine: &'a mut E,
}

impl<'a, E: AnalysisEngine> EngineSession<'a, E> {
    /// Initialize `engine`. If initialization fails nothing is left to terminate.
    pub fn open(engine: &'a mut E) -> Result<Self, AnalysisError> {
        engine.initialize()?;
        debug!("Analysis engine initialized");
        Ok(Self { engine })
    }

    pub fn stray_light_batch(
        &mut self,
        ini_path: &str,
        config_path: &str,
    ) -> Result<String, AnalysisError> {
        self.engine.stray_light_batch(ini_path, config_path)
    }
}

impl<E: AnalysisEngine> Drop for EngineSession<'_, E> {
    fn drop(&mut self) {
        self.engine.terminate();
        debug!("Analysis engine terminated");
    }
}
