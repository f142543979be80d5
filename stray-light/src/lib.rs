//! Stray Light Analysis Invocation
//!
//! Hands a captured gimbal run (its `config.slconf`) and an analysis settings
//! INI file to an external batch analysis engine, and maps the outcome to a
//! process exit code.
//!
//! # Modules
//!
//! - [`engine`] - The analysis engine capability trait and its error categories
//! - [`invoker`] - Input validation, engine session scoping and exit codes
//!
//! # Example
//!
//! The report's exit code is meant to become the process exit code:
//!
//! ```no_run
//! use stray_light::{run_analysis, AnalysisEngine, AnalysisError, AnalysisRequest};
//!
//! struct VendorEngine;
//!
//! impl AnalysisEngine for VendorEngine {
//!     fn initialize(&mut self) -> Result<(), AnalysisError> {
//!         Ok(())
//!     }
//!
//!     fn stray_light_batch(
//!         &mut self,
//!         _ini_path: &str,
//!         _config_path: &str,
//!     ) -> Result<String, AnalysisError> {
//!         Ok("{}".to_string())
//!     }
//!
//!     fn terminate(&mut self) {}
//! }
//!
//! let request = AnalysisRequest::new("/data/flare/run1/config.slconf", "stray-light.ini");
//! let report = run_analysis(&mut VendorEngine, &request);
//! std::process::exit(report.exit_code);
//! ```

pub mod engine;
pub mod invoker;

pub use engine::{AnalysisEngine, AnalysisError, EngineSession, ErrorCategory};
pub use invoker::{
    engine_path, run_analysis, AnalysisReport, AnalysisRequest, EXIT_FAILURE, EXIT_SUCCESS,
};
