//! Batch analysis invocation
//!
//! Validates the two input files, runs exactly one batch analysis inside an
//! [`EngineSession`], and turns the outcome into an exit code:
//!
//! - `0` on success
//! - `1` for a missing input file or an unclassified error
//! - the engine's error id for categorized license and engine errors

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::{AnalysisEngine, AnalysisError, EngineSession, ErrorCategory};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Inputs for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// `config.slconf` written by the gimbal session
    pub config_path: PathBuf,
    /// INI file holding the stray light analysis settings
    pub ini_path: PathBuf,
}

impl AnalysisRequest {
    pub fn new(config_path: impl Into<PathBuf>, ini_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            ini_path: ini_path.into(),
        }
    }
}

/// Result of [`run_analysis`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Process exit code for this outcome
    pub exit_code: i32,
    /// JSON manifest of generated outputs, on success
    pub manifest: Option<String>,
    /// Console diagnostic, on failure
    pub diagnostic: Option<String>,
}

impl AnalysisReport {
    fn success(manifest: String) -> Self {
        Self {
            exit_code: EXIT_SUCCESS,
            manifest: Some(manifest),
            diagnostic: None,
        }
    }

    fn failure(exit_code: i32, diagnostic: String) -> Self {
        Self {
            exit_code,
            manifest: None,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_SUCCESS
    }
}

/// Absolute form of `path` with forward slashes, as the engine expects.
///
/// Fails with [`io::ErrorKind::InvalidData`] if the path is not valid UTF-8.
pub fn engine_path(path: &Path) -> io::Result<String> {
    let absolute = std::path::absolute(path)?;
    let utf8 = absolute.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", absolute.display()),
        )
    })?;
    Ok(utf8.replace('\\', "/"))
}

/// Run one batch analysis. The engine is not touched if an input is missing.
pub fn run_analysis<E: AnalysisEngine>(
    engine: &mut E,
    request: &AnalysisRequest,
) -> AnalysisReport {
    if !request.config_path.is_file() {
        return missing_input("config", &request.config_path);
    }
    if !request.ini_path.is_file() {
        return missing_input("analysis INI", &request.ini_path);
    }

    let (config_path, ini_path) =
        match (engine_path(&request.config_path), engine_path(&request.ini_path)) {
            (Ok(config), Ok(ini)) => (config, ini),
            (Err(e), _) | (_, Err(e)) => {
                let diagnostic = format!("Failed to resolve input paths: {e}");
                eprintln!("{diagnostic}");
                return AnalysisReport::failure(EXIT_FAILURE, diagnostic);
            }
        };

    debug!("Running stray light batch: ini={ini_path} config={config_path}");
    let result = EngineSession::open(engine)
        .and_then(|mut session| session.stray_light_batch(&ini_path, &config_path));

    match result {
        Ok(manifest) => {
            info!("Stray light analysis complete");
            println!("{manifest}");
            AnalysisReport::success(manifest)
        }
        Err(err) => {
            let diagnostic = diagnostic(&err);
            let exit_code = exit_code(&err);
            warn!("Stray light analysis failed with exit code {exit_code}: {err}");
            eprintln!("{diagnostic}");
            AnalysisReport::failure(exit_code, diagnostic)
        }
    }
}

fn missing_input(kind: &str, path: &Path) -> AnalysisReport {
    let diagnostic = format!("Input {kind} file does not exist: {}", path.display());
    eprintln!("{diagnostic}");
    AnalysisReport::failure(EXIT_FAILURE, diagnostic)
}

fn diagnostic(err: &AnalysisError) -> String {
    match err {
        AnalysisError::Engine {
            category: ErrorCategory::FloatingLicense,
            ..
        } => "All floating license seats are in use. \
              Exit the analysis application on another computer and try again."
            .to_string(),
        AnalysisError::Engine {
            category: ErrorCategory::License,
            message,
            ..
        } => format!("License Exception: {message}"),
        AnalysisError::Engine { message, .. } => message.clone(),
        AnalysisError::Unclassified(message) => message.clone(),
    }
}

fn exit_code(err: &AnalysisError) -> i32 {
    match err {
        AnalysisError::Engine { error_id, .. } if *error_id > 0 => *error_id,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockEngine {
        init_calls: usize,
        batch_calls: usize,
        terminate_calls: usize,
        init_error: Option<AnalysisError>,
        batch_error: Option<AnalysisError>,
        last_paths: Option<(String, String)>,
    }

    impl AnalysisEngine for MockEngine {
        fn initialize(&mut self) -> Result<(), AnalysisError> {
            self.init_calls += 1;
            match self.init_error.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn stray_light_batch(
            &mut self,
            ini_path: &str,
            config_path: &str,
        ) -> Result<String, AnalysisError> {
            self.batch_calls += 1;
            self.last_paths = Some((ini_path.to_string(), config_path.to_string()));
            match self.batch_error.take() {
                Some(err) => Err(err),
                None => Ok(r#"{"outputs": ["flare_summary.csv"]}"#.to_string()),
            }
        }

        fn terminate(&mut self) {
            self.terminate_calls += 1;
        }
    }

    fn inputs() -> (TempDir, AnalysisRequest) {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.slconf");
        let ini = dir.path().join("stray-light.ini");
        fs::write(&config, "{}").unwrap();
        fs::write(&ini, "[straylight]\n").unwrap();
        (dir, AnalysisRequest::new(config, ini))
    }

    fn engine_error(category: ErrorCategory, error_id: i32, message: &str) -> AnalysisError {
        AnalysisError::Engine {
            category,
            error_id,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_missing_config_file() {
        let (dir, mut request) = inputs();
        request.config_path = dir.path().join("missing.slconf");
        let mut engine = MockEngine::default();

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 1);
        assert!(report.diagnostic.unwrap().contains("config file does not exist"));
        assert_eq!(engine.init_calls, 0);
        assert_eq!(engine.batch_calls, 0);
        assert_eq!(engine.terminate_calls, 0);
    }

    #[test]
    fn test_missing_ini_file() {
        let (dir, mut request) = inputs();
        request.ini_path = dir.path().join("missing.ini");
        let mut engine = MockEngine::default();

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 1);
        assert_eq!(engine.init_calls, 0);
    }

    #[test]
    fn test_success_brackets_one_batch_call() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine::default();

        let report = run_analysis(&mut engine, &request);
        assert!(report.is_success());
        assert_eq!(
            report.manifest.as_deref(),
            Some(r#"{"outputs": ["flare_summary.csv"]}"#)
        );
        assert_eq!(
            (engine.init_calls, engine.batch_calls, engine.terminate_calls),
            (1, 1, 1)
        );
    }

    #[test]
    fn test_engine_receives_absolute_forward_slash_paths() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine::default();

        run_analysis(&mut engine, &request);
        let (ini, config) = engine.last_paths.unwrap();
        assert!(!ini.contains('\\'));
        assert!(!config.contains('\\'));
        assert!(Path::new(&config).is_absolute());
        assert!(config.ends_with("/config.slconf"));
        assert!(ini.ends_with("/stray-light.ini"));
    }

    #[test]
    fn test_floating_license_error() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine {
            batch_error: Some(engine_error(ErrorCategory::FloatingLicense, 7, "seats")),
            ..MockEngine::default()
        };

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 7);
        assert!(report
            .diagnostic
            .unwrap()
            .starts_with("All floating license seats are in use"));
        assert_eq!(engine.terminate_calls, 1);
    }

    #[test]
    fn test_license_error() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine {
            batch_error: Some(engine_error(ErrorCategory::License, 5, "license expired")),
            ..MockEngine::default()
        };

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 5);
        assert_eq!(
            report.diagnostic.as_deref(),
            Some("License Exception: license expired")
        );
        assert_eq!(engine.terminate_calls, 1);
    }

    #[test]
    fn test_other_engine_error() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine {
            batch_error: Some(engine_error(ErrorCategory::Other, 12, "bad ini section")),
            ..MockEngine::default()
        };

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 12);
        assert_eq!(report.diagnostic.as_deref(), Some("bad ini section"));
        assert_eq!(
            (engine.init_calls, engine.batch_calls, engine.terminate_calls),
            (1, 1, 1)
        );
    }

    #[test]
    fn test_unclassified_error_maps_to_one() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine {
            batch_error: Some(AnalysisError::Unclassified("library crashed".to_string())),
            ..MockEngine::default()
        };

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 1);
        assert_eq!(report.diagnostic.as_deref(), Some("library crashed"));
        assert_eq!(engine.terminate_calls, 1);
    }

    #[test]
    fn test_non_positive_error_id_maps_to_one() {
        let err = engine_error(ErrorCategory::Other, 0, "zero");
        assert_eq!(exit_code(&err), 1);
        let err = engine_error(ErrorCategory::Other, -3, "negative");
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_failed_initialize_is_not_terminated() {
        let (_dir, request) = inputs();
        let mut engine = MockEngine {
            init_error: Some(engine_error(ErrorCategory::FloatingLicense, 9, "seats")),
            ..MockEngine::default()
        };

        let report = run_analysis(&mut engine, &request);
        assert_eq!(report.exit_code, 9);
        assert_eq!(
            (engine.init_calls, engine.batch_calls, engine.terminate_calls),
            (1, 0, 0)
        );
    }

    #[test]
    fn test_engine_path_normalizes_relative() {
        let path = engine_path(Path::new("runs/config.slconf")).unwrap();
        assert!(Path::new(&path).is_absolute());
        assert!(path.ends_with("runs/config.slconf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_rejected_before_engine() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join(OsStr::from_bytes(b"run\xff"));
        fs::create_dir(&run_dir).unwrap();
        let config = run_dir.join("config.slconf");
        let ini = dir.path().join("stray-light.ini");
        fs::write(&config, "{}").unwrap();
        fs::write(&ini, "[straylight]\n").unwrap();

        let err = engine_path(&config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let mut engine = MockEngine::default();
        let report = run_analysis(&mut engine, &AnalysisRequest::new(config, ini));
        assert_eq!(report.exit_code, 1);
        assert!(report
            .diagnostic
            .unwrap()
            .starts_with("Failed to resolve input paths"));
        assert_eq!(
            (engine.init_calls, engine.batch_calls, engine.terminate_calls),
            (0, 0, 0)
        );
    }
}
