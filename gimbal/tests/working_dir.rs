//! Sessions without an output directory write into the working directory.
//!
//! Kept in its own test binary because it changes the process working directory.

use std::path::Path;

use gimbal::{CaptureConfig, CapturePlan, GimbalSession, SessionConfig, SimulatedGimbal};

#[test]
fn test_unset_output_dir_writes_sidecar_to_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let config = SessionConfig {
        output_dir: None,
        pause_time_s: 0.0,
        ..SessionConfig::default()
    };
    let gimbal = SimulatedGimbal::default();
    let mut session = GimbalSession::new(gimbal.clone(), config);

    let summary = session
        .run(Some(&CapturePlan::new(vec![0.0], vec![-5.0, 5.0])))
        .unwrap()
        .unwrap();

    assert_eq!(summary.sidecar_path, Path::new("config.slconf"));
    assert_eq!(summary.images_captured, 0);
    assert!(dir.path().join("config.slconf").is_file());

    let sidecar = CaptureConfig::read_from(&dir.path().join("config.slconf")).unwrap();
    assert_eq!(sidecar.captures.len(), 2);
    assert_eq!(sidecar.captures[0].image_paths, Path::new("cap00001.png"));
    assert_eq!(sidecar.captures[1].image_paths, Path::new("cap00002.png"));
}
