//! Configuration loading and validation tests

use cone_steering::{
    config::{Config, EXAMPLE_CONFIG},
    region::RegionOfInterest,
    steering::DualDetectionPolicy,
    Error, Result,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cone-steering-{}-{}", std::process::id(), name))
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let path = temp_path("round-trip.yaml");
    let mut config = Config::default();
    config.calibration.sample_size = 12;
    config.steering.dual_detection = DualDetectionPolicy::Average;
    config.regions.center = RegionOfInterest::new(100, 300, 440, 120);

    config.to_file(&path)?;
    let loaded = Config::from_file(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_example_config_loads() -> Result<()> {
    let path = temp_path("example.yaml");
    std::fs::write(&path, EXAMPLE_CONFIG)?;
    let loaded = Config::from_file(&path)?;
    std::fs::remove_file(&path)?;

    loaded.validate()?;
    assert_eq!(loaded, Config::default());
    Ok(())
}

#[test]
fn test_missing_file() {
    let result = Config::from_file(temp_path("does-not-exist.yaml"));
    assert!(matches!(result, Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn test_partial_section() -> Result<()> {
    let config = Config::from_yaml("steering:\n  step: 0.05\ndisplay:\n  verbose: true\n")?;
    assert!((config.steering.step - 0.05).abs() < f64::EPSILON);
    assert!((config.steering.max - 0.3).abs() < f64::EPSILON);
    assert!(config.display.verbose);
    assert!(config.display.enabled);
    config.validate()
}

#[test]
fn test_dual_detection_names() -> Result<()> {
    let config = Config::from_yaml("steering:\n  dual_detection: average\n")?;
    assert_eq!(config.steering.dual_detection, DualDetectionPolicy::Average);

    assert!(Config::from_yaml("steering:\n  dual_detection: both\n").is_err());
    Ok(())
}

#[test]
fn test_invalid_configurations() {
    let mutations: Vec<(&str, Box<dyn Fn(&mut Config)>)> = vec![
        ("zero width", Box::new(|c: &mut Config| c.frame.width = 0)),
        ("side outside frame", Box::new(|c: &mut Config| c.regions.side = RegionOfInterest::new(500, 255, 230, 100))),
        ("empty center", Box::new(|c: &mut Config| c.regions.center.height = 0)),
        ("inverted hue", Box::new(|c: &mut Config| {
            c.colors.blue.hue_min = 150;
            c.colors.blue.hue_max = 40;
        })),
        ("hue beyond 180", Box::new(|c: &mut Config| c.colors.yellow.hue_max = 200)),
        ("negative area", Box::new(|c: &mut Config| c.detection.min_blob_area = -1.0)),
        ("even blur", Box::new(|c: &mut Config| c.detection.blur_kernel_size = 4)),
        ("zero element", Box::new(|c: &mut Config| c.detection.structuring_element_size = 0)),
        ("zero sample size", Box::new(|c: &mut Config| c.calibration.sample_size = 0)),
        ("negative step", Box::new(|c: &mut Config| c.steering.step = -0.025)),
        ("bounds exclude zero", Box::new(|c: &mut Config| c.steering.min = 0.1)),
    ];

    for (name, mutate) in mutations {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(
            matches!(config.validate(), Err(Error::ConfigError(_))),
            "{name} should be rejected"
        );
    }
}

#[test]
fn test_frame_size_change_revalidates_regions() {
    let mut config = Config::default();
    config.frame.width = 320;
    config.frame.height = 240;
    assert!(config.validate().is_err());

    config.regions.side = RegionOfInterest::new(200, 120, 120, 60);
    config.regions.center = RegionOfInterest::new(80, 120, 160, 60);
    assert!(config.validate().is_ok());
}
