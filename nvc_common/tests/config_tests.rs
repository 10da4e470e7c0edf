//! Configuration file round-trip tests.
//!
//! Covers loading a full file, the fallback-to-defaults path, the
//! short-axis-list padding, and offset persistence via `save_config`.

use nvc_common::config::{load_config, load_config_or_default, save_config, ControllerConfig};
use nvc_common::consts::NUM_AXES;
use std::fs;
use tempfile::TempDir;

fn full_config_toml() -> String {
    let mut content = String::from("simulation = false\n");
    for i in 0..NUM_AXES {
        content.push_str(&format!(
            r#"
[[axes]]
velocity_limit = {}
lower_position_limit = -2.5
upper_position_limit = 2.5
initial_position = 0.1
drive_offset = 0.0
"#,
            0.5 + i as f64 * 0.1
        ));
    }
    content
}

#[test]
fn load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("controller.toml");
    fs::write(&path, full_config_toml()).unwrap();

    let config = load_config(&path).unwrap();
    assert!(!config.simulation);
    assert_eq!(config.axes.len(), NUM_AXES);
    assert_eq!(config.axes[0].velocity_limit, 0.5);
    assert_eq!(config.axes[5].lower_position_limit, -2.5);
}

#[test]
fn load_pads_short_axis_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("controller.toml");
    fs::write(
        &path,
        r#"
simulation = true

[[axes]]
velocity_limit = 0.9
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.axes.len(), NUM_AXES);
    assert_eq!(config.axes[0].velocity_limit, 0.9);
    // Padded entries carry the built-in defaults.
    assert_eq!(
        config.axes[1].velocity_limit,
        nvc_common::consts::DEFAULT_VELOCITY_LIMIT
    );
}

#[test]
fn load_rejects_inverted_limits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("controller.toml");
    fs::write(
        &path,
        r#"
[[axes]]
lower_position_limit = 2.0
upper_position_limit = -2.0
"#,
    )
    .unwrap();

    assert!(load_config(&path).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does_not_exist.toml");

    let config = load_config_or_default(&path);
    assert!(config.simulation);
    assert_eq!(config.axes.len(), NUM_AXES);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("controller.toml");
    fs::write(&path, "simulation = \"not a bool").unwrap();

    let config = load_config_or_default(&path);
    assert!(config.simulation);
    assert_eq!(config.axes.len(), NUM_AXES);
}

#[test]
fn save_and_reload_persists_drive_offsets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("controller.toml");

    let mut config = ControllerConfig::default();
    config.simulation = false;
    config.axes[2].drive_offset = 0.125;
    config.axes[4].drive_offset = -0.03;
    save_config(&path, &config).unwrap();

    let reloaded = load_config(&path).unwrap();
    assert!(!reloaded.simulation);
    assert_eq!(reloaded.axes[2].drive_offset, 0.125);
    assert_eq!(reloaded.axes[4].drive_offset, -0.03);
    assert_eq!(reloaded.axes[0].drive_offset, 0.0);
}
