use super::*;
use crate::constants::test_constants::*;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn create_test_config() -> Config {
    Config {
        latitude: TEST_LATITUDE,
        longitude: TEST_LONGITUDE,
        transition_speed: Some(TEST_TRANSITION_SPEED.to_string()),
        ping_target: TEST_PING_TARGET.to_string(),
        backend: None,
        sysfs_leds: None,
        ping_interval: None,
        ping_timeout: None,
        pause_fade: None,
    }
}

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("duskglow.toml");
    fs::write(&path, content).unwrap();
    path
}

const MINIMAL_CONFIG: &str = r#"
latitude = 52.3676
longitude = 4.9041
transition_speed = "60m"
ping_target = "192.168.1.20"
"#;

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&create_test_config()).is_ok());
}

#[test]
fn test_defaults_for_optional_fields() {
    let config = create_test_config();
    assert_eq!(config.backend(), Backend::Auto);
    assert_eq!(config.ping_interval().as_secs(), DEFAULT_PING_INTERVAL);
    assert_eq!(config.ping_timeout().as_secs(), DEFAULT_PING_TIMEOUT);
    assert_eq!(config.pause_fade().unwrap().as_secs(), 3);
    assert_eq!(config.transition_period().unwrap().as_secs(), 3600);
}

#[test]
fn test_coordinate_ranges() {
    let mut config = create_test_config();
    config.latitude = 90.5;
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.longitude = -180.1;
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.latitude = -90.0;
    config.longitude = 180.0;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_transition_speed_errors() {
    let mut config = create_test_config();
    config.transition_speed = None;
    let err = validate_config(&config).unwrap_err();
    assert!(format!("{err:#}").contains("no transition time given"));

    config.transition_speed = Some("2d".to_string());
    assert!(validate_config(&config).is_err());

    config.transition_speed = Some("0m".to_string());
    assert!(validate_config(&config).is_err());

    config.transition_speed = Some("45".to_string());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_empty_ping_target() {
    let mut config = create_test_config();
    config.ping_target = "   ".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_ping_settings_ranges() {
    let mut config = create_test_config();
    config.ping_interval = Some(MINIMUM_PING_INTERVAL - 1);
    assert!(validate_config(&config).is_err());

    config.ping_interval = Some(MAXIMUM_PING_INTERVAL + 1);
    assert!(validate_config(&config).is_err());

    config.ping_interval = Some(30);
    config.ping_timeout = Some(MAXIMUM_PING_TIMEOUT + 1);
    assert!(validate_config(&config).is_err());

    config.ping_timeout = Some(0);
    assert!(validate_config(&config).is_err());

    config.ping_interval = Some(10);
    config.ping_timeout = Some(10);
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("shorter than ping_interval"));

    config.ping_timeout = Some(5);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_pause_fade_range() {
    let mut config = create_test_config();
    config.pause_fade = Some("2m".to_string());
    assert!(validate_config(&config).is_err());

    config.pause_fade = Some("0s".to_string());
    assert!(validate_config(&config).is_err());

    config.pause_fade = Some("10s".to_string());
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_sysfs_backend_requires_leds() {
    let mut config = create_test_config();
    config.backend = Some(Backend::Sysfs);
    assert!(validate_config(&config).is_err());

    config.sysfs_leds = Some(vec![]);
    assert!(validate_config(&config).is_err());

    config.sysfs_leds = Some(vec!["led0".to_string()]);
    assert!(validate_config(&config).is_ok());

    config.sysfs_leds = Some(vec!["../../etc".to_string()]);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_load_minimal_config() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), MINIMAL_CONFIG);

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.ping_target, "192.168.1.20");
    assert_eq!(config.transition_period().unwrap().as_secs(), 3600);
    assert_eq!(config.backend, None);
}

#[test]
fn test_load_full_config() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        r#"
latitude = -33.8688
longitude = 151.2093
transition_speed = "90s"
ping_target = "media-box.local"
backend = "sysfs"
sysfs_leds = ["pwr", "act"]
ping_interval = 30
ping_timeout = 5
pause_fade = "5s"
"#,
    );

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.backend(), Backend::Sysfs);
    assert_eq!(
        config.sysfs_leds,
        Some(vec!["pwr".to_string(), "act".to_string()])
    );
    assert_eq!(config.ping_interval().as_secs(), 30);
    assert_eq!(config.ping_timeout().as_secs(), 5);
    assert_eq!(config.pause_fade().unwrap().as_secs(), 5);
    assert_eq!(config.transition_period().unwrap().as_secs(), 90);
}

#[test]
fn test_load_rejects_unknown_fields() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        &format!("{MINIMAL_CONFIG}night_temp = 3300\n"),
    );
    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_load_rejects_missing_required_field() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        "latitude = 52.0\nlongitude = 4.0\ntransition_speed = \"60m\"\n",
    );
    let err = load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_load_reports_validation_errors() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        &MINIMAL_CONFIG.replace("\"60m\"", "\"60x\""),
    );
    let err = load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid configuration"));
}

#[test]
fn test_load_missing_explicit_path() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("missing.toml");
    let err = load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
#[serial]
fn test_xdg_config_home_is_searched() {
    if Path::new(SYSTEM_CONFIG_PATH).exists() {
        // The system-wide file takes precedence on this machine
        return;
    }

    let temp_dir = tempdir().unwrap();
    let config_dir = temp_dir.path().join(CONFIG_DIR_NAME);
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join(CONFIG_FILE_NAME), MINIMAL_CONFIG).unwrap();

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let found = find_config_path(None);
    let result = load(None);

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    assert_eq!(found.unwrap(), config_dir.join(CONFIG_FILE_NAME));
    assert_eq!(result.unwrap().ping_target, "192.168.1.20");
}

#[test]
#[serial]
fn test_no_config_found() {
    if Path::new(SYSTEM_CONFIG_PATH).exists() {
        return;
    }

    let temp_dir = tempdir().unwrap();
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = find_config_path(None);

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("No configuration file found"));
}
