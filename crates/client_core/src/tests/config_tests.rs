use super::*;

use std::{collections::HashMap, io::Write};

#[test]
fn defaults_match_interaction_constants() {
    let settings = InteractionSettings::default();
    assert_eq!(settings.drag_activation_px, 5.0);
    assert_eq!(settings.max_swipe_offset, 130.0);
    assert_eq!(settings.reply_commit_offset, 80.0);
    assert_eq!(settings.saved_hint_idle_ms, 500);
    assert_eq!(settings.saved_hint_visible_ms, 900);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings("saved_hint_idle_ms = 250\nmax_swipe_offset = 100.0\n")
        .expect("parse");
    assert_eq!(settings.saved_hint_idle_ms, 250);
    assert_eq!(settings.max_swipe_offset, 100.0);
    assert_eq!(settings.saved_hint_visible_ms, 900);
}

#[test]
fn env_overrides_win_and_garbage_is_ignored() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("APP__SAVED_HINT_VISIBLE_MS", "1200"),
        ("APP__REPLY_COMMIT_OFFSET", "not-a-number"),
    ]);
    let mut settings = InteractionSettings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.saved_hint_visible_ms, 1200);
    assert_eq!(settings.reply_commit_offset, 80.0);
}

#[test]
fn loads_explicit_settings_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "drag_activation_px = 8.0").expect("write");

    let settings = load_settings(Some(file.path())).expect("load");
    assert_eq!(settings.drag_activation_px, 8.0);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_settings(Some(&dir.path().join("absent.toml"))).expect_err("missing");
    assert!(err.to_string().contains("failed to read settings file"));
}

#[test]
fn malformed_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "saved_hint_idle_ms = \"soon\"").expect("write");

    let err = load_settings(Some(file.path())).expect_err("malformed");
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn negative_max_offset_is_rejected() {
    let err = parse_settings("max_swipe_offset = -10.0\n").expect_err("negative max");
    assert!(err.to_string().contains("max_swipe_offset"));

    let settings = InteractionSettings {
        max_swipe_offset: f32::NAN,
        ..InteractionSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn commit_threshold_above_max_offset_is_rejected() {
    let err = parse_settings("max_swipe_offset = 60.0\nreply_commit_offset = 80.0\n")
        .expect_err("unreachable commit");
    assert!(err.to_string().contains("reply_commit_offset"));
}

#[test]
fn file_values_are_validated_on_load() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "drag_activation_px = 150.0").expect("write");

    let err = load_settings(Some(file.path())).expect_err("gate above max offset");
    assert!(format!("{err:#}").contains("drag_activation_px"));
}

#[test]
fn absurd_hint_delays_are_rejected() {
    let settings = InteractionSettings {
        saved_hint_idle_ms: u64::MAX,
        ..InteractionSettings::default()
    };
    assert!(settings.validate().is_err());
    assert!(InteractionSettings::default().validate().is_ok());
}
