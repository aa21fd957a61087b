use super::*;

#[test]
fn empty_document_yields_defaults() {
    let config = GestureConfig::from_toml_str("").unwrap();
    assert_eq!(config, GestureConfig::default());
    assert_eq!(config.assessment.delay_ms, 50);
    assert_eq!(config.assessment.drag_touch_threshold, 3);
    assert_eq!(config.hold.min_tap_length_ms, 50);
    assert_eq!(config.swipe.policy, SwipePolicy::Omnidirectional);
    assert!(config.rotation.annulus().is_none());
}

#[test]
fn shipped_config_parses() {
    let config = GestureConfig::from_toml_str(include_str!("../../config/gestures.toml")).unwrap();
    assert_eq!(config.swipe.policy, SwipePolicy::AwayFromCenter);
    assert_eq!(config.rotation.annulus(), Some((120.0, 240.0)));
    assert_eq!(config.hold.interval_ms, Some(100));
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = GestureConfig::from_toml_str(
        r#"
        [assessment]
        drag_touch_threshold = 4
        "#,
    )
    .unwrap();
    assert_eq!(config.assessment.drag_touch_threshold, 4);
    assert_eq!(config.assessment.delay_ms, 50);
    assert_eq!(config.swipe, SwipeConfig::default());
}

#[test]
fn unknown_keys_are_parse_errors() {
    let err = GestureConfig::from_toml_str("[swipe]\nstart = 3.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn half_configured_annulus_is_rejected() {
    let err = GestureConfig::from_toml_str("[rotation]\ninner_radius = 40.0\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "rotation.inner_radius",
            ..
        }
    ));
}

#[test]
fn inverted_annulus_is_rejected() {
    let err = GestureConfig::from_toml_str(
        "[rotation]\ninner_radius = 80.0\nouter_radius = 40.0\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "rotation.outer_radius",
            ..
        }
    ));
}

#[test]
fn degenerate_values_are_rejected() {
    let mut config = GestureConfig::default();
    config.assessment.drag_touch_threshold = 1;
    assert!(config.validate().is_err());

    let mut config = GestureConfig::default();
    config.hold.interval_ms = Some(0);
    assert!(config.validate().is_err());

    let mut config = GestureConfig::default();
    config.rotation.tolerance = 1.0;
    assert!(config.validate().is_err());

    let mut config = GestureConfig::default();
    config.assessment.delay_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn missing_file_reports_path() {
    let err = GestureConfig::load("/nonexistent/gestures.toml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("gestures.toml")),
        other => panic!("unexpected error: {other}"),
    }
}
