#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Defaults / persistence
// =============================================================

#[test]
fn defaults_match_documented_values() {
    let s = MinimapSettings::default();
    assert_eq!(s.width, 400.0);
    assert_eq!(s.height, 300.0);
    assert_eq!(s.margin, 100.0);
    assert_eq!(s.font_size, 10.0);
    assert_eq!(s.side, Corner::BottomRight);
    assert!(s.enabled);
    assert!(s.draw_active_viewport);
    assert_eq!(s.primary_navigation_strategy, NavigationStrategy::Pan);
    assert_eq!(s.secondary_navigation_strategy, NavigationStrategy::Zoom);
    assert_eq!(s.position_x, None);
}

#[test]
fn persisted_keys_are_camel_case() {
    let json = MinimapSettings::default().to_json().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    for key in [
        "width",
        "height",
        "margin",
        "fontSize",
        "fontColor",
        "backgroundColor",
        "groupColor",
        "nodeColor",
        "side",
        "enabled",
        "drawActiveViewport",
        "primaryNavigationStrategy",
        "secondaryNavigationStrategy",
        "minimapOpacity",
        "positionX",
        "positionY",
    ] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(value["side"], "bottom-right");
    assert_eq!(value["primaryNavigationStrategy"], "PAN");
}

#[test]
fn missing_keys_take_defaults_and_unknown_keys_are_ignored() {
    let s = MinimapSettings::from_json(r#"{"width": 250, "legacyFlag": true}"#).expect("parse");
    assert_eq!(s.width, 250.0);
    assert_eq!(s.height, 300.0);
    assert_eq!(s.node_color, "#c3d6d7");
}

#[test]
fn from_json_reads_every_enum() {
    let s = MinimapSettings::from_json(
        r#"{"side": "top-left", "primaryNavigationStrategy": "ZOOM", "secondaryNavigationStrategy": "NONE",
            "positionX": 12.5, "positionY": null}"#,
    )
    .expect("parse");
    assert_eq!(s.side, Corner::TopLeft);
    assert_eq!(s.primary_navigation_strategy, NavigationStrategy::Zoom);
    assert_eq!(s.secondary_navigation_strategy, NavigationStrategy::None);
    assert_eq!(s.position_x, Some(12.5));
    assert_eq!(s.position_y, None);
}

#[test]
fn from_json_rejects_malformed_input() {
    let err = MinimapSettings::from_json("{not json").expect_err("must fail");
    assert!(matches!(err, ConfigError::Json(_)));
    let err = MinimapSettings::from_json(r#"{"side": "middle"}"#).expect_err("must fail");
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn json_round_trip_preserves_settings() {
    let mut s = MinimapSettings::default();
    s.position_x = Some(40.0);
    s.group_color = "#ff000033".into();
    let back = MinimapSettings::from_json(&s.to_json().expect("serialize")).expect("parse");
    assert_eq!(back, s);
}

// =============================================================
// Normalization
// =============================================================

#[test]
fn opacity_is_clamped() {
    let s = MinimapSettings::from_json(r#"{"minimapOpacity": 0.01}"#).expect("parse");
    assert_eq!(s.minimap_opacity, 0.1);
    let s = MinimapSettings::from_json(r#"{"minimapOpacity": 3}"#).expect("parse");
    assert_eq!(s.minimap_opacity, 1.0);
}

#[test]
fn sizes_and_margin_are_clamped() {
    let s = MinimapSettings { width: 5.0, height: -1.0, margin: -20.0, font_size: 0.0, ..Default::default() }
        .normalized();
    assert_eq!(s.width, 100.0);
    assert_eq!(s.height, 75.0);
    assert_eq!(s.margin, 0.0);
    assert_eq!(s.font_size, 10.0);
}

#[test]
fn non_finite_values_fall_back() {
    let s = MinimapSettings { width: f64::NAN, position_x: Some(f64::INFINITY), ..Default::default() }.normalized();
    assert_eq!(s.width, 400.0);
    assert_eq!(s.position_x, None);
}

// =============================================================
// Strategy selection
// =============================================================

#[test]
fn strategy_uses_secondary_only_with_modifier() {
    let s = MinimapSettings {
        primary_navigation_strategy: NavigationStrategy::Zoom,
        secondary_navigation_strategy: NavigationStrategy::Pan,
        ..Default::default()
    };
    assert_eq!(s.strategy(false), NavigationStrategy::Zoom);
    assert_eq!(s.strategy(true), NavigationStrategy::Pan);
}

#[test]
fn strategy_parse_is_case_insensitive() {
    assert_eq!("pan".parse::<NavigationStrategy>().expect("pan"), NavigationStrategy::Pan);
    assert_eq!(" Zoom ".parse::<NavigationStrategy>().expect("zoom"), NavigationStrategy::Zoom);
    assert!("fly".parse::<NavigationStrategy>().is_err());
}

// =============================================================
// set_option
// =============================================================

#[test]
fn set_option_parses_each_type() {
    let mut s = MinimapSettings::default();
    s.set_option("width", "320").expect("width");
    s.set_option("fontColor", " #000 ").expect("color");
    s.set_option("side", "top-right").expect("side");
    s.set_option("enabled", "false").expect("enabled");
    s.set_option("secondaryNavigationStrategy", "none").expect("strategy");
    s.set_option("positionX", "55").expect("position");

    assert_eq!(s.width, 320.0);
    assert_eq!(s.font_color, "#000");
    assert_eq!(s.side, Corner::TopRight);
    assert!(!s.enabled);
    assert_eq!(s.secondary_navigation_strategy, NavigationStrategy::None);
    assert_eq!(s.position_x, Some(55.0));
}

#[test]
fn set_option_empty_position_clears_it() {
    let mut s = MinimapSettings { position_y: Some(9.0), ..Default::default() };
    s.set_option("positionY", "").expect("clear");
    assert_eq!(s.position_y, None);
}

#[test]
fn set_option_clamps_after_write() {
    let mut s = MinimapSettings::default();
    s.set_option("minimapOpacity", "0").expect("opacity");
    assert_eq!(s.minimap_opacity, 0.1);
}

#[test]
fn set_option_rejects_unknown_key() {
    let mut s = MinimapSettings::default();
    let err = s.set_option("zoomSpeed", "2").expect_err("unknown");
    assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "zoomSpeed"));
}

#[test]
fn set_option_rejects_bad_values_without_changing_settings() {
    let mut s = MinimapSettings::default();
    let before = s.clone();
    assert!(matches!(s.set_option("width", "wide"), Err(ConfigError::InvalidValue { .. })));
    assert!(matches!(s.set_option("enabled", "maybe"), Err(ConfigError::InvalidValue { .. })));
    assert!(matches!(s.set_option("nodeColor", "  "), Err(ConfigError::InvalidValue { .. })));
    assert!(matches!(s.set_option("side", "center"), Err(ConfigError::InvalidValue { .. })));
    assert!(matches!(s.set_option("primaryNavigationStrategy", "fly"), Err(ConfigError::InvalidValue { .. })));
    assert_eq!(s, before);
}

// =============================================================
// Placement
// =============================================================

#[test]
fn corner_presets_are_inset() {
    let mut s = MinimapSettings { width: 200.0, height: 100.0, ..Default::default() };
    s.side = Corner::TopLeft;
    let p = s.placement(1000.0, 800.0);
    assert_eq!((p.left, p.top), (16.0, 16.0));

    s.side = Corner::TopRight;
    let p = s.placement(1000.0, 800.0);
    assert_eq!((p.left, p.top), (784.0, 16.0));

    s.side = Corner::BottomLeft;
    let p = s.placement(1000.0, 800.0);
    assert_eq!((p.left, p.top), (16.0, 684.0));

    s.side = Corner::BottomRight;
    let p = s.placement(1000.0, 800.0);
    assert_eq!((p.left, p.top), (784.0, 684.0));
    assert_eq!((p.width, p.height), (200.0, 100.0));
}

#[test]
fn explicit_position_overrides_corner() {
    let s = MinimapSettings { position_x: Some(5.0), position_y: Some(7.0), ..Default::default() };
    let p = s.placement(1000.0, 800.0);
    assert_eq!((p.left, p.top), (5.0, 7.0));
    assert_eq!(p.opacity, s.minimap_opacity);
}

#[test]
fn corner_display_round_trips() {
    for c in [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight] {
        assert_eq!(c.to_string().parse::<Corner>().expect("corner"), c);
    }
}
