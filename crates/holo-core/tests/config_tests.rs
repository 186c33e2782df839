use holo_core::config::HoloConfig;
use holo_core::input::InteractionKind;
use holo_core::mapping::{BandInput, CombineMode, PatternSource};
use holo_core::ConfigError;

const MINIMAL: &str = r##"{
    "parameters": {
        "geometry":        { "default": 0,   "min": 0, "max": 7 },
        "gridDensity":     { "default": 12,  "min": 5, "max": 25, "description": "grid" },
        "morphFactor":     { "default": 1,   "min": 0, "max": 2 },
        "rotationSpeed":   { "default": 0.5, "min": 0, "max": 3 },
        "glitchIntensity": { "default": 0.1, "min": 0, "max": 1 },
        "intensity":       { "default": 0.7, "min": 0, "max": 1.5 },
        "tension":         { "default": 0,   "min": 0, "max": 1 },
        "energy":          { "default": 0,   "min": 0, "max": 1 },
        "scrollOffset":    { "default": 0 }
    },
    "states": [
        { "name": "home", "geometry": 0, "gridDensity": 12, "morphFactor": 1,
          "rotationSpeed": 0.5, "glitchIntensity": 0.1,
          "colorScheme": { "primary": "#f0f", "secondary": "#00ffff", "accent": "#ff0" } },
        { "name": "tech", "geometry": 1, "gridDensity": 16, "morphFactor": 0.8,
          "rotationSpeed": 0.8, "glitchIntensity": 0.2,
          "colorScheme": { "primary": "#00ff88", "secondary": "#0088ff", "accent": "#ff0088" } }
    ],
    "initialState": "home",
    "mappings": [
        { "target": "gridDensity", "primary": "movement", "mode": "additive",
          "gain": 2.2, "patternGain": 3.0 }
    ],
    "blueprints": [
        { "event": "doubleClick", "target": "glitchIntensity", "delta": 0.5, "durationMs": 800 }
    ],
    "ecosystem": { "burstDurationMs": 1500 }
}"##;

fn minimal() -> HoloConfig {
    HoloConfig::from_json(MINIMAL).unwrap()
}

#[test]
fn parses_camel_case_json_with_defaults() {
    let config = minimal();
    assert_eq!(config.parameters.len(), 9);
    assert_eq!(config.parameters["scrollOffset"].min, None);
    assert_eq!(config.states[1].name, "tech");

    let m = &config.mappings[0];
    assert_eq!(m.primary, BandInput::Movement);
    assert_eq!(m.mode, CombineMode::Additive);
    assert_eq!(m.pattern_source, PatternSource::Intensity);
    assert_eq!(m.secondary, None);
    assert!(!m.inverse);

    assert_eq!(config.blueprints[0].event, InteractionKind::DoubleClick);
    assert_eq!(config.ecosystem.burst_duration_ms, 1500.0);
    // Untouched tuning keeps its defaults.
    assert_eq!(config.ecosystem.tick_ms, 50.0);
    assert_eq!(config.transition.phase_duration_ms, 400.0);
}

#[test]
fn builtin_config_round_trips_through_json() {
    let config = HoloConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(HoloConfig::from_json(&json).unwrap(), config);
}

#[test]
fn malformed_json_is_a_config_error() {
    assert!(matches!(HoloConfig::from_json("{"), Err(ConfigError::Json(_))));
}

#[test]
fn missing_required_parameter() {
    let mut config = minimal();
    config.parameters.remove("tension");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingParameter("tension"))
    ));
}

#[test]
fn default_outside_range() {
    let mut config = minimal();
    config.parameters.get_mut("intensity").unwrap().default = 2.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::DefaultOutOfRange { .. })
    ));
}

#[test]
fn inverted_range() {
    let mut config = minimal();
    let p = config.parameters.get_mut("gridDensity").unwrap();
    p.min = Some(30.0);
    assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));
}

#[test]
fn duplicate_and_unknown_states() {
    let mut config = minimal();
    let dup = config.states[0].clone();
    config.states.push(dup);
    assert!(matches!(config.validate(), Err(ConfigError::DuplicateState(s)) if s == "home"));

    let mut config = minimal();
    config.initial_state = "lobby".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::UnknownInitialState(_))));
}

#[test]
fn bad_state_color() {
    let mut config = minimal();
    config.states[0].color_scheme.accent = "yellow".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidColor { .. })));

    let mut config = minimal();
    config.states[0].color_scheme.accent = "#+f+f+f".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidColor { .. })));
}

#[test]
fn mapping_and_blueprint_targets_must_exist() {
    let mut config = minimal();
    config.mappings[0].target = "warp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::UnknownTarget { context: "mapping", .. })
    ));

    let mut config = minimal();
    config.blueprints[0].target = "warp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::UnknownTarget { context: "blueprint", .. })
    ));

    let mut config = minimal();
    let again = config.mappings[0].clone();
    config.mappings.push(again);
    assert!(matches!(config.validate(), Err(ConfigError::DuplicateMapping(_))));
}

#[test]
fn tuning_is_sanity_checked() {
    let mut config = minimal();
    config.input.smoothing_alpha = 0.0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTuning(_))));

    let mut config = minimal();
    config.ecosystem.attention_decay = 1.2;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidTuning(_))));
}
