//! Configuration consumed at startup.
//!
//! The page hands the core a [`HoloConfig`] (built in, or parsed from JSON);
//! [`HoloConfig::validate`] is the only place the pipeline fails hard.

use crate::constants::*;
use crate::error::ConfigError;
use crate::input::InteractionKind;
use crate::mapping::{BandInput, CombineMode, PatternSource};
use crate::params::names;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub default: f32,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
    #[serde(default)]
    pub description: String,
}

impl ParameterDecl {
    pub fn ranged(default: f32, min: f32, max: f32, description: &str) -> Self {
        Self {
            default,
            min: Some(min),
            max: Some(max),
            description: description.to_string(),
        }
    }

    pub fn unranged(default: f32, description: &str) -> Self {
        Self {
            default,
            min: None,
            max: None,
            description: description.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

/// Per-state modifier bundle applied atomically when a transition shifts state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDecl {
    pub name: String,
    pub geometry: u32,
    pub grid_density: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
    pub glitch_intensity: f32,
    pub color_scheme: ColorScheme,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDecl {
    pub target: String,
    pub primary: BandInput,
    #[serde(default)]
    pub secondary: Option<BandInput>,
    #[serde(default)]
    pub secondary_weight: f32,
    pub mode: CombineMode,
    #[serde(default)]
    pub inverse: bool,
    pub gain: f32,
    #[serde(default)]
    pub pattern_source: PatternSource,
    #[serde(default)]
    pub pattern_gain: f32,
    #[serde(default)]
    pub pulse_threshold: Option<f32>,
}

/// Maps a discrete interaction to a short animated offset on one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintDecl {
    pub event: InteractionKind,
    pub target: String,
    pub delta: f32,
    pub duration_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputTuning {
    pub history_window_ms: f64,
    pub smoothing_alpha: f32,
    pub movement_window_ms: f64,
    pub velocity_window_ms: f64,
    pub precision_window_ms: f64,
    pub frequency_window_ms: f64,
    pub transient_gain: f32,
    pub rhythm_min_intervals: usize,
    pub rhythm_variance_scale: f64,
    pub rhythmic_threshold: f32,
    pub in_sync_tolerance: f64,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self {
            history_window_ms: HISTORY_WINDOW_MS,
            smoothing_alpha: SMOOTHING_ALPHA,
            movement_window_ms: MOVEMENT_WINDOW_MS,
            velocity_window_ms: VELOCITY_WINDOW_MS,
            precision_window_ms: PRECISION_WINDOW_MS,
            frequency_window_ms: FREQUENCY_WINDOW_MS,
            transient_gain: TRANSIENT_GAIN,
            rhythm_min_intervals: RHYTHM_MIN_INTERVALS,
            rhythm_variance_scale: RHYTHM_VARIANCE_SCALE,
            rhythmic_threshold: RHYTHMIC_THRESHOLD,
            in_sync_tolerance: IN_SYNC_TOLERANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EcosystemTuning {
    pub tick_ms: f64,
    /// `(distance_px, weight)` buckets, nearest first.
    pub proximity: [(f32, f32); 3],
    pub attention_decay: f32,
    pub awareness_decay: f32,
    pub activity_decay: f32,
    pub tension_decay: f32,
    pub attention_floor: f32,
    pub awareness_floor: f32,
    pub activity_floor: f32,
    pub click_amplification: f32,
    pub double_click_amplification: f32,
    pub burst_duration_ms: f64,
    pub burst_intensity: f32,
    pub tension_rise: f32,
    pub tension_release: f32,
}

impl Default for EcosystemTuning {
    fn default() -> Self {
        Self {
            tick_ms: ECOSYSTEM_TICK_MS,
            proximity: [
                (PROXIMITY_NEAR_PX, PROXIMITY_NEAR_WEIGHT),
                (PROXIMITY_MID_PX, PROXIMITY_MID_WEIGHT),
                (PROXIMITY_FAR_PX, PROXIMITY_FAR_WEIGHT),
            ],
            attention_decay: ATTENTION_DECAY,
            awareness_decay: AWARENESS_DECAY,
            activity_decay: ACTIVITY_DECAY,
            tension_decay: TENSION_DECAY,
            attention_floor: ATTENTION_FLOOR,
            awareness_floor: AWARENESS_FLOOR,
            activity_floor: ACTIVITY_FLOOR,
            click_amplification: CLICK_AMPLIFICATION,
            double_click_amplification: DOUBLE_CLICK_AMPLIFICATION,
            burst_duration_ms: BURST_DURATION_MS,
            burst_intensity: BURST_INTENSITY,
            tension_rise: TENSION_RISE,
            tension_release: TENSION_RELEASE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionTuning {
    pub phase_duration_ms: f64,
}

impl Default for TransitionTuning {
    fn default() -> Self {
        Self {
            phase_duration_ms: PHASE_DURATION_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoloConfig {
    pub parameters: BTreeMap<String, ParameterDecl>,
    pub states: Vec<StateDecl>,
    pub initial_state: String,
    #[serde(default)]
    pub mappings: Vec<MappingDecl>,
    #[serde(default)]
    pub blueprints: Vec<BlueprintDecl>,
    #[serde(default)]
    pub input: InputTuning,
    #[serde(default)]
    pub ecosystem: EcosystemTuning,
    #[serde(default)]
    pub transition: TransitionTuning,
}

/// Parameters the pipeline itself writes; every config must declare them.
pub const REQUIRED_PARAMETERS: [&str; 8] = [
    names::GEOMETRY,
    names::GRID_DENSITY,
    names::MORPH_FACTOR,
    names::ROTATION_SPEED,
    names::GLITCH_INTENSITY,
    names::INTENSITY,
    names::TENSION,
    names::ENERGY,
];

impl HoloConfig {
    /// Parse and validate in one step.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: HoloConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn state(&self, name: &str) -> Option<&StateDecl> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parameters.is_empty() {
            return Err(ConfigError::NoParameters);
        }
        for (name, decl) in &self.parameters {
            validate_parameter(name, decl)?;
        }
        for required in REQUIRED_PARAMETERS {
            if !self.parameters.contains_key(required) {
                return Err(ConfigError::MissingParameter(required));
            }
        }

        if self.states.is_empty() {
            return Err(ConfigError::NoStates);
        }
        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(state.name.as_str()) {
                return Err(ConfigError::DuplicateState(state.name.clone()));
            }
            validate_state(state)?;
        }
        if self.state(&self.initial_state).is_none() {
            return Err(ConfigError::UnknownInitialState(self.initial_state.clone()));
        }

        let mut mapped = HashSet::new();
        for m in &self.mappings {
            if !self.parameters.contains_key(&m.target) {
                return Err(ConfigError::UnknownTarget {
                    context: "mapping",
                    target: m.target.clone(),
                });
            }
            if !mapped.insert(m.target.as_str()) {
                return Err(ConfigError::DuplicateMapping(m.target.clone()));
            }
            let gains = [m.gain, m.pattern_gain, m.secondary_weight];
            if !gains.iter().all(|g| g.is_finite()) {
                return Err(ConfigError::InvalidTuning("mapping gain"));
            }
        }
        for b in &self.blueprints {
            if !self.parameters.contains_key(&b.target) {
                return Err(ConfigError::UnknownTarget {
                    context: "blueprint",
                    target: b.target.clone(),
                });
            }
            if !(b.duration_ms > 0.0) || !b.delta.is_finite() {
                return Err(ConfigError::InvalidTuning("blueprint duration/delta"));
            }
        }

        self.validate_tuning()
    }

    fn validate_tuning(&self) -> Result<(), ConfigError> {
        let i = &self.input;
        if !(i.smoothing_alpha > 0.0 && i.smoothing_alpha <= 1.0) {
            return Err(ConfigError::InvalidTuning("input.smoothingAlpha"));
        }
        let windows = [
            i.history_window_ms,
            i.movement_window_ms,
            i.velocity_window_ms,
            i.precision_window_ms,
            i.frequency_window_ms,
        ];
        if windows.iter().any(|w| !(*w > 0.0)) {
            return Err(ConfigError::InvalidTuning("input windows"));
        }
        if !(i.rhythm_variance_scale > 0.0) {
            return Err(ConfigError::InvalidTuning("input.rhythmVarianceScale"));
        }

        let e = &self.ecosystem;
        let factors = [
            e.attention_decay,
            e.awareness_decay,
            e.activity_decay,
            e.tension_decay,
        ];
        if factors.iter().any(|f| !(*f > 0.0 && *f <= 1.0)) {
            return Err(ConfigError::InvalidTuning("ecosystem decay factors"));
        }
        if !(e.tick_ms > 0.0) || !(e.burst_duration_ms >= 0.0) {
            return Err(ConfigError::InvalidTuning("ecosystem timing"));
        }
        if e.proximity.windows(2).any(|w| w[0].0 > w[1].0) {
            return Err(ConfigError::InvalidTuning("ecosystem.proximity order"));
        }

        if !(self.transition.phase_duration_ms >= 0.0) {
            return Err(ConfigError::InvalidTuning("transition.phaseDurationMs"));
        }
        Ok(())
    }
}

fn validate_parameter(name: &str, decl: &ParameterDecl) -> Result<(), ConfigError> {
    match (decl.min, decl.max) {
        (Some(min), Some(max)) => {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ConfigError::InvalidRange {
                    name: name.to_string(),
                    min,
                    max,
                });
            }
            if !decl.default.is_finite() || decl.default < min || decl.default > max {
                return Err(ConfigError::DefaultOutOfRange {
                    name: name.to_string(),
                    default: decl.default,
                });
            }
        }
        (None, None) => {
            if !decl.default.is_finite() {
                return Err(ConfigError::DefaultOutOfRange {
                    name: name.to_string(),
                    default: decl.default,
                });
            }
        }
        _ => {
            return Err(ConfigError::HalfOpenRange {
                name: name.to_string(),
            })
        }
    }
    Ok(())
}

fn validate_state(state: &StateDecl) -> Result<(), ConfigError> {
    let fields = [
        ("gridDensity", state.grid_density),
        ("morphFactor", state.morph_factor),
        ("rotationSpeed", state.rotation_speed),
        ("glitchIntensity", state.glitch_intensity),
    ];
    for (field, v) in fields {
        if !v.is_finite() {
            return Err(ConfigError::InvalidStateValue {
                state: state.name.clone(),
                field,
            });
        }
    }
    let cs = &state.color_scheme;
    for color in [&cs.primary, &cs.secondary, &cs.accent] {
        if parse_hex_color(color).is_none() {
            return Err(ConfigError::InvalidColor {
                state: state.name.clone(),
                color: color.clone(),
            });
        }
    }
    Ok(())
}

/// Parses `#rgb` or `#rrggbb` into linear 0..1 channels.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut out = [0.0; 3];
            for (i, c) in hex.chars().enumerate() {
                let doubled = format!("{c}{c}");
                out[i] = channel(&doubled)?;
            }
            Some(out)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}

// ---------------- Built-in blog configuration ----------------

fn state(
    name: &str,
    geometry: u32,
    grid_density: f32,
    morph_factor: f32,
    rotation_speed: f32,
    glitch_intensity: f32,
    colors: [&str; 3],
) -> StateDecl {
    StateDecl {
        name: name.to_string(),
        geometry,
        grid_density,
        morph_factor,
        rotation_speed,
        glitch_intensity,
        color_scheme: ColorScheme {
            primary: colors[0].to_string(),
            secondary: colors[1].to_string(),
            accent: colors[2].to_string(),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn mapping(
    target: &str,
    primary: BandInput,
    secondary: Option<(BandInput, f32)>,
    mode: CombineMode,
    inverse: bool,
    gain: f32,
    pattern: (PatternSource, f32),
    pulse_threshold: Option<f32>,
) -> MappingDecl {
    MappingDecl {
        target: target.to_string(),
        primary,
        secondary: secondary.map(|(b, _)| b),
        secondary_weight: secondary.map(|(_, w)| w).unwrap_or(0.0),
        mode,
        inverse,
        gain,
        pattern_source: pattern.0,
        pattern_gain: pattern.1,
        pulse_threshold,
    }
}

impl Default for HoloConfig {
    fn default() -> Self {
        let mut parameters = BTreeMap::new();
        let mut decl = |name: &str, d: ParameterDecl| {
            parameters.insert(name.to_string(), d);
        };
        decl(names::GEOMETRY, ParameterDecl::ranged(0.0, 0.0, 7.0, "active polytope index"));
        decl(names::GRID_DENSITY, ParameterDecl::ranged(12.0, 5.0, 25.0, "lattice grid density"));
        decl(names::MORPH_FACTOR, ParameterDecl::ranged(1.0, 0.0, 2.0, "4D morph blend"));
        decl(names::ROTATION_SPEED, ParameterDecl::ranged(0.5, 0.0, 3.0, "4D rotation speed"));
        decl(names::GLITCH_INTENSITY, ParameterDecl::ranged(0.1, 0.0, 1.0, "RGB split amount"));
        decl(names::INTENSITY, ParameterDecl::ranged(0.7, 0.0, 1.5, "overall brightness"));
        decl(names::HUE, ParameterDecl::ranged(0.5, 0.0, 1.0, "base hue"));
        decl(names::SATURATION, ParameterDecl::ranged(0.8, 0.0, 1.0, "color saturation"));
        decl(names::LINE_THICKNESS, ParameterDecl::ranged(0.03, 0.005, 0.1, "lattice line width"));
        decl(names::DIMENSION, ParameterDecl::ranged(3.8, 3.0, 4.5, "projection dimension"));
        decl(names::CHAOS, ParameterDecl::ranged(0.2, 0.0, 1.0, "vertex jitter"));
        decl(names::SPEED, ParameterDecl::ranged(1.0, 0.1, 3.0, "animation time scale"));
        decl(names::TENSION, ParameterDecl::ranged(0.0, 0.0, 1.0, "ecosystem focus tension"));
        decl(names::ENERGY, ParameterDecl::ranged(0.0, 0.0, 1.0, "ecosystem activity energy"));
        decl(names::SCROLL_OFFSET, ParameterDecl::unranged(0.0, "accumulated wheel delta in px"));

        let states = vec![
            state("home", 0, 12.0, 1.0, 0.5, 0.1, ["#ff00ff", "#00ffff", "#ffff00"]),
            state("tech", 1, 16.0, 0.8, 0.8, 0.2, ["#00ff88", "#0088ff", "#ff0088"]),
            state("media", 2, 10.0, 1.2, 0.6, 0.15, ["#ff6600", "#ff0066", "#66ff00"]),
            state("innovation", 3, 18.0, 1.5, 1.2, 0.3, ["#8800ff", "#00ff88", "#ff8800"]),
            state("research", 4, 14.0, 0.6, 0.4, 0.05, ["#0066ff", "#66ffff", "#ffffff"]),
            state("context", 5, 20.0, 1.8, 1.0, 0.4, ["#ff0044", "#ff8800", "#ffff44"]),
            state("philosophy", 6, 8.0, 1.1, 0.3, 0.08, ["#44ffaa", "#aa44ff", "#ffaa44"]),
            state("archive", 7, 22.0, 0.9, 0.7, 0.25, ["#cccccc", "#8888ff", "#ff88cc"]),
        ];

        use BandInput::*;
        use CombineMode::*;
        let mappings = vec![
            mapping(
                names::GRID_DENSITY,
                Movement,
                None,
                Additive,
                false,
                2.2,
                (PatternSource::Intensity, 3.0),
                None,
            ),
            mapping(
                names::MORPH_FACTOR,
                Velocity,
                Some((Precision, 0.3)),
                Additive,
                false,
                0.8,
                (PatternSource::Frequency, 0.6),
                None,
            ),
            mapping(
                names::ROTATION_SPEED,
                Velocity,
                None,
                Additive,
                false,
                1.5,
                (PatternSource::Rhythm, 1.0),
                None,
            ),
            mapping(
                names::GLITCH_INTENSITY,
                Transient,
                None,
                Additive,
                false,
                0.5,
                (PatternSource::Intensity, 0.3),
                Some(0.3),
            ),
            mapping(
                names::INTENSITY,
                Precision,
                None,
                Additive,
                false,
                0.4,
                (PatternSource::Intensity, 0.4),
                Some(0.6),
            ),
            mapping(
                names::HUE,
                Movement,
                Some((Velocity, 1.0)),
                Bipolar,
                false,
                0.1,
                (PatternSource::Value, 0.15),
                None,
            ),
            mapping(
                names::LINE_THICKNESS,
                Movement,
                None,
                Additive,
                true,
                0.02,
                (PatternSource::Intensity, 0.02),
                None,
            ),
            mapping(
                names::DIMENSION,
                Velocity,
                Some((Movement, 1.0)),
                Bipolar,
                false,
                0.3,
                (PatternSource::Frequency, 0.3),
                None,
            ),
            mapping(
                names::CHAOS,
                Velocity,
                Some((Movement, 0.5)),
                Direct,
                false,
                0.8,
                (PatternSource::Intensity, 0.6),
                None,
            ),
            mapping(
                names::SATURATION,
                Precision,
                None,
                Direct,
                true,
                0.9,
                (PatternSource::Rhythm, 0.9),
                None,
            ),
        ];

        let blueprints = vec![
            BlueprintDecl {
                event: InteractionKind::Click,
                target: names::INTENSITY.to_string(),
                delta: 0.3,
                duration_ms: 600.0,
            },
            BlueprintDecl {
                event: InteractionKind::DoubleClick,
                target: names::GLITCH_INTENSITY.to_string(),
                delta: 0.5,
                duration_ms: 800.0,
            },
            BlueprintDecl {
                event: InteractionKind::KeyPress,
                target: names::CHAOS.to_string(),
                delta: 0.2,
                duration_ms: 400.0,
            },
        ];

        Self {
            parameters,
            states,
            initial_state: "home".to_string(),
            mappings,
            blueprints,
            input: InputTuning::default(),
            ecosystem: EcosystemTuning::default(),
            transition: TransitionTuning::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        HoloConfig::default().validate().unwrap();
    }

    #[test]
    fn hex_colors_parse_short_and_long_forms() {
        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn signed_channels_are_not_hex() {
        // `u8::from_str_radix` alone would take "+f" as 15.
        assert_eq!(parse_hex_color("#+f+f+f"), None);
        assert_eq!(parse_hex_color("#0f+f00"), None);
    }

    #[test]
    fn half_open_range_is_rejected() {
        let mut config = HoloConfig::default();
        config.parameters.get_mut(names::HUE).unwrap().max = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HalfOpenRange { .. })
        ));
    }
}
