use holo_core::config::{HoloConfig, MappingDecl};
use holo_core::input::{Band, BandState, InteractionKind, InteractionPattern};
use holo_core::mapping::{
    map_parameters, BandInput, CombineMode, MappingConfig, PatternSource, Regime,
};
use holo_core::params::{names, ParamValues};

fn builtin() -> (HoloConfig, MappingConfig, ParamValues) {
    let config = HoloConfig::default();
    let mapping = MappingConfig::resolve(&config.mappings, &config.parameters).unwrap();
    let base = config
        .parameters
        .iter()
        .map(|(k, d)| (k.clone(), d.default))
        .collect();
    (config, mapping, base)
}

fn band(v: f32) -> Band {
    Band { raw: v, smoothed: v }
}

fn single(decl: MappingDecl, config: &HoloConfig) -> MappingConfig {
    MappingConfig::resolve(&[decl], &config.parameters).unwrap()
}

fn decl(target: &str, mode: CombineMode, inverse: bool, gain: f32) -> MappingDecl {
    MappingDecl {
        target: target.to_string(),
        primary: BandInput::Movement,
        secondary: None,
        secondary_weight: 0.0,
        mode,
        inverse,
        gain,
        pattern_source: PatternSource::Intensity,
        pattern_gain: gain,
        pulse_threshold: None,
    }
}

#[test]
fn grid_density_follows_movement_in_continuous_regime() {
    let (_, mapping, base) = builtin();
    let bands = BandState {
        movement: band(0.8),
        ..Default::default()
    };
    let out = map_parameters(&bands, &base, &mapping);
    assert_eq!(out.regime, Regime::Continuous);
    let grid = out.get(names::GRID_DENSITY).unwrap().value;
    assert!((grid - 13.76).abs() < 1e-4, "gridDensity {grid}");
}

#[test]
fn active_pattern_switches_to_pattern_formulas() {
    let (_, mapping, base) = builtin();
    let bands = BandState {
        movement: band(0.8),
        pattern: InteractionPattern {
            kind: Some(InteractionKind::Click),
            intensity: 0.5,
            frequency: 2.0,
            rhythmic: false,
            in_sync: false,
        },
        ..Default::default()
    };
    let out = map_parameters(&bands, &base, &mapping);
    assert_eq!(out.regime, Regime::Pattern);
    // 12 + pattern gain 3.0 × pattern intensity 0.5; movement no longer drives it.
    let grid = out.get(names::GRID_DENSITY).unwrap().value;
    assert!((grid - 13.5).abs() < 1e-4, "gridDensity {grid}");
}

#[test]
fn outputs_are_clamped_to_declared_ranges() {
    let (_, mapping, mut base) = builtin();
    base.insert(names::GRID_DENSITY.to_string(), 24.5);
    let bands = BandState {
        movement: band(1.0),
        velocity: band(1.0),
        precision: band(1.0),
        ..Default::default()
    };
    let out = map_parameters(&bands, &base, &mapping);
    assert_eq!(out.get(names::GRID_DENSITY).unwrap().value, 25.0);
    let thickness = out.get(names::LINE_THICKNESS).unwrap().value;
    assert!((0.005..=0.1).contains(&thickness));
}

#[test]
fn inverse_additive_moves_down() {
    let (config, _, base) = builtin();
    let mapping = single(decl(names::LINE_THICKNESS, CombineMode::Additive, true, 0.02), &config);
    let bands = BandState {
        movement: band(0.5),
        ..Default::default()
    };
    let v = map_parameters(&bands, &base, &mapping).get(names::LINE_THICKNESS).unwrap().value;
    assert!((v - 0.02).abs() < 1e-6);
}

#[test]
fn bipolar_is_centered_on_base() {
    let (config, _, base) = builtin();
    let mut d = decl(names::HUE, CombineMode::Bipolar, false, 0.2);
    d.secondary = Some(BandInput::Velocity);
    d.secondary_weight = 1.0;
    let mapping = single(d, &config);

    let balanced = BandState {
        movement: band(0.4),
        velocity: band(0.4),
        ..Default::default()
    };
    let v = map_parameters(&balanced, &base, &mapping).get(names::HUE).unwrap().value;
    assert!((v - 0.5).abs() < 1e-6);

    let skewed = BandState {
        velocity: band(0.5),
        ..Default::default()
    };
    let v = map_parameters(&skewed, &base, &mapping).get(names::HUE).unwrap().value;
    assert!((v - 0.4).abs() < 1e-6);
}

#[test]
fn direct_mode_ignores_base() {
    let (config, _, mut base) = builtin();
    base.insert(names::SATURATION.to_string(), 0.1);
    let mapping = single(decl(names::SATURATION, CombineMode::Direct, true, 0.9), &config);
    let bands = BandState {
        movement: band(0.0),
        ..Default::default()
    };
    let v = map_parameters(&bands, &base, &mapping).get(names::SATURATION).unwrap().value;
    assert!((v - 0.9).abs() < 1e-6);
}

#[test]
fn transient_band_drives_pulse_flag() {
    let (_, mapping, base) = builtin();
    let quiet = BandState::default();
    let out = map_parameters(&quiet, &base, &mapping);
    assert!(!out.get(names::GLITCH_INTENSITY).unwrap().pulse);

    let spike = BandState {
        transient: 0.5,
        ..Default::default()
    };
    let out = map_parameters(&spike, &base, &mapping);
    assert!(out.get(names::GLITCH_INTENSITY).unwrap().pulse);
    assert!(!out.get(names::GRID_DENSITY).unwrap().pulse);
}

#[test]
fn missing_base_falls_back_to_zero() {
    let (_, mapping, mut base) = builtin();
    base.remove(names::CHAOS);
    base.remove(names::GRID_DENSITY);
    let out = map_parameters(&BandState::default(), &base, &mapping);
    // Clamped up from 0 to the declared minimum.
    assert_eq!(out.get(names::GRID_DENSITY).unwrap().value, 5.0);
    assert!(out.get(names::CHAOS).unwrap().value.is_finite());
}

#[test]
fn mapper_is_pure() {
    let (_, mapping, base) = builtin();
    let bands = BandState {
        movement: band(0.3),
        velocity: band(0.6),
        transient: 0.2,
        ..Default::default()
    };
    assert_eq!(
        map_parameters(&bands, &base, &mapping),
        map_parameters(&bands, &base, &mapping)
    );
}
