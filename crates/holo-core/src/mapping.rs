//! Pure mapping from interaction bands plus base values to effective
//! rendering parameters.
//!
//! Two regimes exist and must stay distinct: while a discrete interaction
//! pattern is active (`pattern.frequency > 0`) each parameter is driven by its
//! pattern formula; otherwise it falls back to the continuous band formula.

use crate::config::{MappingDecl, ParameterDecl};
use crate::constants::PATTERN_FREQUENCY_NORM;
use crate::error::ConfigError;
use crate::input::BandState;
use crate::params::{ParamRange, ParamValues};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BandInput {
    Movement,
    Velocity,
    Precision,
    Transient,
}

impl BandInput {
    /// Smoothed signal used by the continuous regime.
    #[inline]
    pub fn smoothed(self, bands: &BandState) -> f32 {
        match self {
            BandInput::Movement => bands.movement.smoothed,
            BandInput::Velocity => bands.velocity.smoothed,
            BandInput::Precision => bands.precision.smoothed,
            BandInput::Transient => bands.transient,
        }
    }

    /// Instantaneous signal, used for pulse detection.
    #[inline]
    pub fn raw(self, bands: &BandState) -> f32 {
        match self {
            BandInput::Movement => bands.movement.raw,
            BandInput::Velocity => bands.velocity.raw,
            BandInput::Precision => bands.precision.raw,
            BandInput::Transient => bands.transient,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombineMode {
    /// `base ± gain·s`
    Additive,
    /// `base ± gain·b` with a signed drive `b` centered on zero.
    Bipolar,
    /// `gain·s`, or `gain·(1 - s)` when inverted. Ignores the base.
    Direct,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternSource {
    /// Pattern kind's position on the 12-point wheel.
    Value,
    #[default]
    Intensity,
    Frequency,
    Rhythm,
}

impl PatternSource {
    fn drive(self, bands: &BandState) -> f32 {
        let p = &bands.pattern;
        match self {
            PatternSource::Value => p.value(),
            PatternSource::Intensity => p.intensity,
            PatternSource::Frequency => (p.frequency / PATTERN_FREQUENCY_NORM).min(1.0),
            PatternSource::Rhythm => bands.rhythm_strength,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    Pattern,
    Continuous,
}

/// A mapping declaration with its target's range resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterMapping {
    pub decl: MappingDecl,
    pub range: Option<ParamRange>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingConfig {
    pub mappings: Vec<ParameterMapping>,
}

impl MappingConfig {
    pub fn resolve(
        decls: &[MappingDecl],
        parameters: &BTreeMap<String, ParameterDecl>,
    ) -> Result<Self, ConfigError> {
        let mut mappings = Vec::with_capacity(decls.len());
        for d in decls {
            let p = parameters
                .get(&d.target)
                .ok_or_else(|| ConfigError::UnknownTarget {
                    context: "mapping",
                    target: d.target.clone(),
                })?;
            let range = match (p.min, p.max) {
                (Some(min), Some(max)) => Some(ParamRange { min, max }),
                _ => None,
            };
            mappings.push(ParameterMapping {
                decl: d.clone(),
                range,
            });
        }
        Ok(Self { mappings })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedValue {
    pub value: f32,
    /// Drive reached the mapping's pulse threshold this frame.
    pub pulse: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MappedParameters {
    pub regime: Regime,
    pub values: Vec<(String, MappedValue)>,
}

impl MappedParameters {
    pub fn get(&self, name: &str) -> Option<MappedValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

pub fn regime_for(bands: &BandState) -> Regime {
    if bands.pattern.is_active() {
        Regime::Pattern
    } else {
        Regime::Continuous
    }
}

/// Compute effective values for every configured mapping.
///
/// A missing base value is treated as 0 and logged.
pub fn map_parameters(
    bands: &BandState,
    base: &ParamValues,
    config: &MappingConfig,
) -> MappedParameters {
    let regime = regime_for(bands);
    let values = config
        .mappings
        .iter()
        .map(|m| {
            let target = &m.decl.target;
            let base_value = match base.get(target) {
                Some(v) => *v,
                None => {
                    log::warn!("[mapping] no base value for `{}`; using 0", target);
                    0.0
                }
            };
            (target.clone(), map_one(bands, base_value, m, regime))
        })
        .collect();
    MappedParameters { regime, values }
}

fn map_one(bands: &BandState, base: f32, m: &ParameterMapping, regime: Regime) -> MappedValue {
    let d = &m.decl;
    let sign = if d.inverse { -1.0 } else { 1.0 };

    let (drive, signed, gain, pulse_level) = match regime {
        Regime::Pattern => {
            let p = d.pattern_source.drive(bands);
            (p, 2.0 * p - 1.0, d.pattern_gain, bands.pattern.intensity)
        }
        Regime::Continuous => {
            let primary = d.primary.smoothed(bands);
            let secondary = d
                .secondary
                .map_or(0.0, |s| s.smoothed(bands) * d.secondary_weight);
            (
                primary + secondary,
                primary - secondary,
                d.gain,
                d.primary.raw(bands),
            )
        }
    };

    let value = match d.mode {
        CombineMode::Additive => base + sign * gain * drive,
        CombineMode::Bipolar => base + sign * gain * signed,
        CombineMode::Direct => {
            if d.inverse {
                gain * (1.0 - drive)
            } else {
                gain * drive
            }
        }
    };
    let value = if value.is_finite() { value } else { base };
    let value = m.range.map_or(value, |r| r.clamp(value));
    let pulse = d.pulse_threshold.is_some_and(|t| pulse_level >= t);
    MappedValue { value, pulse }
}
