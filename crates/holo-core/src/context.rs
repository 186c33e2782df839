//! The system context owns every pipeline component and sequences them.
//!
//! Per frame: transition update, state bundle, input tick, mapping, blueprint
//! offsets, store writes, snapshot, broadcast. The ecosystem decays on its own
//! fixed-rate tick.

use crate::blueprint::BlueprintAnimator;
use crate::clock::FixedStep;
use crate::config::HoloConfig;
use crate::ecosystem::{
    EcosystemCoordinator, EcosystemReaction, ElementDirective, Modifiers, ReactionBase,
};
use crate::error::{ConfigError, HoloError};
use crate::input::{BandState, InputNormalizer, InteractionKind};
use crate::layout::{EffectTarget, LayoutProvider, VisualEffectSink};
use crate::mapping::{map_parameters, MappedValue, MappingConfig, Regime};
use crate::params::{names, ParameterStore, WriteSource};
use crate::renderer::{BroadcastReport, ParamMap, ParamValue, RendererPool};
use crate::transition::{
    StateBundle, TransitionEvent, TransitionPhase, TransitionSequencer, BUNDLE_PARAMETERS,
};
use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec2;

/// Upper bound on decay steps replayed after a stalled timer.
const MAX_ECOSYSTEM_CATCHUP: u32 = 20;

pub const PRIMARY_COLOR: &str = "primaryColor";
pub const SECONDARY_COLOR: &str = "secondaryColor";
pub const ACCENT_COLOR: &str = "accentColor";

/// Name of the one-shot broadcast value for `param`'s pulse.
pub fn pulse_name(param: &str) -> String {
    format!("{param}Pulse")
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub regime: Regime,
    pub phase: TransitionPhase,
    /// Parameters whose pulse flag rose this frame.
    pub pulses: Vec<String>,
    pub broadcast: BroadcastReport,
}

pub struct SystemContext {
    store: ParameterStore,
    input: InputNormalizer,
    mapping: MappingConfig,
    ecosystem: EcosystemCoordinator,
    ecosystem_step: FixedStep,
    transitions: TransitionSequencer,
    blueprints: BlueprintAnimator,
    pool: RendererPool,
    effects: Box<dyn VisualEffectSink>,
    colors: [[f32; 3]; 3],
    pulse_levels: FnvHashMap<String, bool>,
    blueprint_touched: FnvHashSet<String>,
    frames: u64,
}

impl std::fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("store", &self.store)
            .field("pool", &self.pool)
            .field("state", &self.transitions.current_state().name)
            .field("frames", &self.frames)
            .finish()
    }
}

impl SystemContext {
    /// Validate `config` and wire every component. The initial state's
    /// bundle becomes the starting base values.
    pub fn new(
        config: &HoloConfig,
        pool: RendererPool,
        effects: Box<dyn VisualEffectSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut store = ParameterStore::from_decls(&config.parameters);
        let mapping = MappingConfig::resolve(&config.mappings, &config.parameters)?;
        let transitions =
            TransitionSequencer::new(&config.states, &config.initial_state, &config.transition)?;

        let initial = transitions.current_state().clone();
        store.set_many(initial.parameter_values(), WriteSource::Config);

        log::info!(
            "[context] {} parameters, {} mappings, {} renderers, state `{}`",
            store.len(),
            mapping.mappings.len(),
            pool.len(),
            initial.name
        );

        Ok(Self {
            store,
            input: InputNormalizer::new(config.input.clone()),
            mapping,
            ecosystem: EcosystemCoordinator::new(config.ecosystem.clone()),
            ecosystem_step: FixedStep::new(config.ecosystem.tick_ms),
            transitions,
            blueprints: BlueprintAnimator::new(&config.blueprints),
            pool,
            effects,
            colors: [initial.primary, initial.secondary, initial.accent],
            pulse_levels: FnvHashMap::default(),
            blueprint_touched: FnvHashSet::default(),
            frames: 0,
        })
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    pub fn bands(&self) -> &BandState {
        self.input.bands()
    }

    pub fn input(&self) -> &InputNormalizer {
        &self.input
    }

    pub fn ecosystem(&self) -> &EcosystemCoordinator {
        &self.ecosystem
    }

    pub fn transitions(&self) -> &TransitionSequencer {
        &self.transitions
    }

    pub fn pool(&self) -> &RendererPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut RendererPool {
        &mut self.pool
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    // ---------------- Input ----------------

    /// Feed one raw interaction to the normalizer and fire matching blueprints.
    pub fn register_event(
        &mut self,
        kind: InteractionKind,
        intensity: f32,
        position: Vec2,
        now_ms: f64,
    ) {
        self.input.register_event(kind, intensity, position, now_ms);
        self.blueprints.trigger(kind, now_ms);
    }

    /// DOM-style event name variant; unknown names are ignored.
    pub fn register_named_event(
        &mut self,
        name: &str,
        intensity: f32,
        position: Vec2,
        now_ms: f64,
    ) -> bool {
        match InteractionKind::from_name(name) {
            Some(kind) => {
                self.register_event(kind, intensity, position, now_ms);
                true
            }
            None => {
                log::warn!("[context] ignored unknown event `{}`", name);
                false
            }
        }
    }

    // ---------------- Frame ----------------

    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        self.frames += 1;

        let events = self.transitions.update(now_ms);
        self.apply_transition_events(events);

        let bands = *self.input.tick(now_ms);
        let mapped = map_parameters(&bands, &self.store.bases(), &self.mapping);
        let locked = self.transitions.is_locked();
        let offsets = self.blueprints.offsets(now_ms);

        for (name, mv) in &mapped.values {
            if locked && BUNDLE_PARAMETERS.contains(&name.as_str()) {
                continue;
            }
            let v = mv.value + offsets.get(name).copied().unwrap_or(0.0);
            _ = self.store.set_parameter(name, v, WriteSource::Mapper);
        }
        self.apply_unmapped_offsets(&offsets, &mapped.values, locked);

        let mut params: ParamMap = self
            .store
            .values()
            .into_iter()
            .map(|(k, v)| (k, ParamValue::Scalar(v)))
            .collect();
        params.insert(PRIMARY_COLOR.to_string(), self.colors[0].into());
        params.insert(SECONDARY_COLOR.to_string(), self.colors[1].into());
        params.insert(ACCENT_COLOR.to_string(), self.colors[2].into());

        let mut pulses = Vec::new();
        for m in self.mapping.mappings.iter().filter(|m| m.decl.pulse_threshold.is_some()) {
            let target = &m.decl.target;
            let level = mapped.get(target).is_some_and(|v| v.pulse);
            let was = self.pulse_levels.insert(target.clone(), level).unwrap_or(false);
            let rising = level && !was;
            if rising {
                log::trace!("[context] pulse {}", target);
                pulses.push(target.clone());
            }
            params.insert(pulse_name(target), ParamValue::Scalar(if rising { 1.0 } else { 0.0 }));
        }

        self.refresh_directives(now_ms);
        let broadcast = self.pool.broadcast(&params);
        FrameReport {
            regime: mapped.regime,
            phase: self.transitions.phase(),
            pulses,
            broadcast,
        }
    }

    /// Blueprint targets without a mapping animate around their base value and
    /// return to it once the animation ends.
    fn apply_unmapped_offsets(
        &mut self,
        offsets: &FnvHashMap<String, f32>,
        mapped: &[(String, MappedValue)],
        locked: bool,
    ) {
        let is_mapped = |name: &str| mapped.iter().any(|(n, _)| n == name);
        let mut touched = FnvHashSet::default();
        for (name, off) in offsets {
            if is_mapped(name) || (locked && BUNDLE_PARAMETERS.contains(&name.as_str())) {
                continue;
            }
            if let Some(base) = self.store.base(name) {
                _ = self.store.set_parameter(name, base + off, WriteSource::Blueprint);
                touched.insert(name.clone());
            }
        }
        for name in self.blueprint_touched.difference(&touched) {
            if let Some(base) = self.store.base(name) {
                _ = self.store.set_parameter(name, base, WriteSource::Blueprint);
            }
        }
        self.blueprint_touched = touched;
    }

    // ---------------- Transitions ----------------

    pub fn navigate_to(&mut self, state: &str, now_ms: f64) -> Result<(), HoloError> {
        let events = self.transitions.request_transition(state, now_ms)?;
        self.apply_transition_events(events);
        Ok(())
    }

    /// Restore every declared default, then re-apply the current state's
    /// bundle on top. Refused while a transition owns the bundle parameters.
    pub fn reset_parameters(&mut self) -> Result<(), HoloError> {
        if self.transitions.is_locked() {
            return Err(HoloError::TransitionLocked);
        }
        self.store.reset_to_defaults();
        let bundle = self.transitions.current_state().clone();
        self.apply_bundle(&bundle);
        Ok(())
    }

    fn apply_transition_events(&mut self, events: Vec<TransitionEvent>) {
        for event in events {
            match event {
                TransitionEvent::PhaseStarted { style, .. } => {
                    if !style.is_empty() {
                        self.effects.apply(&EffectTarget::Page, &style);
                    }
                }
                TransitionEvent::StateApplied(bundle) => self.apply_bundle(&bundle),
                TransitionEvent::PhaseCompleted(_) | TransitionEvent::Completed { .. } => {}
            }
        }
    }

    fn apply_bundle(&mut self, bundle: &StateBundle) {
        let written = self
            .store
            .set_many(bundle.parameter_values(), WriteSource::Transition);
        self.colors = [bundle.primary, bundle.secondary, bundle.accent];
        log::debug!("[context] applied `{}` ({} parameters)", bundle.name, written);
    }

    // ---------------- Ecosystem ----------------

    pub fn update_layout(&mut self, layout: &dyn LayoutProvider) {
        self.ecosystem.update_layout(layout);
    }

    pub fn register_background(&mut self, id: &str, coupling: Modifiers) {
        self.ecosystem.register_background(id, coupling);
    }

    /// Focus operations fail with `UnknownElement` for ids the ecosystem has
    /// never seen; nothing changes in that case.
    pub fn focus_start(&mut self, id: &str, now_ms: f64) -> Result<(), HoloError> {
        self.known_element(id)?;
        let base = self.reaction_base();
        let reaction = self.ecosystem.on_focus_start(id, &base, now_ms);
        self.apply_reaction(reaction);
        Ok(())
    }

    pub fn focus_end(&mut self, id: &str, now_ms: f64) -> Result<(), HoloError> {
        self.known_element(id)?;
        let base = self.reaction_base();
        let reaction = self.ecosystem.on_focus_end(id, &base, now_ms);
        self.apply_reaction(reaction);
        Ok(())
    }

    pub fn focus_click(&mut self, id: &str, now_ms: f64) -> Result<(), HoloError> {
        self.known_element(id)?;
        let base = self.reaction_base();
        let reaction = self.ecosystem.on_focus_click(id, &base, now_ms);
        self.apply_reaction(reaction);
        Ok(())
    }

    pub fn focus_double_click(&mut self, id: &str, now_ms: f64) -> Result<(), HoloError> {
        self.known_element(id)?;
        let base = self.reaction_base();
        let reaction = self.ecosystem.on_focus_double_click(id, &base, now_ms);
        self.apply_reaction(reaction);
        Ok(())
    }

    fn known_element(&self, id: &str) -> Result<(), HoloError> {
        if self.ecosystem.element(id).is_some() {
            Ok(())
        } else {
            Err(HoloError::UnknownElement(id.to_string()))
        }
    }

    /// Run however many fixed-rate decay steps have elapsed. Returns the
    /// number of steps taken.
    pub fn ecosystem_tick(&mut self, now_ms: f64) -> u32 {
        let steps = self.ecosystem_step.steps(now_ms, MAX_ECOSYSTEM_CATCHUP);
        for _ in 0..steps {
            let base = self.reaction_base();
            let reaction = self.ecosystem.decay_tick(&base, now_ms);
            self.apply_reaction(reaction);
        }
        steps
    }

    /// Directives scale from the live values, so a focused element keeps
    /// following state bundles, mapping and blueprint offsets.
    fn reaction_base(&self) -> ReactionBase {
        let current = |name: &str, fallback: f32| self.store.get(name).unwrap_or(fallback);
        ReactionBase {
            intensity: current(names::INTENSITY, 1.0),
            morph_factor: current(names::MORPH_FACTOR, 1.0),
            rotation_speed: current(names::ROTATION_SPEED, 1.0),
        }
    }

    fn apply_reaction(&mut self, reaction: EcosystemReaction) {
        if let Some(t) = reaction.tension {
            _ = self.store.set_parameter(names::TENSION, t, WriteSource::Ecosystem);
        }
        if let Some(e) = reaction.energy {
            _ = self.store.set_parameter(names::ENERGY, e, WriteSource::Ecosystem);
        }
        for d in reaction.directives {
            self.direct(&d, true);
            self.effects.apply(&EffectTarget::Element(d.id), &d.style);
        }
    }

    /// Recompute the directed values of an engaged ecosystem against this
    /// frame's parameters. Styles are left alone; they only change on focus
    /// events and decay ticks.
    fn refresh_directives(&mut self, now_ms: f64) {
        if !self.ecosystem.is_engaged(now_ms) {
            return;
        }
        let reaction = self.ecosystem.reaction(&self.reaction_base(), now_ms);
        for d in &reaction.directives {
            self.direct(d, false);
        }
    }

    /// `push` sends the values to the renderer immediately; otherwise they
    /// only ride along with the next broadcast.
    fn direct(&mut self, d: &ElementDirective, push: bool) {
        if d.neutral {
            self.pool.clear_overrides(&d.id);
            return;
        }
        let values = [
            (names::INTENSITY, d.intensity),
            (names::MORPH_FACTOR, d.morph_factor),
            (names::ROTATION_SPEED, d.rotation_speed),
        ];
        for (name, v) in values {
            let v = ParamValue::Scalar(self.store.clamp_value(name, v));
            if push {
                self.pool.set_parameter_for(&d.id, name, v);
            } else {
                self.pool.set_override(&d.id, name, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NullEffectSink;

    #[test]
    fn initial_bundle_becomes_base() {
        let config = HoloConfig::default();
        let ctx =
            SystemContext::new(&config, RendererPool::new(), Box::new(NullEffectSink)).unwrap();
        let home = config.state(&config.initial_state).unwrap();
        assert_eq!(ctx.store().base(names::GRID_DENSITY), Some(home.grid_density));
        assert_eq!(ctx.transitions().current_state().name, config.initial_state);
    }

    #[test]
    fn pulse_name_suffix() {
        assert_eq!(pulse_name("intensity"), "intensityPulse");
    }
}
