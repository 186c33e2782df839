//! Multi-phase state transitions.
//!
//! `collapse → colorFadeOut → applyNewState → colorBloom → expand`, strictly in
//! that order. A [`PhaseDriver`] owns the ordered step list and only advances
//! once the running step's duration has elapsed on the injected clock, so the
//! sequence never overlaps and tests can drive it with virtual time.
//!
//! Transitions cannot be cancelled: a request while one is running is
//! rejected, not queued.

use crate::config::{parse_hex_color, StateDecl, TransitionTuning};
use crate::error::{ConfigError, HoloError};
use crate::layout::StyleInstruction;
use crate::params::names;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    Idle,
    Collapsing,
    Fading,
    Shifting,
    Blooming,
    Expanding,
}

impl TransitionPhase {
    /// Page-level style each phase animates toward.
    pub fn preset(self) -> StyleInstruction {
        match self {
            TransitionPhase::Idle => StyleInstruction::neutral(),
            TransitionPhase::Collapsing => StyleInstruction {
                scale: Some(0.8),
                opacity: Some(0.3),
                ..Default::default()
            },
            TransitionPhase::Fading => StyleInstruction {
                brightness: Some(0.3),
                contrast: Some(0.5),
                saturation: Some(0.05),
                ..Default::default()
            },
            TransitionPhase::Shifting => StyleInstruction::default(),
            TransitionPhase::Blooming => StyleInstruction {
                brightness: Some(1.2),
                contrast: Some(1.1),
                saturation: Some(1.3),
                ..Default::default()
            },
            TransitionPhase::Expanding => StyleInstruction::neutral(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseStep {
    pub phase: TransitionPhase,
    pub duration_ms: f64,
}

/// Ordered steps executed one at a time against an external clock.
#[derive(Clone, Debug)]
pub struct PhaseDriver {
    steps: Vec<PhaseStep>,
    index: usize,
    started_at_ms: f64,
}

impl PhaseDriver {
    pub fn new(steps: Vec<PhaseStep>, now_ms: f64) -> Self {
        Self {
            steps,
            index: 0,
            started_at_ms: now_ms,
        }
    }

    pub fn current(&self) -> Option<PhaseStep> {
        self.steps.get(self.index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Completion signal for the running step. When its duration has elapsed
    /// the step is returned and the next one starts at `now_ms`.
    pub fn poll(&mut self, now_ms: f64) -> Option<PhaseStep> {
        let step = self.current()?;
        if now_ms - self.started_at_ms < step.duration_ms {
            return None;
        }
        self.index += 1;
        self.started_at_ms = now_ms;
        Some(step)
    }
}

/// Resolved per-state modifier bundle.
#[derive(Clone, Debug, PartialEq)]
pub struct StateBundle {
    pub name: String,
    pub geometry: u32,
    pub primary: [f32; 3],
    pub secondary: [f32; 3],
    pub accent: [f32; 3],
    pub grid_density: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
    pub glitch_intensity: f32,
}

/// Parameters a state bundle owns; band mapping leaves them alone mid-transition.
pub const BUNDLE_PARAMETERS: [&str; 5] = [
    names::GEOMETRY,
    names::GRID_DENSITY,
    names::MORPH_FACTOR,
    names::ROTATION_SPEED,
    names::GLITCH_INTENSITY,
];

impl StateBundle {
    pub fn from_decl(decl: &StateDecl) -> Result<Self, ConfigError> {
        let color = |c: &String| {
            parse_hex_color(c).ok_or_else(|| ConfigError::InvalidColor {
                state: decl.name.clone(),
                color: c.clone(),
            })
        };
        Ok(Self {
            name: decl.name.clone(),
            geometry: decl.geometry,
            primary: color(&decl.color_scheme.primary)?,
            secondary: color(&decl.color_scheme.secondary)?,
            accent: color(&decl.color_scheme.accent)?,
            grid_density: decl.grid_density,
            morph_factor: decl.morph_factor,
            rotation_speed: decl.rotation_speed,
            glitch_intensity: decl.glitch_intensity,
        })
    }

    pub fn parameter_values(&self) -> [(&'static str, f32); 5] {
        [
            (names::GEOMETRY, self.geometry as f32),
            (names::GRID_DENSITY, self.grid_density),
            (names::MORPH_FACTOR, self.morph_factor),
            (names::ROTATION_SPEED, self.rotation_speed),
            (names::GLITCH_INTENSITY, self.glitch_intensity),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitionEvent {
    PhaseStarted {
        phase: TransitionPhase,
        style: StyleInstruction,
    },
    PhaseCompleted(TransitionPhase),
    /// The new state's bundle, to be adopted as base values atomically.
    StateApplied(StateBundle),
    Completed {
        from: String,
        to: String,
    },
}

#[derive(Clone, Debug)]
pub struct TransitionSequencer {
    states: Vec<StateBundle>,
    current: usize,
    origin: usize,
    target: Option<usize>,
    driver: Option<PhaseDriver>,
    phase_duration_ms: f64,
}

impl TransitionSequencer {
    pub fn new(
        states: &[StateDecl],
        initial: &str,
        tuning: &TransitionTuning,
    ) -> Result<Self, ConfigError> {
        let states = states
            .iter()
            .map(StateBundle::from_decl)
            .collect::<Result<Vec<_>, _>>()?;
        let current = states
            .iter()
            .position(|s| s.name == initial)
            .ok_or_else(|| ConfigError::UnknownInitialState(initial.to_string()))?;
        Ok(Self {
            states,
            current,
            origin: current,
            target: None,
            driver: None,
            phase_duration_ms: tuning.phase_duration_ms,
        })
    }

    pub fn steps(&self) -> Vec<PhaseStep> {
        let d = self.phase_duration_ms;
        vec![
            PhaseStep {
                phase: TransitionPhase::Collapsing,
                duration_ms: d,
            },
            PhaseStep {
                phase: TransitionPhase::Fading,
                duration_ms: d,
            },
            PhaseStep {
                phase: TransitionPhase::Shifting,
                duration_ms: 0.0,
            },
            PhaseStep {
                phase: TransitionPhase::Blooming,
                duration_ms: d,
            },
            PhaseStep {
                phase: TransitionPhase::Expanding,
                duration_ms: d,
            },
        ]
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.driver.is_some()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.driver
            .as_ref()
            .and_then(PhaseDriver::current)
            .map_or(TransitionPhase::Idle, |s| s.phase)
    }

    pub fn current_state(&self) -> &StateBundle {
        &self.states[self.current]
    }

    pub fn target_state(&self) -> Option<&StateBundle> {
        self.target.map(|i| &self.states[i])
    }

    pub fn state(&self, name: &str) -> Option<&StateBundle> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }

    /// Start a transition to `to`. Rejected while locked, for the current
    /// state, or for an unknown state.
    pub fn request_transition(
        &mut self,
        to: &str,
        now_ms: f64,
    ) -> Result<Vec<TransitionEvent>, HoloError> {
        if self.is_locked() {
            log::info!("[transition] request for `{}` rejected: locked in {:?}", to, self.phase());
            return Err(HoloError::TransitionLocked);
        }
        let Some(target) = self.states.iter().position(|s| s.name == to) else {
            log::warn!("[transition] unknown state `{}`", to);
            return Err(HoloError::UnknownState(to.to_string()));
        };
        if target == self.current {
            log::debug!("[transition] already in `{}`", to);
            return Err(HoloError::AlreadyInState(to.to_string()));
        }

        log::info!(
            "[transition] `{}` -> `{}`",
            self.states[self.current].name,
            self.states[target].name
        );
        self.origin = self.current;
        self.target = Some(target);
        let driver = PhaseDriver::new(self.steps(), now_ms);
        let first = driver.current();
        self.driver = Some(driver);
        Ok(first.map(|s| self.enter(s.phase)).into_iter().flatten().collect())
    }

    /// Advance the running sequence. Zero-length phases complete in the same
    /// call; timed phases complete at most once per call.
    pub fn update(&mut self, now_ms: f64) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        let Some(mut driver) = self.driver.take() else {
            return events;
        };
        while let Some(done) = driver.poll(now_ms) {
            events.push(TransitionEvent::PhaseCompleted(done.phase));
            match driver.current() {
                Some(next) => events.extend(self.enter(next.phase)),
                None => break,
            }
            if driver.current().is_some_and(|s| s.duration_ms > 0.0) {
                break;
            }
        }

        if driver.is_finished() {
            let from = self.states[self.origin].name.clone();
            let to = self.states[self.current].name.clone();
            log::info!("[transition] completed `{}` -> `{}`", from, to);
            self.target = None;
            events.push(TransitionEvent::Completed { from, to });
        } else {
            self.driver = Some(driver);
        }
        events
    }

    fn enter(&mut self, phase: TransitionPhase) -> Vec<TransitionEvent> {
        log::debug!("[transition] phase {:?}", phase);
        let mut events = vec![TransitionEvent::PhaseStarted {
            phase,
            style: phase.preset().with_transition(self.phase_duration_ms),
        }];
        if phase == TransitionPhase::Shifting {
            if let Some(target) = self.target {
                self.current = target;
                events.push(TransitionEvent::StateApplied(self.states[target].clone()));
            }
        }
        events
    }
}
