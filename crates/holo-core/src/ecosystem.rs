//! Cross-element "ecosystem" reactions.
//!
//! One element may be focused at a time. The focused element intensifies via
//! its profile's `on_focus` modifiers while every sibling takes the `inverse`
//! substate (`on_others_focus`). Attention spreads to nearby elements through
//! distance-bucketed influence weights and decays on a fixed tick.
//!
//! The coordinator never touches renderers or the DOM itself: every operation
//! returns an [`EcosystemReaction`] that the system context applies.

use crate::config::EcosystemTuning;
use crate::layout::{ElementRect, LayoutProvider, StyleInstruction};
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    pub intensity: f32,
    pub morph: f32,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Modifiers {
    pub const IDENTITY: Modifiers = Modifiers {
        intensity: 1.0,
        morph: 1.0,
        rotation: 1.0,
        scale: 1.0,
        opacity: 1.0,
    };

    /// Move each modifier's distance from identity by `k`.
    fn toward_identity(self, k: f32) -> Modifiers {
        let f = |m: f32| 1.0 + (m - 1.0) * k;
        Modifiers {
            intensity: f(self.intensity),
            morph: f(self.morph),
            rotation: f(self.rotation),
            scale: f(self.scale),
            opacity: f(self.opacity),
        }
    }

    fn amplified(self, amp: f32) -> Modifiers {
        Modifiers {
            intensity: self.intensity * amp,
            morph: self.morph * amp,
            rotation: self.rotation * amp,
            scale: 1.0 + (self.scale - 1.0) * amp,
            opacity: self.opacity,
        }
    }
}

/// Asymmetric reaction of one element: how it responds to its own focus and
/// to a sibling's.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorProfile {
    pub on_focus: Modifiers,
    pub on_others_focus: Modifiers,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            on_focus: Modifiers {
                intensity: 1.5,
                morph: 1.3,
                rotation: 1.8,
                scale: 1.05,
                opacity: 1.0,
            },
            on_others_focus: Modifiers {
                intensity: 0.6,
                morph: 0.7,
                rotation: 0.5,
                scale: 0.97,
                opacity: 0.75,
            },
        }
    }
}

/// Default coupling of the shared background to any element's focus.
pub const DEFAULT_COUPLING: Modifiers = Modifiers {
    intensity: 0.8,
    morph: 1.2,
    rotation: 1.3,
    scale: 1.0,
    opacity: 0.9,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    Neutral,
    Focused,
    /// A sibling is focused.
    Inverse,
}

/// Neutral values the reactions scale from; normally the store's bases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactionBase {
    pub intensity: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Proximity {
    pub target: usize,
    pub distance: f32,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EcosystemElement {
    pub id: String,
    pub center: Vec2,
    pub proximity: Vec<Proximity>,
    pub profile: BehaviorProfile,
    pub attention: f32,
    pub awareness: f32,
    pub activity: f32,
    pub visual: VisualState,
}

/// Renderer parameters and style for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementDirective {
    pub id: String,
    pub visual: VisualState,
    /// Identity modifiers and no burst: the element should simply follow
    /// the broadcast values again.
    pub neutral: bool,
    pub intensity: f32,
    pub morph_factor: f32,
    pub rotation_speed: f32,
    pub style: StyleInstruction,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EcosystemReaction {
    pub directives: Vec<ElementDirective>,
    pub tension: Option<f32>,
    pub energy: Option<f32>,
}

impl EcosystemReaction {
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && self.tension.is_none() && self.energy.is_none()
    }

    pub fn directive(&self, id: &str) -> Option<&ElementDirective> {
        self.directives.iter().find(|d| d.id == id)
    }
}

/// Distance → influence weight using `(threshold_px, weight)` buckets sorted
/// nearest first. Beyond the last bucket the weight is zero.
pub fn influence_weight(distance_px: f32, buckets: &[(f32, f32)]) -> f32 {
    buckets
        .iter()
        .find(|(px, _)| distance_px < *px)
        .map_or(0.0, |(_, w)| *w)
}

const STYLE_TRANSITION_MS: f64 = 300.0;
const FOCUS_ACTIVITY_GAIN: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct EcosystemCoordinator {
    tuning: EcosystemTuning,
    elements: Vec<EcosystemElement>,
    background: Option<(String, Modifiers)>,
    focused: Option<usize>,
    amplification: f32,
    tension: f32,
    energy: f32,
    burst_until: Option<f64>,
}

impl EcosystemCoordinator {
    pub fn new(tuning: EcosystemTuning) -> Self {
        Self {
            tuning,
            elements: Vec::new(),
            background: None,
            focused: None,
            amplification: 1.0,
            tension: 0.0,
            energy: 0.0,
            burst_until: None,
        }
    }

    // ---------------- Registration and layout ----------------

    /// Register (or re-profile) an element. Existing attention state is kept.
    pub fn register_element(&mut self, id: &str, center: Vec2, profile: BehaviorProfile) {
        match self.index_of(id) {
            Some(i) => {
                self.elements[i].center = center;
                self.elements[i].profile = profile;
            }
            None => {
                log::info!("[ecosystem] element `{}` joined", id);
                self.elements.push(EcosystemElement {
                    id: id.to_string(),
                    center,
                    proximity: Vec::new(),
                    profile,
                    attention: self.tuning.attention_floor,
                    awareness: self.tuning.awareness_floor,
                    activity: self.tuning.activity_floor,
                    visual: self.visual_for_new(),
                });
            }
        }
        self.recompute_proximity();
    }

    /// The shared background reacts to any focus through `coupling`.
    pub fn register_background(&mut self, id: &str, coupling: Modifiers) {
        self.background = Some((id.to_string(), coupling));
    }

    /// Refresh centers from `layout`. Ids not seen before are registered with
    /// the default profile since page elements can appear late.
    pub fn update_layout(&mut self, layout: &dyn LayoutProvider) {
        for rect in layout.element_rects() {
            if self.is_background(&rect.id) {
                continue;
            }
            self.upsert_rect(&rect);
        }
        self.recompute_proximity();
    }

    fn upsert_rect(&mut self, rect: &ElementRect) {
        match self.index_of(&rect.id) {
            Some(i) => self.elements[i].center = rect.center(),
            None => {
                log::info!("[ecosystem] element `{}` joined from layout", rect.id);
                let visual = self.visual_for_new();
                self.elements.push(EcosystemElement {
                    id: rect.id.clone(),
                    center: rect.center(),
                    proximity: Vec::new(),
                    profile: BehaviorProfile::default(),
                    attention: self.tuning.attention_floor,
                    awareness: self.tuning.awareness_floor,
                    activity: self.tuning.activity_floor,
                    visual,
                });
            }
        }
    }

    fn visual_for_new(&self) -> VisualState {
        if self.focused.is_some() {
            VisualState::Inverse
        } else {
            VisualState::Neutral
        }
    }

    fn recompute_proximity(&mut self) {
        let centers: Vec<Vec2> = self.elements.iter().map(|e| e.center).collect();
        let buckets = self.tuning.proximity;
        for (i, el) in self.elements.iter_mut().enumerate() {
            el.proximity = centers
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, c)| {
                    let distance = el.center.distance(*c);
                    Proximity {
                        target: j,
                        distance,
                        weight: influence_weight(distance, &buckets),
                    }
                })
                .collect();
        }
    }

    // ---------------- Queries ----------------

    fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn is_background(&self, id: &str) -> bool {
        self.background.as_ref().is_some_and(|(b, _)| b == id)
    }

    pub fn element(&self, id: &str) -> Option<&EcosystemElement> {
        self.index_of(id).map(|i| &self.elements[i])
    }

    pub fn elements(&self) -> &[EcosystemElement] {
        &self.elements
    }

    pub fn visual_state(&self, id: &str) -> Option<VisualState> {
        self.element(id).map(|e| e.visual)
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused.map(|i| self.elements[i].id.as_str())
    }

    /// Weight with which `source` influences `target`.
    pub fn influence(&self, source: &str, target: &str) -> Option<f32> {
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        self.elements[s]
            .proximity
            .iter()
            .find(|p| p.target == t)
            .map(|p| p.weight)
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn burst_active(&self, now_ms: f64) -> bool {
        self.burst_until.is_some_and(|until| now_ms < until)
    }

    /// Whether directives currently hold any element off its broadcast.
    pub fn is_engaged(&self, now_ms: f64) -> bool {
        self.focused.is_some() || self.burst_active(now_ms)
    }

    // ---------------- Focus operations ----------------

    pub fn on_focus_start(
        &mut self,
        id: &str,
        base: &ReactionBase,
        now_ms: f64,
    ) -> EcosystemReaction {
        self.focus_with(id, base, 1.0, now_ms)
    }

    pub fn on_focus_click(
        &mut self,
        id: &str,
        base: &ReactionBase,
        now_ms: f64,
    ) -> EcosystemReaction {
        let amp = self.tuning.click_amplification;
        self.focus_with(id, base, amp, now_ms)
    }

    /// Amplified focus plus a maximum-intensity burst on every element that
    /// the decay tick reverts once `burst_duration_ms` has passed.
    pub fn on_focus_double_click(
        &mut self,
        id: &str,
        base: &ReactionBase,
        now_ms: f64,
    ) -> EcosystemReaction {
        if self.index_of(id).is_none() {
            log::debug!("[ecosystem] double-click on unknown `{}` ignored", id);
            return EcosystemReaction::default();
        }
        let until = now_ms + self.tuning.burst_duration_ms;
        self.burst_until = Some(until);
        log::debug!("[ecosystem] burst from `{}` until {:.0}ms", id, until);
        let amp = self.tuning.double_click_amplification;
        self.focus_with(id, base, amp, now_ms)
    }

    pub fn on_focus_end(
        &mut self,
        id: &str,
        base: &ReactionBase,
        now_ms: f64,
    ) -> EcosystemReaction {
        let Some(i) = self.index_of(id) else {
            log::debug!("[ecosystem] focus end on unknown `{}` ignored", id);
            return EcosystemReaction::default();
        };
        if self.focused != Some(i) {
            return EcosystemReaction::default();
        }
        self.clear_focus();
        log::debug!("[ecosystem] `{}` released; tension {:.2}", id, self.tension);
        self.reaction(base, now_ms)
    }

    fn focus_with(
        &mut self,
        id: &str,
        base: &ReactionBase,
        amp: f32,
        now_ms: f64,
    ) -> EcosystemReaction {
        let Some(i) = self.index_of(id) else {
            log::debug!("[ecosystem] focus on unknown `{}` ignored", id);
            return EcosystemReaction::default();
        };
        if let Some(prev) = self.focused {
            if prev != i {
                log::trace!("[ecosystem] focus moves `{}` -> `{}`", self.elements[prev].id, id);
                self.clear_focus();
            }
        }

        self.focused = Some(i);
        self.amplification = amp;
        for (j, el) in self.elements.iter_mut().enumerate() {
            el.visual = if j == i {
                VisualState::Focused
            } else {
                VisualState::Inverse
            };
        }
        {
            let el = &mut self.elements[i];
            el.attention = 1.0;
            el.activity = (el.activity + FOCUS_ACTIVITY_GAIN * amp).min(1.0);
        }
        self.propagate_attention(id, 1.0);
        self.tension += (1.0 - self.tension) * self.tuning.tension_rise;
        self.refresh_energy();
        self.reaction(base, now_ms)
    }

    fn clear_focus(&mut self) {
        self.focused = None;
        self.amplification = 1.0;
        for el in self.elements.iter_mut() {
            el.visual = VisualState::Neutral;
        }
        self.tension *= self.tuning.tension_release;
    }

    /// Raise every other element's awareness to at least `intensity × weight`.
    /// Repeated calls never accumulate past that ceiling.
    pub fn propagate_attention(&mut self, source_id: &str, intensity: f32) -> bool {
        let Some(s) = self.index_of(source_id) else {
            log::debug!("[ecosystem] propagate from unknown `{}` ignored", source_id);
            return false;
        };
        let links: Vec<(usize, f32)> = self.elements[s]
            .proximity
            .iter()
            .map(|p| (p.target, p.weight))
            .collect();
        for (t, w) in links {
            let el = &mut self.elements[t];
            el.awareness = el.awareness.max(intensity * w);
        }
        true
    }

    // ---------------- Decay loop ----------------

    /// One fixed-rate decay step. Reverts an expired burst even when no other
    /// input arrived.
    pub fn decay_tick(&mut self, base: &ReactionBase, now_ms: f64) -> EcosystemReaction {
        let t = &self.tuning;
        for el in self.elements.iter_mut() {
            el.attention = (el.attention * t.attention_decay).max(t.attention_floor);
            el.awareness = (el.awareness * t.awareness_decay).max(t.awareness_floor);
            el.activity = (el.activity * t.activity_decay).max(t.activity_floor);
        }
        self.tension *= t.tension_decay;
        self.refresh_energy();

        let expired = self.burst_until.is_some_and(|until| now_ms >= until);
        if expired {
            self.burst_until = None;
            log::debug!("[ecosystem] burst reverted");
            return self.reaction(base, now_ms);
        }
        EcosystemReaction {
            directives: Vec::new(),
            tension: Some(self.tension),
            energy: Some(self.energy),
        }
    }

    fn refresh_energy(&mut self) {
        self.energy = if self.elements.is_empty() {
            0.0
        } else {
            let sum: f32 = self.elements.iter().map(|e| e.activity).sum();
            (sum / self.elements.len() as f32).clamp(0.0, 1.0)
        };
    }

    // ---------------- Directives ----------------

    /// Directives for every element (and the background) from current state.
    pub fn reaction(&self, base: &ReactionBase, now_ms: f64) -> EcosystemReaction {
        let burst = self.burst_active(now_ms);
        let mut directives: Vec<ElementDirective> = self
            .elements
            .iter()
            .map(|el| {
                let mods = match el.visual {
                    VisualState::Neutral => Modifiers::IDENTITY,
                    VisualState::Focused => el.profile.on_focus.amplified(self.amplification),
                    VisualState::Inverse => {
                        // Nearer siblings (higher awareness) recede further.
                        let k = (0.5 + 0.5 * el.awareness).min(1.0);
                        el.profile.on_others_focus.toward_identity(k)
                    }
                };
                directive_for(&el.id, el.visual, mods, base, burst, self.tuning.burst_intensity)
            })
            .collect();

        if let Some((id, coupling)) = &self.background {
            let mods = if self.focused.is_some() {
                *coupling
            } else {
                Modifiers::IDENTITY
            };
            directives.push(directive_for(
                id,
                VisualState::Neutral,
                mods,
                base,
                burst,
                self.tuning.burst_intensity,
            ));
        }

        EcosystemReaction {
            directives,
            tension: Some(self.tension),
            energy: Some(self.energy),
        }
    }
}

fn directive_for(
    id: &str,
    visual: VisualState,
    mods: Modifiers,
    base: &ReactionBase,
    burst: bool,
    burst_intensity: f32,
) -> ElementDirective {
    let intensity = if burst {
        burst_intensity
    } else {
        base.intensity * mods.intensity
    };
    ElementDirective {
        id: id.to_string(),
        visual,
        neutral: !burst && mods == Modifiers::IDENTITY,
        intensity,
        morph_factor: base.morph_factor * mods.morph,
        rotation_speed: base.rotation_speed * mods.rotation,
        style: StyleInstruction {
            scale: Some(mods.scale),
            opacity: Some(mods.opacity),
            brightness: Some(if burst { 1.3 } else { 1.0 }),
            ..Default::default()
        }
        .with_transition(STYLE_TRANSITION_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influence_weight_buckets() {
        let buckets = EcosystemTuning::default().proximity;
        assert_eq!(influence_weight(0.0, &buckets), 0.8);
        assert_eq!(influence_weight(149.9, &buckets), 0.8);
        assert_eq!(influence_weight(150.0, &buckets), 0.4);
        assert_eq!(influence_weight(499.0, &buckets), 0.1);
        assert_eq!(influence_weight(500.0, &buckets), 0.0);
    }

    #[test]
    fn toward_identity_scales_distance_from_one() {
        let m = Modifiers {
            intensity: 0.6,
            ..Modifiers::IDENTITY
        };
        let half = m.toward_identity(0.5);
        assert!((half.intensity - 0.8).abs() < 1e-6);
        assert_eq!(half.morph, 1.0);
    }
}
