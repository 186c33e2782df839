//! Interaction blueprints: short parameter animations fired by discrete
//! events, e.g. a click briefly lifting `intensity`.

use crate::config::BlueprintDecl;
use crate::input::InteractionKind;
use fnv::FnvHashMap;

/// Fraction of the duration spent on the linear attack.
const ATTACK_FRACTION: f32 = 0.25;

/// Envelope level at normalized time `t` (0 at start, 1 at the end).
/// Linear rise to 1 over the attack, smoothstep fall back to 0.
pub fn envelope(t: f32) -> f32 {
    if !(0.0..1.0).contains(&t) {
        return 0.0;
    }
    if t < ATTACK_FRACTION {
        return t / ATTACK_FRACTION;
    }
    let s = (t - ATTACK_FRACTION) / (1.0 - ATTACK_FRACTION);
    1.0 - s * s * (3.0 - 2.0 * s)
}

#[derive(Clone, Debug, PartialEq)]
struct Active {
    blueprint: usize,
    started_at_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct BlueprintAnimator {
    blueprints: Vec<BlueprintDecl>,
    active: Vec<Active>,
}

impl BlueprintAnimator {
    pub fn new(blueprints: &[BlueprintDecl]) -> Self {
        Self {
            blueprints: blueprints.to_vec(),
            active: Vec::new(),
        }
    }

    /// Start every blueprint bound to `kind`. Returns how many started.
    pub fn trigger(&mut self, kind: InteractionKind, now_ms: f64) -> usize {
        let mut started = 0;
        for (i, b) in self.blueprints.iter().enumerate() {
            if b.event == kind {
                log::trace!("[blueprint] {:?} -> {} {:+}", kind, b.target, b.delta);
                self.active.push(Active {
                    blueprint: i,
                    started_at_ms: now_ms,
                });
                started += 1;
            }
        }
        started
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Summed offset per target at `now_ms`. Finished animations are dropped.
    pub fn offsets(&mut self, now_ms: f64) -> FnvHashMap<String, f32> {
        let blueprints = &self.blueprints;
        self.active
            .retain(|a| now_ms - a.started_at_ms < blueprints[a.blueprint].duration_ms);

        let mut out = FnvHashMap::default();
        for a in &self.active {
            let b = &blueprints[a.blueprint];
            let t = ((now_ms - a.started_at_ms) / b.duration_ms) as f32;
            *out.entry(b.target.clone()).or_insert(0.0) += b.delta * envelope(t);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_blueprint() -> BlueprintDecl {
        BlueprintDecl {
            event: InteractionKind::Click,
            target: "intensity".to_string(),
            delta: 0.4,
            duration_ms: 400.0,
        }
    }

    #[test]
    fn envelope_shape() {
        assert_eq!(envelope(0.0), 0.0);
        assert!((envelope(0.125) - 0.5).abs() < 1e-6);
        assert!((envelope(0.25) - 1.0).abs() < 1e-6);
        assert!(envelope(0.9) < envelope(0.5));
        assert_eq!(envelope(1.0), 0.0);
    }

    #[test]
    fn offsets_peak_then_expire() {
        let mut anim = BlueprintAnimator::new(&[click_blueprint()]);
        assert_eq!(anim.trigger(InteractionKind::Move, 0.0), 0);
        assert_eq!(anim.trigger(InteractionKind::Click, 0.0), 1);

        let peak = anim.offsets(100.0)["intensity"];
        assert!((peak - 0.4).abs() < 1e-6);
        assert!(anim.offsets(300.0)["intensity"] < peak);
        assert!(anim.offsets(400.0).is_empty());
        assert_eq!(anim.active_count(), 0);
    }

    #[test]
    fn overlapping_triggers_sum() {
        let mut anim = BlueprintAnimator::new(&[click_blueprint()]);
        anim.trigger(InteractionKind::Click, 0.0);
        anim.trigger(InteractionKind::Click, 0.0);
        assert!((anim.offsets(100.0)["intensity"] - 0.8).abs() < 1e-6);
    }
}
