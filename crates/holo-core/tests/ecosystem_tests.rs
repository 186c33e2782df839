use holo_core::config::EcosystemTuning;
use holo_core::ecosystem::{EcosystemCoordinator, ReactionBase, VisualState, DEFAULT_COUPLING};
use holo_core::layout::ElementRect;

const BASE: ReactionBase = ReactionBase {
    intensity: 0.7,
    morph_factor: 1.0,
    rotation_speed: 0.5,
};

fn rect(id: &str, x: f32) -> ElementRect {
    ElementRect {
        id: id.to_string(),
        x,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    }
}

/// `a` at the origin; `b` 100px, `c` 250px and `d` 600px away.
fn coordinator() -> EcosystemCoordinator {
    let mut eco = EcosystemCoordinator::new(EcosystemTuning::default());
    let layout = vec![rect("a", 0.0), rect("b", 100.0), rect("c", 250.0), rect("d", 600.0)];
    eco.update_layout(&layout);
    eco
}

fn focused_count(eco: &EcosystemCoordinator) -> usize {
    eco.elements()
        .iter()
        .filter(|e| e.visual == VisualState::Focused)
        .count()
}

#[test]
fn proximity_weights_follow_distance_buckets() {
    let eco = coordinator();
    assert_eq!(eco.influence("a", "b"), Some(0.8));
    assert_eq!(eco.influence("a", "c"), Some(0.4));
    assert_eq!(eco.influence("a", "d"), Some(0.0));
    assert_eq!(eco.influence("a", "missing"), None);
}

#[test]
fn at_most_one_element_is_focused() {
    let mut eco = coordinator();
    eco.on_focus_start("a", &BASE, 0.0);
    assert_eq!(focused_count(&eco), 1);
    assert_eq!(eco.visual_state("b"), Some(VisualState::Inverse));

    eco.on_focus_click("c", &BASE, 10.0);
    assert_eq!(focused_count(&eco), 1);
    assert_eq!(eco.focused_id(), Some("c"));
    assert_eq!(eco.visual_state("a"), Some(VisualState::Inverse));

    // Ending focus on an element that is not focused changes nothing.
    assert!(eco.on_focus_end("a", &BASE, 20.0).is_empty());
    assert_eq!(eco.focused_id(), Some("c"));

    eco.on_focus_end("c", &BASE, 30.0);
    assert_eq!(focused_count(&eco), 0);
    assert!(eco
        .elements()
        .iter()
        .all(|e| e.visual == VisualState::Neutral));
}

#[test]
fn focus_reaction_intensifies_target_and_recedes_siblings() {
    let mut eco = coordinator();
    let reaction = eco.on_focus_start("a", &BASE, 0.0);
    let a = reaction.directive("a").unwrap();
    let b = reaction.directive("b").unwrap();
    assert!(a.intensity > BASE.intensity);
    assert!(b.intensity < BASE.intensity);
    assert!(!a.neutral && !b.neutral);
    assert!((a.style.scale.unwrap() - 1.05).abs() < 1e-6);
    assert!(reaction.tension.unwrap() > 0.0);
}

#[test]
fn click_amplifies_focus() {
    let mut plain = coordinator();
    let mut clicked = coordinator();
    let p = plain.on_focus_start("a", &BASE, 0.0);
    let c = clicked.on_focus_click("a", &BASE, 0.0);
    let ratio = c.directive("a").unwrap().intensity / p.directive("a").unwrap().intensity;
    assert!((ratio - 1.3).abs() < 1e-5);
}

#[test]
fn awareness_ratchets_to_weight() {
    let mut eco = coordinator();
    assert!(eco.propagate_attention("a", 1.0));
    assert!(eco.propagate_attention("a", 1.0));
    assert!(eco.propagate_attention("a", 1.0));
    assert_eq!(eco.element("b").unwrap().awareness, 0.8);
    assert_eq!(eco.element("c").unwrap().awareness, 0.4);
    // Beyond every bucket only the floor remains.
    assert_eq!(eco.element("d").unwrap().awareness, 0.1);

    // A weaker wave never lowers awareness.
    eco.propagate_attention("a", 0.2);
    assert_eq!(eco.element("b").unwrap().awareness, 0.8);
    assert!(!eco.propagate_attention("nope", 1.0));
}

#[test]
fn decay_respects_floors() {
    let mut eco = coordinator();
    eco.on_focus_start("a", &BASE, 0.0);
    assert!(eco.is_engaged(0.0));
    eco.on_focus_end("a", &BASE, 0.0);
    assert!(!eco.is_engaged(0.0));
    for i in 0..2000 {
        eco.decay_tick(&BASE, i as f64 * 50.0);
    }
    for el in eco.elements() {
        assert_eq!(el.attention, 0.1);
        assert_eq!(el.awareness, 0.1);
        assert!(el.activity < 1e-6);
    }
    assert!(eco.tension() < 1e-6);
}

#[test]
fn double_click_burst_reverts_without_further_input() {
    let mut eco = coordinator();
    let burst = eco.on_focus_double_click("a", &BASE, 0.0);
    assert!(burst.directives.iter().all(|d| d.intensity == 1.0));
    assert!(eco.burst_active(999.0));

    let mid = eco.decay_tick(&BASE, 500.0);
    assert!(mid.directives.is_empty());

    let revert = eco.decay_tick(&BASE, 1000.0);
    assert!(!eco.burst_active(1000.0));
    let b = revert.directive("b").unwrap();
    assert!(b.intensity < BASE.intensity);
    assert_eq!(b.style.brightness, Some(1.0));

    // Reverted once; later ticks only report globals.
    assert!(eco.decay_tick(&BASE, 1050.0).directives.is_empty());
}

#[test]
fn unknown_ids_are_ignored() {
    let mut eco = coordinator();
    assert!(eco.on_focus_start("ghost", &BASE, 0.0).is_empty());
    assert!(eco.on_focus_double_click("ghost", &BASE, 0.0).is_empty());
    assert!(!eco.burst_active(1.0));
    assert_eq!(eco.focused_id(), None);
    assert!(!eco.is_engaged(1.0));
}

#[test]
fn background_couples_to_any_focus() {
    let mut eco = coordinator();
    eco.register_background("bg", DEFAULT_COUPLING);
    let idle = eco.reaction(&BASE, 0.0);
    assert!(idle.directive("bg").unwrap().neutral);

    let focused = eco.on_focus_start("d", &BASE, 0.0);
    let bg = focused.directive("bg").unwrap();
    assert!(!bg.neutral);
    assert!((bg.rotation_speed - BASE.rotation_speed * DEFAULT_COUPLING.rotation).abs() < 1e-6);
}

#[test]
fn late_layout_elements_join_in_inverse_while_focused() {
    let mut eco = coordinator();
    eco.on_focus_start("a", &BASE, 0.0);
    eco.update_layout(&vec![rect("a", 0.0), rect("e", 50.0)]);
    assert_eq!(eco.visual_state("e"), Some(VisualState::Inverse));
    assert_eq!(eco.influence("a", "e"), Some(0.8));
}
