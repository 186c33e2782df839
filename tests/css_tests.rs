// Host-side tests for style instruction to CSS conversion.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod css {
    include!("../src/css.rs");
}

use css::css_declarations;
use holo_core::layout::StyleInstruction;
use holo_core::transition::TransitionPhase;

fn value<'a>(decls: &'a [(&'static str, String)], prop: &str) -> Option<&'a str> {
    decls.iter().find(|(p, _)| *p == prop).map(|(_, v)| v.as_str())
}

#[test]
fn empty_instruction_emits_nothing() {
    assert!(css_declarations(&StyleInstruction::default()).is_empty());
}

#[test]
fn neutral_resets_transform_opacity_and_filter() {
    let decls = css_declarations(&StyleInstruction::neutral());
    assert_eq!(value(&decls, "transform"), Some("scale(1)"));
    assert_eq!(value(&decls, "opacity"), Some("1"));
    assert_eq!(
        value(&decls, "filter"),
        Some("brightness(1) contrast(1) saturate(1)")
    );
    assert_eq!(value(&decls, "transition"), None);
}

#[test]
fn partial_filters_and_transition() {
    let style = StyleInstruction {
        brightness: Some(1.2),
        saturation: Some(1.3),
        ..Default::default()
    }
    .with_transition(400.0);
    let decls = css_declarations(&style);
    assert_eq!(value(&decls, "filter"), Some("brightness(1.2) saturate(1.3)"));
    assert_eq!(
        value(&decls, "transition"),
        Some("transform 400ms ease, opacity 400ms ease, filter 400ms ease")
    );
    assert_eq!(value(&decls, "transform"), None);
}

#[test]
fn collapse_preset_shrinks_and_dims() {
    let decls = css_declarations(&TransitionPhase::Collapsing.preset());
    assert_eq!(value(&decls, "transform"), Some("scale(0.8)"));
    assert_eq!(value(&decls, "opacity"), Some("0.3"));
}
