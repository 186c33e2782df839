// Host-side tests for gesture normalization.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod gesture {
    include!("../src/gesture.rs");
}

use constants::*;
use gesture::*;
use glam::Vec2;
use holo_core::InteractionKind;

#[test]
fn viewport_uv_is_clamped_and_safe() {
    assert_eq!(viewport_uv(400.0, 150.0, 800.0, 600.0), Vec2::new(0.5, 0.25));
    assert_eq!(viewport_uv(-10.0, 900.0, 800.0, 600.0), Vec2::new(0.0, 1.0));
    assert_eq!(viewport_uv(10.0, 10.0, 0.0, 600.0), Vec2::splat(0.5));
}

#[test]
fn first_sample_has_no_speed() {
    let mut t = PointerTracker::default();
    assert_eq!(t.sample(Vec2::ZERO, 0.0), 0.0);
    assert_eq!(t.last_uv(), Some(Vec2::ZERO));
}

#[test]
fn steady_motion_converges_to_its_speed() {
    let mut t = PointerTracker::default();
    let speed = POINTER_SPEED_MAX * 0.5;
    let mut intensity = 0.0;
    for i in 0..60 {
        let secs = i as f32 * 0.016;
        intensity = t.sample(Vec2::new(speed * secs, 0.0), secs as f64 * 1000.0);
    }
    assert!((intensity - 0.5).abs() < 0.01, "{intensity}");
}

#[test]
fn fast_jumps_saturate() {
    let mut t = PointerTracker::default();
    t.sample(Vec2::ZERO, 0.0);
    let mut intensity = 0.0;
    for i in 1..40 {
        let x = if i % 2 == 0 { 0.0 } else { 1.0 };
        intensity = t.sample(Vec2::new(x, 0.0), i as f64);
    }
    assert!(intensity <= 1.0);
    assert!(intensity > 0.99);
}

#[test]
fn same_timestamp_keeps_previous_speed() {
    let mut t = PointerTracker::default();
    t.sample(Vec2::ZERO, 0.0);
    let a = t.sample(Vec2::new(0.1, 0.0), 100.0);
    let b = t.sample(Vec2::new(0.9, 0.0), 100.0);
    assert_eq!(a, b);
    assert!(b.is_finite());
}

#[test]
fn reset_forgets_position() {
    let mut t = PointerTracker::default();
    t.sample(Vec2::ZERO, 0.0);
    t.reset();
    assert_eq!(t.last_uv(), None);
    // Re-entering on the other side is not a jump.
    let before = t.intensity();
    assert_eq!(t.sample(Vec2::ONE, 10.0), before);
}

#[test]
fn wheel_scales_by_delta_magnitude() {
    assert_eq!(wheel_intensity(0.0), 0.0);
    assert_eq!(wheel_intensity(-WHEEL_DELTA_FULL_PX / 2.0), 0.5);
    assert_eq!(wheel_intensity(10_000.0), 1.0);
}

#[test]
fn tilt_is_centered_and_bounded() {
    let (level, pos) = tilt_sample(None, None);
    assert_eq!(level, 0.0);
    assert_eq!(pos, Vec2::splat(0.5));

    let (i, pos) = tilt_sample(Some(90.0), Some(-90.0));
    assert_eq!(i, 1.0);
    assert_eq!(pos, Vec2::new(0.0, 1.0));

    let (half, _) = tilt_sample(Some(TILT_FULL_DEG / 2.0), None);
    assert!((half - 0.5).abs() < 1e-6);
}

#[test]
fn touch_count_picks_kind() {
    assert_eq!(touch_kind(0), InteractionKind::Touch);
    assert_eq!(touch_kind(1), InteractionKind::Touch);
    assert_eq!(touch_kind(2), InteractionKind::MultiTouch);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    assert!(POINTER_SPEED_MAX > 0.0);
    assert!(POINTER_SPEED_BLEND_ALPHA > 0.0 && POINTER_SPEED_BLEND_ALPHA <= 1.0);
    assert!((0.0..1.0).contains(&DRAG_MIN_INTENSITY));
    assert!(WHEEL_DELTA_FULL_PX > 0.0);
    assert!(TILT_FULL_DEG > 0.0 && TILT_FULL_DEG <= 90.0);
    assert!((0.0..=1.0).contains(&KEY_PRESS_INTENSITY));
    assert!((0.0..=1.0).contains(&CLICK_INTENSITY));
    assert!(ECOSYSTEM_INTERVAL_MS > 0);
    assert!(CARD_SELECTOR.starts_with('.'));
}
