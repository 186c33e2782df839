// Pure conversions from raw DOM event measurements to normalized
// interaction samples (intensity in [0, 1], position in viewport UV).
use crate::constants::{
    POINTER_SPEED_BLEND_ALPHA, POINTER_SPEED_MAX, TILT_FULL_DEG, WHEEL_DELTA_FULL_PX,
};
use glam::Vec2;
use holo_core::InteractionKind;

/// Viewport pixel position to UV in [0, 1]²; a degenerate viewport maps to
/// the center.
#[inline]
pub fn viewport_uv(x_px: f64, y_px: f64, width_px: f64, height_px: f64) -> Vec2 {
    if width_px <= 0.0 || height_px <= 0.0 {
        return Vec2::splat(0.5);
    }
    Vec2::new(
        (x_px / width_px).clamp(0.0, 1.0) as f32,
        (y_px / height_px).clamp(0.0, 1.0) as f32,
    )
}

/// Tracks pointer speed between samples and blends it into a steady
/// movement intensity.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    last: Option<(Vec2, f64)>,
    speed: f32,
}

impl PointerTracker {
    /// Feed one pointer sample; returns the current movement intensity.
    pub fn sample(&mut self, uv: Vec2, now_ms: f64) -> f32 {
        let Some((prev, prev_ms)) = self.last.replace((uv, now_ms)) else {
            return self.intensity();
        };
        let dt = ((now_ms - prev_ms) / 1000.0) as f32;
        if dt > 0.0 {
            let target = ((uv - prev).length() / dt).min(POINTER_SPEED_MAX);
            self.speed = (1.0 - POINTER_SPEED_BLEND_ALPHA) * self.speed
                + POINTER_SPEED_BLEND_ALPHA * target;
        }
        self.intensity()
    }

    pub fn intensity(&self) -> f32 {
        (self.speed / POINTER_SPEED_MAX).clamp(0.0, 1.0)
    }

    pub fn last_uv(&self) -> Option<Vec2> {
        self.last.map(|(uv, _)| uv)
    }

    /// Forget the previous sample, e.g. when the pointer leaves the page.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[inline]
pub fn wheel_intensity(delta_y: f64) -> f32 {
    (delta_y.abs() / WHEEL_DELTA_FULL_PX).clamp(0.0, 1.0) as f32
}

/// Device orientation (degrees) to a tilt intensity plus a UV-style position
/// centered at 0.5. Missing axes count as level.
pub fn tilt_sample(beta: Option<f64>, gamma: Option<f64>) -> (f32, Vec2) {
    let norm = |deg: Option<f64>| (deg.unwrap_or(0.0) / TILT_FULL_DEG).clamp(-1.0, 1.0) as f32;
    let (b, g) = (norm(beta), norm(gamma));
    let intensity = (b * b + g * g).sqrt().min(1.0);
    (intensity, Vec2::new(0.5 + g * 0.5, 0.5 + b * 0.5))
}

#[inline]
pub fn touch_kind(touches: u32) -> InteractionKind {
    if touches > 1 {
        InteractionKind::MultiTouch
    } else {
        InteractionKind::Touch
    }
}
