//! Input normalization: raw pointer/keyboard/touch/scroll events become three
//! smoothed interaction bands (movement, velocity, precision), a discrete
//! interaction pattern and a rhythm-consistency estimate.

use crate::config::InputTuning;
use crate::constants::{PATTERN_WHEEL_POINTS, RHYTHM_INTERVAL_CAPACITY};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    Move,
    Click,
    DoubleClick,
    Scroll,
    KeyPress,
    Touch,
    Gesture,
    Tilt,
    MultiTouch,
    Drag,
}

const KIND_COUNT: usize = 10;

impl InteractionKind {
    pub const ALL: [InteractionKind; KIND_COUNT] = [
        InteractionKind::Move,
        InteractionKind::Click,
        InteractionKind::DoubleClick,
        InteractionKind::Scroll,
        InteractionKind::KeyPress,
        InteractionKind::Touch,
        InteractionKind::Gesture,
        InteractionKind::Tilt,
        InteractionKind::MultiTouch,
        InteractionKind::Drag,
    ];

    /// Accepts both DOM event type names and the camelCase config names.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "move" | "mousemove" | "pointermove" => InteractionKind::Move,
            "click" | "pointerup" => InteractionKind::Click,
            "doubleClick" | "dblclick" => InteractionKind::DoubleClick,
            "scroll" | "wheel" => InteractionKind::Scroll,
            "keyPress" | "keydown" | "keypress" => InteractionKind::KeyPress,
            "touch" | "touchstart" => InteractionKind::Touch,
            "gesture" | "gesturechange" => InteractionKind::Gesture,
            "tilt" | "deviceorientation" => InteractionKind::Tilt,
            "multiTouch" => InteractionKind::MultiTouch,
            "drag" | "pointerdrag" => InteractionKind::Drag,
            _ => return None,
        };
        Some(kind)
    }

    /// Discrete kinds feed the rhythm detector.
    #[inline]
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            InteractionKind::Click | InteractionKind::DoubleClick | InteractionKind::KeyPress
        )
    }

    #[inline]
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            InteractionKind::Move
                | InteractionKind::Touch
                | InteractionKind::Gesture
                | InteractionKind::Tilt
        )
    }

    #[inline]
    pub fn is_velocity(self) -> bool {
        matches!(
            self,
            InteractionKind::Scroll
                | InteractionKind::Drag
                | InteractionKind::Gesture
                | InteractionKind::MultiTouch
        )
    }

    #[inline]
    pub fn is_precision(self) -> bool {
        matches!(
            self,
            InteractionKind::Click
                | InteractionKind::DoubleClick
                | InteractionKind::KeyPress
                | InteractionKind::Touch
        )
    }

    /// Slot on the 12-point pattern wheel.
    #[inline]
    pub fn slot(self) -> usize {
        match self {
            InteractionKind::Move => 0,
            InteractionKind::Click => 1,
            InteractionKind::DoubleClick => 2,
            InteractionKind::Scroll => 3,
            InteractionKind::KeyPress => 4,
            InteractionKind::Touch => 5,
            InteractionKind::Gesture => 6,
            InteractionKind::Tilt => 7,
            InteractionKind::MultiTouch => 8,
            InteractionKind::Drag => 9,
        }
    }

    /// Fixed pattern value in [0, 1) used as a pseudo-hue for mapping.
    #[inline]
    pub fn pattern_value(self) -> f32 {
        self.slot() as f32 / PATTERN_WHEEL_POINTS
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub timestamp_ms: f64,
    pub intensity: f32,
    pub position: Vec2,
}

/// One interaction band: the instantaneous value and its exponential envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Band {
    pub raw: f32,
    pub smoothed: f32,
}

impl Band {
    #[inline]
    fn smooth(&mut self, alpha: f32) {
        self.smoothed = self.smoothed * (1.0 - alpha) + self.raw * alpha;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionPattern {
    /// Dominant kind over the frequency window, if any event occurred.
    pub kind: Option<InteractionKind>,
    pub intensity: f32,
    /// Events of any kind in the trailing frequency window (events/sec).
    pub frequency: f32,
    pub rhythmic: bool,
    pub in_sync: bool,
}

impl InteractionPattern {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.frequency > 0.0
    }

    pub fn value(&self) -> f32 {
        self.kind.map_or(0.0, InteractionKind::pattern_value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandState {
    pub movement: Band,
    pub velocity: Band,
    pub precision: Band,
    /// Smoothed precision from the previous frame.
    pub last_precision: f32,
    /// `max(0, precision.smoothed - last_precision) * gain`
    pub transient: f32,
    pub rhythm_strength: f32,
    pub pattern: InteractionPattern,
}

/// Consistency of the spacing between discrete interactions.
#[derive(Clone, Debug)]
pub struct RhythmDetector {
    intervals: SmallVec<[f64; RHYTHM_INTERVAL_CAPACITY]>,
    last_event_ms: Option<f64>,
    mean_ms: f64,
    strength: f32,
    min_intervals: usize,
    variance_scale: f64,
}

impl RhythmDetector {
    pub fn new(min_intervals: usize, variance_scale: f64) -> Self {
        Self {
            intervals: SmallVec::new(),
            last_event_ms: None,
            mean_ms: 0.0,
            strength: 0.0,
            min_intervals: min_intervals.max(1),
            variance_scale,
        }
    }

    /// Record a discrete event and return the (possibly unchanged) strength.
    pub fn record(&mut self, now_ms: f64) -> f32 {
        if let Some(last) = self.last_event_ms.replace(now_ms) {
            let interval = (now_ms - last).max(0.0);
            if self.intervals.len() == RHYTHM_INTERVAL_CAPACITY {
                self.intervals.remove(0);
            }
            self.intervals.push(interval);
        }
        if self.intervals.len() < self.min_intervals {
            return self.strength;
        }
        let n = self.intervals.len() as f64;
        let mean = self.intervals.iter().sum::<f64>() / n;
        let variance = self
            .intervals
            .iter()
            .map(|i| (i - mean) * (i - mean))
            .sum::<f64>()
            / n;
        self.mean_ms = mean;
        self.strength = (1.0 - variance / self.variance_scale).max(0.0) as f32;
        self.strength
    }

    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    #[inline]
    pub fn mean_interval_ms(&self) -> f64 {
        self.mean_ms
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn last_interval_ms(&self) -> Option<f64> {
        self.intervals.last().copied()
    }

    fn has_estimate(&self) -> bool {
        self.intervals.len() >= self.min_intervals
    }
}

#[derive(Clone, Debug)]
pub struct InputNormalizer {
    tuning: InputTuning,
    history: VecDeque<InteractionEvent>,
    bands: BandState,
    rhythm: RhythmDetector,
}

impl InputNormalizer {
    pub fn new(tuning: InputTuning) -> Self {
        let rhythm = RhythmDetector::new(tuning.rhythm_min_intervals, tuning.rhythm_variance_scale);
        Self {
            tuning,
            history: VecDeque::new(),
            bands: BandState::default(),
            rhythm,
        }
    }

    #[inline]
    pub fn bands(&self) -> &BandState {
        &self.bands
    }

    #[inline]
    pub fn rhythm(&self) -> &RhythmDetector {
        &self.rhythm
    }

    pub fn history(&self) -> impl Iterator<Item = &InteractionEvent> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Record one raw interaction. Out-of-range or NaN inputs are clamped.
    pub fn register_event(
        &mut self,
        kind: InteractionKind,
        intensity: f32,
        position: Vec2,
        now_ms: f64,
    ) {
        let event = InteractionEvent {
            kind,
            timestamp_ms: now_ms,
            intensity: sanitize_unit(intensity, 0.0),
            position: Vec2::new(sanitize_unit(position.x, 0.5), sanitize_unit(position.y, 0.5)),
        };
        log::trace!(
            "[input] {:?} i={:.2} at ({:.2},{:.2})",
            kind,
            event.intensity,
            event.position.x,
            event.position.y
        );
        self.history.push_back(event);
        self.trim(now_ms);
        self.recompute_raw(now_ms);
        if kind.is_discrete() {
            self.detect_rhythm(kind, now_ms);
        }
    }

    /// Same as [`register_event`](Self::register_event) for DOM-style names.
    /// Unknown names are logged and ignored; returns whether the event was kept.
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
                log::warn!("[input] ignoring unknown interaction `{}`", name);
                false
            }
        }
    }

    pub fn detect_rhythm(&mut self, kind: InteractionKind, now_ms: f64) -> f32 {
        let strength = self.rhythm.record(now_ms);
        self.bands.rhythm_strength = strength;
        log::trace!(
            "[input] rhythm {:?} n={} mean={:.0}ms strength={:.2}",
            kind,
            self.rhythm.interval_count(),
            self.rhythm.mean_interval_ms(),
            strength
        );
        strength
    }

    /// Per-frame update of raw bands, smoothed envelopes and pattern.
    pub fn tick(&mut self, now_ms: f64) -> &BandState {
        self.trim(now_ms);
        self.recompute_raw(now_ms);

        let alpha = self.tuning.smoothing_alpha;
        self.bands.last_precision = self.bands.precision.smoothed;
        self.bands.movement.smooth(alpha);
        self.bands.velocity.smooth(alpha);
        self.bands.precision.smooth(alpha);
        self.bands.transient = (self.bands.precision.smoothed - self.bands.last_precision).max(0.0)
            * self.tuning.transient_gain;

        self.bands.pattern = self.detect_pattern(now_ms);
        &self.bands
    }

    fn trim(&mut self, now_ms: f64) {
        let horizon = now_ms - self.tuning.history_window_ms;
        while let Some(front) = self.history.front() {
            if front.timestamp_ms < horizon {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    fn recompute_raw(&mut self, now_ms: f64) {
        let t = &self.tuning;
        let window = |ms: f64, keep: fn(InteractionKind) -> bool| {
            mean_intensity(&self.history, now_ms, ms, keep)
        };
        let movement = window(t.movement_window_ms, InteractionKind::is_movement);
        let velocity = window(t.velocity_window_ms, InteractionKind::is_velocity);
        let precision = window(t.precision_window_ms, InteractionKind::is_precision);
        self.bands.movement.raw = movement;
        self.bands.velocity.raw = velocity;
        self.bands.precision.raw = precision;
    }

    fn detect_pattern(&self, now_ms: f64) -> InteractionPattern {
        let window = self.tuning.frequency_window_ms;
        let mut counts = [0u32; KIND_COUNT];
        let mut count = 0u32;
        let mut sum = 0.0f32;
        let mut latest: Option<InteractionKind> = None;
        for ev in self.history.iter().filter(|e| now_ms - e.timestamp_ms <= window) {
            count += 1;
            sum += ev.intensity;
            latest = Some(ev.kind);
            counts[ev.kind.slot()] += 1;
        }
        let Some(latest) = latest else {
            return InteractionPattern::default();
        };
        // Most frequent kind; ties go to the most recent one.
        let top = counts.iter().copied().max().unwrap_or(0);
        let kind = if counts[latest.slot()] == top {
            latest
        } else {
            InteractionKind::ALL
                .into_iter()
                .find(|k| counts[k.slot()] == top)
                .unwrap_or(latest)
        };

        let rhythmic =
            self.rhythm.has_estimate() && self.rhythm.strength() >= self.tuning.rhythmic_threshold;
        let in_sync = rhythmic
            && match self.rhythm.last_interval_ms() {
                Some(last) => {
                    let mean = self.rhythm.mean_interval_ms();
                    mean > 0.0 && (last - mean).abs() <= mean * self.tuning.in_sync_tolerance
                }
                None => false,
            };

        InteractionPattern {
            kind: Some(kind),
            intensity: sum / count as f32,
            frequency: count as f32 * (1000.0 / window) as f32,
            rhythmic,
            in_sync,
        }
    }
}

#[inline]
fn sanitize_unit(v: f32, fallback: f32) -> f32 {
    if v.is_nan() {
        fallback
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Mean intensity of events matching `category` within `window_ms` of now.
/// Zero when the window is empty.
fn mean_intensity(
    history: &VecDeque<InteractionEvent>,
    now_ms: f64,
    window_ms: f64,
    category: fn(InteractionKind) -> bool,
) -> f32 {
    let (sum, n) = history
        .iter()
        .filter(|e| now_ms - e.timestamp_ms <= window_ms && category(e.kind))
        .fold((0.0f32, 0u32), |(s, n), e| (s + e.intensity, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_values_sit_on_twelve_point_wheel() {
        for kind in InteractionKind::ALL {
            let v = kind.pattern_value();
            assert!((0.0..1.0).contains(&v));
            assert!(((v * 12.0) - (v * 12.0).round()).abs() < 1e-5);
        }
    }

    #[test]
    fn gesture_counts_toward_movement_and_velocity() {
        assert!(InteractionKind::Gesture.is_movement());
        assert!(InteractionKind::Gesture.is_velocity());
        assert!(!InteractionKind::Gesture.is_precision());
    }

    #[test]
    fn empty_window_yields_zero_not_nan() {
        let history = VecDeque::new();
        assert_eq!(mean_intensity(&history, 0.0, 500.0, InteractionKind::is_movement), 0.0);
    }
}
