//! Presentation-layer collaborators.
//!
//! The core decides *what* should change; a [`LayoutProvider`] tells it where
//! elements are and a [`VisualEffectSink`] applies declarative style changes.

use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct ElementRect {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

pub trait LayoutProvider {
    fn element_rects(&self) -> Vec<ElementRect>;
}

/// Fixed layout, handy for tests and headless drivers.
impl LayoutProvider for Vec<ElementRect> {
    fn element_rects(&self) -> Vec<ElementRect> {
        self.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectTarget {
    Page,
    Element(String),
}

/// Declarative style change; `None` fields are left as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleInstruction {
    pub scale: Option<f32>,
    pub opacity: Option<f32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub transition_ms: Option<f64>,
}

impl StyleInstruction {
    /// Everything back to identity.
    pub fn neutral() -> Self {
        Self {
            scale: Some(1.0),
            opacity: Some(1.0),
            brightness: Some(1.0),
            contrast: Some(1.0),
            saturation: Some(1.0),
            transition_ms: None,
        }
    }

    pub fn with_transition(mut self, ms: f64) -> Self {
        self.transition_ms = Some(ms);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_none()
            && self.opacity.is_none()
            && self.brightness.is_none()
            && self.contrast.is_none()
            && self.saturation.is_none()
    }
}

pub trait VisualEffectSink {
    fn apply(&mut self, target: &EffectTarget, style: &StyleInstruction);
}

/// Discards every instruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEffectSink;

impl VisualEffectSink for NullEffectSink {
    fn apply(&mut self, _target: &EffectTarget, _style: &StyleInstruction) {}
}

/// Records instructions in order; used by tests and diagnostics.
#[derive(Clone, Debug, Default)]
pub struct RecordingEffectSink {
    pub applied: Vec<(EffectTarget, StyleInstruction)>,
}

impl VisualEffectSink for RecordingEffectSink {
    fn apply(&mut self, target: &EffectTarget, style: &StyleInstruction) {
        self.applied.push((target.clone(), *style));
    }
}

impl<T: VisualEffectSink + ?Sized> VisualEffectSink for std::rc::Rc<std::cell::RefCell<T>> {
    fn apply(&mut self, target: &EffectTarget, style: &StyleInstruction) {
        self.borrow_mut().apply(target, style);
    }
}
