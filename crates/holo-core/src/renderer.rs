//! Renderer boundary and the pool that broadcasts to every instance.

use crate::error::RenderError;
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color([f32; 3]),
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<[f32; 3]> for ParamValue {
    fn from(v: [f32; 3]) -> Self {
        ParamValue::Color(v)
    }
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }
}

pub type ParamMap = FnvHashMap<String, ParamValue>;

/// Capability contract every rendering backend implements.
pub trait Renderer {
    fn update_params(&mut self, params: &ParamMap) -> Result<(), RenderError>;
    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), RenderError>;
    fn render(&mut self) -> Result<(), RenderError>;
    fn start(&mut self) -> Result<(), RenderError>;
    fn stop(&mut self) -> Result<(), RenderError>;
}

/// Lets a caller keep a handle to a renderer it also hands to the pool.
impl<T: Renderer + ?Sized> Renderer for Rc<RefCell<T>> {
    fn update_params(&mut self, params: &ParamMap) -> Result<(), RenderError> {
        self.borrow_mut().update_params(params)
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), RenderError> {
        self.borrow_mut().set_parameter(name, value)
    }

    fn render(&mut self) -> Result<(), RenderError> {
        self.borrow_mut().render()
    }

    fn start(&mut self) -> Result<(), RenderError> {
        self.borrow_mut().start()
    }

    fn stop(&mut self) -> Result<(), RenderError> {
        self.borrow_mut().stop()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

// Log the first failure of an instance, then every Nth.
const FAILURE_LOG_EVERY: u32 = 300;

struct Instance {
    id: String,
    renderer: Box<dyn Renderer>,
    /// Directed values layered over every broadcast until cleared.
    overrides: ParamMap,
    failures: u32,
}

#[derive(Default)]
pub struct RendererPool {
    instances: Vec<Instance>,
    running: bool,
}

impl std::fmt::Debug for RendererPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererPool")
            .field("instances", &self.ids().collect::<Vec<_>>())
            .field("running", &self.running)
            .finish()
    }
}

impl RendererPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under `id`, usually the id of the page element it
    /// draws behind.
    pub fn add(&mut self, id: impl Into<String>, renderer: Box<dyn Renderer>) {
        let id = id.into();
        log::info!("[renderers] registered `{}`", id);
        self.instances.push(Instance {
            id,
            renderer,
            overrides: ParamMap::default(),
            failures: 0,
        });
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(|i| i.id.as_str())
    }

    pub fn failure_count(&self, id: &str) -> u32 {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .map_or(0, |i| i.failures)
    }

    pub fn start_all(&mut self) -> BroadcastReport {
        self.running = true;
        self.each(|r| r.start())
    }

    pub fn stop_all(&mut self) -> BroadcastReport {
        self.running = false;
        self.each(|r| r.stop())
    }

    /// Push `params` (plus each instance's overrides) to every instance and
    /// render it. A failing instance is logged and skipped; the rest still
    /// receive the frame.
    pub fn broadcast(&mut self, params: &ParamMap) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for inst in self.instances.iter_mut() {
            let result = if inst.overrides.is_empty() {
                inst.renderer.update_params(params)
            } else {
                let mut merged = params.clone();
                merged.extend(inst.overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
                inst.renderer.update_params(&merged)
            };
            let result = result.and_then(|()| inst.renderer.render());
            tally(&mut report, inst, result);
        }
        report
    }

    /// Directed write to one instance. The value is applied immediately and
    /// kept as an override for later broadcasts. Unknown ids are a no-op.
    pub fn set_parameter_for(&mut self, id: &str, name: &str, value: ParamValue) -> bool {
        let Some(inst) = self.instances.iter_mut().find(|i| i.id == id) else {
            log::debug!("[renderers] no instance `{}` for {}", id, name);
            return false;
        };
        inst.overrides.insert(name.to_string(), value.clone());
        match inst.renderer.set_parameter(name, value) {
            Ok(()) => true,
            Err(e) => {
                note_failure(inst, &e);
                false
            }
        }
    }

    /// Record a directed value without pushing it; the next broadcast
    /// carries it to the renderer.
    pub fn set_override(&mut self, id: &str, name: &str, value: ParamValue) -> bool {
        match self.instances.iter_mut().find(|i| i.id == id) {
            Some(inst) => {
                inst.overrides.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Drop directed values so the instance follows broadcasts again.
    pub fn clear_overrides(&mut self, id: &str) {
        if let Some(inst) = self.instances.iter_mut().find(|i| i.id == id) {
            inst.overrides.clear();
        }
    }

    pub fn override_value(&self, id: &str, name: &str) -> Option<&ParamValue> {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .and_then(|i| i.overrides.get(name))
    }

    fn each(
        &mut self,
        mut op: impl FnMut(&mut dyn Renderer) -> Result<(), RenderError>,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for inst in self.instances.iter_mut() {
            let result = op(inst.renderer.as_mut());
            tally(&mut report, inst, result);
        }
        report
    }
}

fn tally(report: &mut BroadcastReport, inst: &mut Instance, result: Result<(), RenderError>) {
    match result {
        Ok(()) => report.delivered += 1,
        Err(e) => {
            report.failed += 1;
            note_failure(inst, &e);
        }
    }
}

fn note_failure(inst: &mut Instance, err: &RenderError) {
    inst.failures += 1;
    if inst.failures == 1 || inst.failures % FAILURE_LOG_EVERY == 0 {
        log::warn!("[renderers] `{}` {} (failure #{})", inst.id, err, inst.failures);
    }
}

/// In-memory renderer that records what it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub last_params: ParamMap,
    pub directives: Vec<(String, ParamValue)>,
    pub frames: u32,
    pub running: bool,
    pub fail_renders: bool,
}

impl RecordingRenderer {
    pub fn failing() -> Self {
        Self {
            fail_renders: true,
            ..Self::default()
        }
    }

    /// Last directed value written for `name`.
    pub fn directive(&self, name: &str) -> Option<&ParamValue> {
        self.directives
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl Renderer for RecordingRenderer {
    fn update_params(&mut self, params: &ParamMap) -> Result<(), RenderError> {
        self.last_params = params.clone();
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), RenderError> {
        self.directives.push((name.to_string(), value));
        Ok(())
    }

    fn render(&mut self) -> Result<(), RenderError> {
        if self.fail_renders {
            return Err(RenderError::new("render", "simulated failure"));
        }
        self.frames += 1;
        Ok(())
    }

    fn start(&mut self) -> Result<(), RenderError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RenderError> {
        self.running = false;
        Ok(())
    }
}
