//! External agent surface. Thin pass-throughs with the same clamping and
//! locking rules as internal writers.

use crate::context::SystemContext;
use crate::error::HoloError;
use crate::params::{ParamValues, WriteSource};
use crate::transition::BUNDLE_PARAMETERS;

pub trait AgentApi {
    fn get_parameter(&self, name: &str) -> Option<f32>;

    /// Returns the stored (possibly clamped) value.
    fn set_parameter(
        &mut self,
        name: &str,
        value: f32,
        source: WriteSource,
    ) -> Result<f32, HoloError>;

    fn navigate_to(&mut self, state: &str, now_ms: f64) -> Result<(), HoloError>;

    fn get_all_parameters(&self) -> ParamValues;
}

impl AgentApi for SystemContext {
    fn get_parameter(&self, name: &str) -> Option<f32> {
        self.store().get(name)
    }

    /// Parameters owned by state bundles are frozen while a transition runs.
    fn set_parameter(
        &mut self,
        name: &str,
        value: f32,
        source: WriteSource,
    ) -> Result<f32, HoloError> {
        if self.transitions().is_locked() && BUNDLE_PARAMETERS.contains(&name) {
            log::info!("[api] `{}` is locked by a running transition", name);
            return Err(HoloError::TransitionLocked);
        }
        self.store_mut().set_parameter(name, value, source)
    }

    fn navigate_to(&mut self, state: &str, now_ms: f64) -> Result<(), HoloError> {
        SystemContext::navigate_to(self, state, now_ms)
    }

    fn get_all_parameters(&self) -> ParamValues {
        self.store().values()
    }
}
