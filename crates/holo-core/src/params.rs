//! Authoritative parameter store.
//!
//! Every producer (input mapping, ecosystem, transitions, agent API) writes
//! through [`ParameterStore::set_parameter`], which clamps, records the new
//! value and notifies subscribers.

use crate::config::ParameterDecl;
use crate::error::HoloError;
use fnv::FnvHashMap;
use std::collections::BTreeMap;

/// Parameter names the pipeline itself reads or writes.
pub mod names {
    pub const GEOMETRY: &str = "geometry";
    pub const GRID_DENSITY: &str = "gridDensity";
    pub const MORPH_FACTOR: &str = "morphFactor";
    pub const ROTATION_SPEED: &str = "rotationSpeed";
    pub const GLITCH_INTENSITY: &str = "glitchIntensity";
    pub const INTENSITY: &str = "intensity";
    pub const HUE: &str = "hue";
    pub const SATURATION: &str = "saturation";
    pub const LINE_THICKNESS: &str = "lineThickness";
    pub const DIMENSION: &str = "dimension";
    pub const CHAOS: &str = "chaos";
    pub const SPEED: &str = "speed";
    pub const TENSION: &str = "tension";
    pub const ENERGY: &str = "energy";
    pub const SCROLL_OFFSET: &str = "scrollOffset";
}

pub type ParamValues = FnvHashMap<String, f32>;

/// Who issued a write. Authoritative sources also move the base value that
/// the mapper builds on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriteSource {
    Config,
    Input,
    Mapper,
    Blueprint,
    Ecosystem,
    Transition,
    Api,
}

impl WriteSource {
    pub fn sets_base(self) -> bool {
        matches!(
            self,
            WriteSource::Config | WriteSource::Input | WriteSource::Transition | WriteSource::Api
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }
}

#[derive(Clone, Debug)]
struct Entry {
    value: f32,
    base: f32,
    default: f32,
    range: Option<ParamRange>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamChange {
    pub name: String,
    pub old: f32,
    pub new: f32,
    pub source: WriteSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Subscriber = Box<dyn FnMut(&ParamChange)>;

#[derive(Default)]
pub struct ParameterStore {
    entries: FnvHashMap<String, Entry>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("entries", &self.entries.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ParameterStore {
    /// Register every declared parameter at its default. Declarations are
    /// expected to be validated already.
    pub fn from_decls(decls: &BTreeMap<String, ParameterDecl>) -> Self {
        let mut store = Self::default();
        for (name, decl) in decls {
            store.register(name, decl);
        }
        store
    }

    pub fn register(&mut self, name: &str, decl: &ParameterDecl) {
        let range = match (decl.min, decl.max) {
            (Some(min), Some(max)) => Some(ParamRange { min, max }),
            _ => None,
        };
        let default = range.map_or(decl.default, |r| r.clamp(decl.default));
        self.entries.insert(
            name.to_string(),
            Entry {
                value: default,
                base: default,
                default,
                range,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.entries.get(name).map(|e| e.value)
    }

    pub fn base(&self, name: &str) -> Option<f32> {
        self.entries.get(name).map(|e| e.base)
    }

    pub fn default_value(&self, name: &str) -> Option<f32> {
        self.entries.get(name).map(|e| e.default)
    }

    pub fn range(&self, name: &str) -> Option<ParamRange> {
        self.entries.get(name).and_then(|e| e.range)
    }

    /// Clamp `v` to `name`'s range without storing it. Unknown or unranged
    /// names pass the value through.
    pub fn clamp_value(&self, name: &str, v: f32) -> f32 {
        match self.range(name) {
            Some(r) if !v.is_nan() => r.clamp(v),
            _ => v,
        }
    }

    /// Single write entry point. Returns the value actually stored.
    ///
    /// NaN is rejected; ±∞ clamps on ranged parameters and is rejected on
    /// unranged ones.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: f32,
        source: WriteSource,
    ) -> Result<f32, HoloError> {
        let Some(entry) = self.entries.get_mut(name) else {
            log::warn!("[params] write to unknown parameter `{}` from {:?}", name, source);
            return Err(HoloError::UnknownParameter(name.to_string()));
        };
        if value.is_nan() {
            log::warn!("[params] rejected NaN for `{}` from {:?}", name, source);
            return Err(HoloError::NotFinite(name.to_string()));
        }
        let clamped = match entry.range {
            Some(r) => r.clamp(value),
            None if value.is_finite() => value,
            None => {
                log::warn!("[params] rejected {} for unranged `{}`", value, name);
                return Err(HoloError::NotFinite(name.to_string()));
            }
        };
        let old = entry.value;
        entry.value = clamped;
        if source.sets_base() {
            entry.base = clamped;
        }
        if old != clamped {
            let change = ParamChange {
                name: name.to_string(),
                old,
                new: clamped,
                source,
            };
            for (_, sub) in self.subscribers.iter_mut() {
                sub(&change);
            }
        }
        Ok(clamped)
    }

    /// Apply several writes. Unknown names are logged and skipped; returns the
    /// number stored.
    pub fn set_many<'a>(
        &mut self,
        values: impl IntoIterator<Item = (&'a str, f32)>,
        source: WriteSource,
    ) -> usize {
        let mut written = 0;
        for (name, v) in values {
            if self.set_parameter(name, v, source).is_ok() {
                written += 1;
            }
        }
        written
    }

    /// Restore every parameter's value and base to its declared default.
    pub fn reset_to_defaults(&mut self) {
        let names: Vec<(String, f32)> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.default))
            .collect();
        for (name, default) in names {
            _ = self.set_parameter(&name, default, WriteSource::Config);
        }
    }

    pub fn subscribe(&mut self, f: impl FnMut(&ParamChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Current values of every parameter.
    pub fn values(&self) -> ParamValues {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value))
            .collect()
    }

    /// Base values the mapper combines band signals with.
    pub fn bases(&self) -> ParamValues {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.base))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> ParameterStore {
        let mut s = ParameterStore::default();
        s.register("gridDensity", &ParameterDecl::ranged(12.0, 5.0, 25.0, ""));
        s.register("offset", &ParameterDecl::unranged(0.0, ""));
        s
    }

    #[test]
    fn mapper_writes_leave_base_untouched() {
        let mut s = store();
        s.set_parameter("gridDensity", 20.0, WriteSource::Mapper).unwrap();
        assert_eq!(s.get("gridDensity"), Some(20.0));
        assert_eq!(s.base("gridDensity"), Some(12.0));
        s.set_parameter("gridDensity", 7.0, WriteSource::Api).unwrap();
        assert_eq!(s.base("gridDensity"), Some(7.0));
    }

    #[test]
    fn subscribers_see_only_real_changes() {
        let mut s = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = s.subscribe(move |c| sink.borrow_mut().push(c.clone()));
        s.set_parameter("gridDensity", 30.0, WriteSource::Api).unwrap();
        s.set_parameter("gridDensity", 40.0, WriteSource::Api).unwrap(); // clamps to same 25
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].new, 25.0);
        assert!(s.unsubscribe(id));
        s.set_parameter("gridDensity", 6.0, WriteSource::Api).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn unranged_rejects_infinity_but_passes_large_values() {
        let mut s = store();
        assert_eq!(s.set_parameter("offset", 1.0e6, WriteSource::Input), Ok(1.0e6));
        assert!(s.set_parameter("offset", f32::INFINITY, WriteSource::Input).is_err());
        assert_eq!(s.get("offset"), Some(1.0e6));
    }
}
