use holo_core::{ParamMap, ParamValue, RenderError, Renderer, RendererPool};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// A page-provided renderer object driven through its JS methods:
/// `updateParams(obj)` and `render()` are required, `setParameter(name, v)`,
/// `start()` and `stop()` are optional.
pub struct JsRenderer {
    this: JsValue,
    update_params: Function,
    render: Function,
    set_parameter: Option<Function>,
    start: Option<Function>,
    stop: Option<Function>,
}

fn method(this: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(this, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

fn js_error(operation: &'static str, e: JsValue) -> RenderError {
    let message = e.as_string().unwrap_or_else(|| format!("{:?}", e));
    RenderError::new(operation, message)
}

fn to_js(value: &ParamValue) -> JsValue {
    match value {
        ParamValue::Scalar(v) => JsValue::from_f64(*v as f64),
        ParamValue::Color(c) => c
            .iter()
            .map(|v| JsValue::from_f64(*v as f64))
            .collect::<Array>()
            .into(),
    }
}

impl JsRenderer {
    pub fn new(this: JsValue) -> Result<Self, RenderError> {
        let required = |name: &'static str| {
            method(&this, name)
                .ok_or_else(|| RenderError::new("construct", format!("missing `{}`", name)))
        };
        Ok(Self {
            update_params: required("updateParams")?,
            render: required("render")?,
            set_parameter: method(&this, "setParameter"),
            start: method(&this, "start"),
            stop: method(&this, "stop"),
            this,
        })
    }

    fn call_optional(
        &self,
        f: &Option<Function>,
        operation: &'static str,
    ) -> Result<(), RenderError> {
        match f {
            Some(f) => f.call0(&self.this).map(|_| ()).map_err(|e| js_error(operation, e)),
            None => Ok(()),
        }
    }
}

impl Renderer for JsRenderer {
    fn update_params(&mut self, params: &ParamMap) -> Result<(), RenderError> {
        let obj = Object::new();
        for (k, v) in params {
            Reflect::set(&obj, &JsValue::from_str(k), &to_js(v))
                .map_err(|e| js_error("updateParams", e))?;
        }
        self.update_params
            .call1(&self.this, &obj)
            .map(|_| ())
            .map_err(|e| js_error("updateParams", e))
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), RenderError> {
        match &self.set_parameter {
            Some(f) => f
                .call2(&self.this, &JsValue::from_str(name), &to_js(&value))
                .map(|_| ())
                .map_err(|e| js_error("setParameter", e)),
            None => Ok(()),
        }
    }

    fn render(&mut self) -> Result<(), RenderError> {
        self.render
            .call0(&self.this)
            .map(|_| ())
            .map_err(|e| js_error("render", e))
    }

    fn start(&mut self) -> Result<(), RenderError> {
        self.call_optional(&self.start, "start")
    }

    fn stop(&mut self) -> Result<(), RenderError> {
        self.call_optional(&self.stop, "stop")
    }
}

/// Build the pool from `window[global]`, an object keyed by element id.
/// Entries that do not look like renderers are logged and skipped.
pub fn pool_from_global(window: &web_sys::Window, global: &str) -> RendererPool {
    let mut pool = RendererPool::new();
    let registry = match Reflect::get(window, &JsValue::from_str(global)) {
        Ok(v) if v.is_object() => v,
        _ => {
            log::warn!("[renderers] window.{} not found; running without renderers", global);
            return pool;
        }
    };
    for entry in Object::entries(registry.unchecked_ref::<Object>()).iter() {
        let pair: Array = entry.unchecked_into();
        let Some(id) = pair.get(0).as_string() else {
            continue;
        };
        match JsRenderer::new(pair.get(1)) {
            Ok(r) => pool.add(id, Box::new(r)),
            Err(e) => log::warn!("[renderers] skipped `{}`: {}", id, e),
        }
    }
    pool
}
