use crate::constants::CARD_SELECTOR;
use crate::css;
use holo_core::layout::{
    EffectTarget, ElementRect, LayoutProvider, StyleInstruction, VisualEffectSink,
};
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = wasm_bindgen::closure::Closure::wrap(
            Box::new(move || handler()) as Box<dyn FnMut()>
        );
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Every element matching the card selector that carries an id.
pub fn card_elements(document: &web::Document) -> Vec<web::Element> {
    let Ok(list) = document.query_selector_all(CARD_SELECTOR) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<web::Element>().ok())
        .filter(|el| !el.id().is_empty())
        .collect()
}

#[inline]
pub fn viewport_size() -> (f64, f64) {
    let Some(w) = web::window() else {
        return (0.0, 0.0);
    };
    let px = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    (px(w.inner_width()), px(w.inner_height()))
}

/// Reads card positions from the live DOM.
pub struct DomLayoutProvider {
    pub document: web::Document,
}

impl LayoutProvider for DomLayoutProvider {
    fn element_rects(&self) -> Vec<ElementRect> {
        card_elements(&self.document)
            .into_iter()
            .map(|el| {
                let r = el.get_bounding_client_rect();
                ElementRect {
                    id: el.id(),
                    x: r.x() as f32,
                    y: r.y() as f32,
                    width: r.width() as f32,
                    height: r.height() as f32,
                }
            })
            .collect()
    }
}

/// Writes style instructions as inline CSS. The page target is `<body>`.
pub struct DomEffectSink {
    pub document: web::Document,
}

impl DomEffectSink {
    fn element(&self, target: &EffectTarget) -> Option<web::HtmlElement> {
        match target {
            EffectTarget::Page => self.document.body(),
            EffectTarget::Element(id) => self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<web::HtmlElement>().ok()),
        }
    }
}

impl VisualEffectSink for DomEffectSink {
    fn apply(&mut self, target: &EffectTarget, style: &StyleInstruction) {
        let Some(el) = self.element(target) else {
            log::debug!("[dom] no element for {:?}", target);
            return;
        };
        let decl = el.style();
        for (prop, value) in css::css_declarations(style) {
            _ = decl.set_property(prop, &value);
        }
    }
}
