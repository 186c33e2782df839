use super::Wiring;
use crate::dom::{self, DomLayoutProvider};
use holo_core::{Clock, HoloError, SystemContext};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type FocusOp = fn(&mut SystemContext, &str, f64) -> Result<(), HoloError>;

const FOCUS_EVENTS: [(&str, FocusOp); 4] = [
    ("pointerenter", SystemContext::focus_start),
    ("pointerleave", SystemContext::focus_end),
    ("click", SystemContext::focus_click),
    ("dblclick", SystemContext::focus_double_click),
];

/// Route hover and click on every card to the ecosystem.
pub fn wire_cards(w: &Wiring, document: &web::Document) {
    let cards = dom::card_elements(document);
    log::info!("[cards] wiring {} elements", cards.len());
    for el in cards {
        let id = el.id();
        for (name, op) in FOCUS_EVENTS {
            let w = w.clone();
            let id = id.clone();
            let closure = Closure::wrap(Box::new(move |_ev: web::Event| {
                let now = w.clock.now_ms();
                if let Err(e) = op(&mut w.ctx.borrow_mut(), &id, now) {
                    log::debug!("[cards] {} on `{}`: {}", name, id, e);
                }
            }) as Box<dyn FnMut(_)>);
            _ = el.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

pub fn refresh_layout(w: &Wiring, document: &web::Document) {
    let provider = DomLayoutProvider {
        document: document.clone(),
    };
    w.ctx.borrow_mut().update_layout(&provider);
}

/// Card positions move with the viewport; re-read them on resize.
pub fn wire_layout_resize(w: &Wiring, document: &web::Document) {
    let w = w.clone();
    let document = document.clone();
    let closure = Closure::wrap(Box::new(move || {
        refresh_layout(&w, &document);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
