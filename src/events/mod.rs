mod cards;
mod keyboard;
mod pointer;

use crate::gesture::PointerTracker;
use holo_core::{InstantClock, SystemContext};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

pub use cards::refresh_layout;

/// Shared handles every DOM listener closes over.
#[derive(Clone)]
pub struct Wiring {
    pub ctx: Rc<RefCell<SystemContext>>,
    pub clock: InstantClock,
    pub paused: Rc<RefCell<bool>>,
    pub tracker: Rc<RefCell<PointerTracker>>,
}

pub fn wire_all(w: &Wiring, document: &web::Document) {
    pointer::wire_input_handlers(w);
    keyboard::wire_global_keydown(w);
    cards::wire_cards(w, document);
    cards::wire_layout_resize(w, document);
}
