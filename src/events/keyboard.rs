use super::Wiring;
use crate::constants::KEY_PRESS_INTENSITY;
use crate::keymap::{self, KeyAction};
use crate::overlay;
use glam::Vec2;
use holo_core::{Clock, InteractionKind};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn navigate_to_index(w: &Wiring, index: usize, now: f64) {
    let mut ctx = w.ctx.borrow_mut();
    let state = keymap::state_for_index(ctx.transitions().state_names(), index);
    let Some(state) = state.map(str::to_string) else {
        log::debug!("[keys] no state #{}", index + 1);
        return;
    };
    match ctx.navigate_to(&state, now) {
        Ok(()) => log::info!("[keys] navigating to `{}`", state),
        Err(e) => log::info!("[keys] navigation to `{}` refused: {}", state, e),
    }
}

fn toggle_pause(w: &Wiring) {
    let paused = {
        let mut p = w.paused.borrow_mut();
        *p = !*p;
        *p
    };
    let mut ctx = w.ctx.borrow_mut();
    let report = if paused {
        ctx.pool_mut().stop_all()
    } else {
        ctx.pool_mut().start_all()
    };
    log::info!(
        "[keys] {} ({} renderers, {} failed)",
        if paused { "paused" } else { "resumed" },
        report.delivered,
        report.failed
    );
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, w: &Wiring) {
    if ev.repeat() {
        return;
    }
    let now = w.clock.now_ms();
    let pointer = w.tracker.borrow().last_uv().unwrap_or(Vec2::splat(0.5));
    w.ctx
        .borrow_mut()
        .register_event(InteractionKind::KeyPress, KEY_PRESS_INTENSITY, pointer, now);

    let Some(action) = keymap::action_for_key(&ev.key()) else {
        return;
    };
    match action {
        KeyAction::NavigateTo(i) => navigate_to_index(w, i, now),
        KeyAction::TogglePause => {
            ev.prevent_default();
            toggle_pause(w);
        }
        KeyAction::ToggleHud => {
            if let Some(document) = crate::dom::window_document() {
                overlay::toggle_hud(&document);
            }
        }
        KeyAction::ResetParameters => {
            if let Err(e) = w.ctx.borrow_mut().reset_parameters() {
                log::info!("[keys] reset refused: {}", e);
            }
        }
    }
}

pub fn wire_global_keydown(w: &Wiring) {
    let w = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &w);
    }) as Box<dyn FnMut(_)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
