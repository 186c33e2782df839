use crate::constants::{ECOSYSTEM_INTERVAL_MS, HUD_REFRESH_FRAMES};
use crate::overlay::{self, HudLine};
use holo_core::params::names;
use holo_core::{Clock, InstantClock, SystemContext};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub ctx: Rc<RefCell<SystemContext>>,
    pub clock: InstantClock,
    pub paused: Rc<RefCell<bool>>,
    pub document: web::Document,
    pub failed_frames: u64,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let paused = *self.paused.borrow();
        if paused {
            return;
        }
        let now = self.clock.now_ms();
        let mut ctx = self.ctx.borrow_mut();
        let report = ctx.frame(now);
        if report.broadcast.failed > 0 {
            self.failed_frames += 1;
            if self.failed_frames == 1 {
                log::warn!("[frame] a renderer failed; the rest keep drawing");
            }
        }
        if !report.pulses.is_empty() {
            log::debug!("[frame] pulses {:?}", report.pulses);
        }

        if ctx.frames() % HUD_REFRESH_FRAMES == 0 {
            let state = ctx.transitions().current_state().name.clone();
            overlay::update_hud(
                &self.document,
                &HudLine {
                    state: &state,
                    phase: &format!("{:?}", report.phase),
                    regime: &format!("{:?}", report.regime),
                    intensity: ctx.store().get(names::INTENSITY).unwrap_or(0.0),
                    tension: ctx.store().get(names::TENSION).unwrap_or(0.0),
                    paused,
                },
            );
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        if let Some(cb) = tick.borrow().as_ref() {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}

/// Fixed-rate ecosystem decay, independent of the display refresh rate.
/// The context itself catches up on missed steps, so a throttled timer only
/// makes the steps coarser.
pub fn start_ecosystem_loop(ctx: Rc<RefCell<SystemContext>>, clock: InstantClock) {
    let closure = Closure::wrap(Box::new(move || {
        let steps = ctx.borrow_mut().ecosystem_tick(clock.now_ms());
        if steps > 1 {
            log::trace!("[ecosystem] caught up {} steps", steps);
        }
    }) as Box<dyn FnMut()>);
    if let Some(w) = web::window() {
        if let Err(e) = w.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ECOSYSTEM_INTERVAL_MS,
        ) {
            log::error!("[ecosystem] setInterval failed: {:?}", e);
        }
    }
    closure.forget();
}
