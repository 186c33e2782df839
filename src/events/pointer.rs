use super::Wiring;
use crate::constants::{CLICK_INTENSITY, DRAG_MIN_INTENSITY, SCROLL_OFFSET_PER_PX};
use crate::dom;
use crate::gesture;
use glam::Vec2;
use holo_core::params::names;
use holo_core::{Clock, InteractionKind, WriteSource};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_input_handlers(w: &Wiring) {
    let Some(window) = web::window() else {
        return;
    };
    wire_pointermove(w, &window);
    wire_clicks(w, &window);
    wire_wheel(w, &window);
    wire_touchstart(w, &window);
    wire_orientation(w, &window);
}

fn client_uv(x: i32, y: i32) -> Vec2 {
    let (width, height) = dom::viewport_size();
    gesture::viewport_uv(x as f64, y as f64, width, height)
}

fn wire_pointermove(w: &Wiring, window: &web::Window) {
    let w_move = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let now = w_move.clock.now_ms();
        let uv = client_uv(ev.client_x(), ev.client_y());
        let intensity = w_move.tracker.borrow_mut().sample(uv, now);

        let mut ctx = w_move.ctx.borrow_mut();
        ctx.register_event(InteractionKind::Move, intensity, uv, now);
        if ev.buttons() != 0 && intensity > DRAG_MIN_INTENSITY {
            ctx.register_event(InteractionKind::Drag, intensity, uv, now);
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();

    // A pointer re-entering elsewhere must not read as a huge jump.
    let tracker = w.tracker.clone();
    let leave = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        tracker.borrow_mut().reset();
    }) as Box<dyn FnMut(_)>);
    if let Some(document) = window.document() {
        _ = document
            .add_event_listener_with_callback("pointerleave", leave.as_ref().unchecked_ref());
    }
    leave.forget();
}

fn wire_clicks(w: &Wiring, window: &web::Window) {
    for (name, kind) in [
        ("click", InteractionKind::Click),
        ("dblclick", InteractionKind::DoubleClick),
    ] {
        let w_click = w.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
            let now = w_click.clock.now_ms();
            let uv = client_uv(ev.client_x(), ev.client_y());
            w_click
                .ctx
                .borrow_mut()
                .register_event(kind, CLICK_INTENSITY, uv, now);
        }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn wire_wheel(w: &Wiring, window: &web::Window) {
    let w_wheel = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        let now = w_wheel.clock.now_ms();
        let uv = w_wheel
            .tracker
            .borrow()
            .last_uv()
            .unwrap_or(Vec2::splat(0.5));
        let intensity = gesture::wheel_intensity(ev.delta_y());

        let mut ctx = w_wheel.ctx.borrow_mut();
        ctx.register_event(InteractionKind::Scroll, intensity, uv, now);
        let offset = ctx.store().get(names::SCROLL_OFFSET).unwrap_or(0.0)
            + ev.delta_y() as f32 * SCROLL_OFFSET_PER_PX;
        if let Err(e) = ctx
            .store_mut()
            .set_parameter(names::SCROLL_OFFSET, offset, WriteSource::Input)
        {
            log::debug!("[input] scroll offset: {}", e);
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_touchstart(w: &Wiring, window: &web::Window) {
    let w_touch = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::TouchEvent| {
        let now = w_touch.clock.now_ms();
        let touches = ev.touches();
        let uv = touches
            .get(0)
            .map(|t| client_uv(t.client_x(), t.client_y()))
            .unwrap_or(Vec2::splat(0.5));
        let kind = gesture::touch_kind(touches.length());
        w_touch
            .ctx
            .borrow_mut()
            .register_event(kind, CLICK_INTENSITY, uv, now);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_orientation(w: &Wiring, window: &web::Window) {
    let w_tilt = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::DeviceOrientationEvent| {
        let now = w_tilt.clock.now_ms();
        let (intensity, pos) = gesture::tilt_sample(ev.beta(), ev.gamma());
        w_tilt
            .ctx
            .borrow_mut()
            .register_event(InteractionKind::Tilt, intensity, pos, now);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback(
        "deviceorientation",
        closure.as_ref().unchecked_ref(),
    );
    closure.forget();
}
