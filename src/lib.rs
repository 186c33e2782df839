#![cfg(target_arch = "wasm32")]
use holo_core::ecosystem::DEFAULT_COUPLING;
use holo_core::{HoloConfig, InstantClock, SystemContext};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod css;
mod dom;
mod events;
mod frame;
mod gesture;
mod keymap;
mod overlay;
mod renderer;

use constants::{BACKGROUND_ID, CONFIG_SCRIPT_ID, ERROR_DISMISS_ID, RENDERERS_GLOBAL};

/// Page-supplied JSON config, falling back to the built-in one.
fn load_config(document: &web::Document) -> anyhow::Result<HoloConfig> {
    let inline = document
        .get_element_by_id(CONFIG_SCRIPT_ID)
        .and_then(|el| el.text_content())
        .filter(|s| !s.trim().is_empty());
    match inline {
        Some(json) => {
            log::info!("[config] using #{}", CONFIG_SCRIPT_ID);
            Ok(HoloConfig::from_json(&json)?)
        }
        None => Ok(HoloConfig::default()),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("holo-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
            if let Some(document) = dom::window_document() {
                overlay::show_error(&document, &format!("{:#}", e));
            }
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    dom::add_click_listener(&document, ERROR_DISMISS_ID, || {
        if let Some(d) = dom::window_document() {
            overlay::hide_error(&d);
        }
    });

    let config = load_config(&document)?;
    let pool = renderer::pool_from_global(&window, RENDERERS_GLOBAL);
    let effects = dom::DomEffectSink {
        document: document.clone(),
    };
    let mut system = SystemContext::new(&config, pool, Box::new(effects))?;
    if document.get_element_by_id(BACKGROUND_ID).is_some() {
        system.register_background(BACKGROUND_ID, DEFAULT_COUPLING);
    }
    let start = system.pool_mut().start_all();
    if start.failed > 0 {
        log::warn!("[renderers] {} failed to start", start.failed);
    }

    let wiring = events::Wiring {
        ctx: Rc::new(RefCell::new(system)),
        clock: InstantClock::new(),
        paused: Rc::new(RefCell::new(false)),
        tracker: Rc::new(RefCell::new(gesture::PointerTracker::default())),
    };
    events::refresh_layout(&wiring, &document);
    events::wire_all(&wiring, &document);

    frame::start_ecosystem_loop(wiring.ctx.clone(), wiring.clock.clone());
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        ctx: wiring.ctx.clone(),
        clock: wiring.clock.clone(),
        paused: wiring.paused.clone(),
        document,
        failed_frames: 0,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
