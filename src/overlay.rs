use crate::constants::{ERROR_OVERLAY_ID, HUD_ID};
use web_sys as web;

#[inline]
fn show(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = cl.remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
fn hide(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = cl.add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
fn is_hidden(document: &web::Document, id: &str) -> bool {
    if let Some(el) = document.get_element_by_id(id) {
        if el.class_list().contains("hidden") {
            return true;
        }
        return el
            .get_attribute("style")
            .map(|s| s.contains("display:none"))
            .unwrap_or(false);
    }
    false
}

#[inline]
pub fn toggle_hud(document: &web::Document) {
    if is_hidden(document, HUD_ID) {
        show(document, HUD_ID);
    } else {
        hide(document, HUD_ID);
    }
}

/// Snapshot shown in the heads-up display.
pub struct HudLine<'a> {
    pub state: &'a str,
    pub phase: &'a str,
    pub regime: &'a str,
    pub intensity: f32,
    pub tension: f32,
    pub paused: bool,
}

pub fn update_hud(document: &web::Document, line: &HudLine<'_>) {
    if is_hidden(document, HUD_ID) {
        return;
    }
    if let Some(el) = document.get_element_by_id(HUD_ID) {
        let status = if line.paused { " • paused" } else { "" };
        el.set_text_content(Some(&format!(
            "State: {} ({}) • Regime: {} • Intensity: {:.2} • Tension: {:.2}{}",
            line.state, line.phase, line.regime, line.intensity, line.tension, status
        )));
    }
}

/// Surface a fatal setup problem to the reader instead of failing silently.
pub fn show_error(document: &web::Document, message: &str) {
    if let Some(el) = document.get_element_by_id(ERROR_OVERLAY_ID) {
        if let Ok(Some(msg)) = el.query_selector(".message") {
            msg.set_text_content(Some(message));
        } else {
            el.set_text_content(Some(message));
        }
    }
    show(document, ERROR_OVERLAY_ID);
}

#[inline]
pub fn hide_error(document: &web::Document) {
    hide(document, ERROR_OVERLAY_ID);
}
