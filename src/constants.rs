// Browser-side wiring and gesture tuning constants.
//
// Everything the core consumes is configured through `HoloConfig`; these only
// cover how raw DOM events are scaled into normalized interaction samples.

// Pointer speed clamp (normalized viewport units per second)
pub const POINTER_SPEED_MAX: f32 = 3.0;
pub const POINTER_SPEED_BLEND_ALPHA: f32 = 0.35; // new = (1-α)*old + α*target

// Drag events are only reported when the pointer actually travels
pub const DRAG_MIN_INTENSITY: f32 = 0.02;

// Wheel delta (CSS px) that maps to full scroll intensity
pub const WHEEL_DELTA_FULL_PX: f64 = 240.0;
// Scroll offset units per wheel pixel
pub const SCROLL_OFFSET_PER_PX: f32 = 0.001;

// Device tilt (degrees) that maps to full tilt intensity
pub const TILT_FULL_DEG: f64 = 45.0;

// Keys report a fixed intensity; they carry no analog amount
pub const KEY_PRESS_INTENSITY: f32 = 0.6;
pub const CLICK_INTENSITY: f32 = 1.0;

// Ecosystem decay/burst loop period
pub const ECOSYSTEM_INTERVAL_MS: i32 = 50;

// Heads-up display refresh cadence (frames)
pub const HUD_REFRESH_FRAMES: u64 = 15;

// DOM hooks
pub const CONFIG_SCRIPT_ID: &str = "holo-config";
pub const RENDERERS_GLOBAL: &str = "holoRenderers";
pub const CARD_SELECTOR: &str = ".holo-card";
pub const BACKGROUND_ID: &str = "holo-background";
pub const HUD_ID: &str = "holo-hud";
pub const ERROR_OVERLAY_ID: &str = "holo-error";
pub const ERROR_DISMISS_ID: &str = "holo-error-dismiss";
