//! Default tuning constants for the reactivity pipeline.
//!
//! Every value here is only a default: the matching `*Tuning` structs in
//! `config.rs` expose them so a page configuration can override them.

// Input history and band smoothing
pub const HISTORY_WINDOW_MS: f64 = 2000.0;
pub const SMOOTHING_ALPHA: f32 = 0.15; // smoothed = smoothed*(1-α) + raw*α
pub const MOVEMENT_WINDOW_MS: f64 = 500.0;
pub const VELOCITY_WINDOW_MS: f64 = 300.0;
pub const PRECISION_WINDOW_MS: f64 = 200.0;
pub const FREQUENCY_WINDOW_MS: f64 = 1000.0;
pub const TRANSIENT_GAIN: f32 = 2.0;

// Rhythm detection
pub const RHYTHM_INTERVAL_CAPACITY: usize = 8;
pub const RHYTHM_MIN_INTERVALS: usize = 3;
pub const RHYTHM_VARIANCE_SCALE: f64 = 10_000.0; // ms² at which strength reaches zero
pub const RHYTHMIC_THRESHOLD: f32 = 0.7;
pub const IN_SYNC_TOLERANCE: f64 = 0.15; // fraction of the mean interval

// Pattern wheel
pub const PATTERN_WHEEL_POINTS: f32 = 12.0;
pub const PATTERN_FREQUENCY_NORM: f32 = 10.0; // events/sec treated as full frequency drive

// Proximity buckets (px -> influence weight)
pub const PROXIMITY_NEAR_PX: f32 = 150.0;
pub const PROXIMITY_MID_PX: f32 = 300.0;
pub const PROXIMITY_FAR_PX: f32 = 500.0;
pub const PROXIMITY_NEAR_WEIGHT: f32 = 0.8;
pub const PROXIMITY_MID_WEIGHT: f32 = 0.4;
pub const PROXIMITY_FAR_WEIGHT: f32 = 0.1;

// Ecosystem decay loop (20 Hz)
pub const ECOSYSTEM_TICK_MS: f64 = 50.0;
pub const ATTENTION_DECAY: f32 = 0.98;
pub const AWARENESS_DECAY: f32 = 0.99;
pub const ACTIVITY_DECAY: f32 = 0.95;
pub const TENSION_DECAY: f32 = 0.96;
pub const ATTENTION_FLOOR: f32 = 0.1;
pub const AWARENESS_FLOOR: f32 = 0.1;
pub const ACTIVITY_FLOOR: f32 = 0.0;

// Ecosystem focus reactions
pub const CLICK_AMPLIFICATION: f32 = 1.3;
pub const DOUBLE_CLICK_AMPLIFICATION: f32 = 1.5;
pub const BURST_DURATION_MS: f64 = 1000.0;
pub const BURST_INTENSITY: f32 = 1.0;
pub const TENSION_RISE: f32 = 0.5; // fraction of the gap to 1.0 closed per focus
pub const TENSION_RELEASE: f32 = 0.5; // multiplier applied on focus end

// Transition phases
pub const PHASE_DURATION_MS: f64 = 400.0;
