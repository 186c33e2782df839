use thiserror::Error;

/// Fatal problems found while validating a [`crate::config::HoloConfig`].
///
/// These abort initialization; nothing at runtime produces them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config declares no parameters")]
    NoParameters,
    #[error("required parameter `{0}` is not declared")]
    MissingParameter(&'static str),
    #[error("parameter `{name}` must declare both min and max or neither")]
    HalfOpenRange { name: String },
    #[error("parameter `{name}` has invalid range [{min}, {max}]")]
    InvalidRange { name: String, min: f32, max: f32 },
    #[error("parameter `{name}` default {default} is outside its range or not finite")]
    DefaultOutOfRange { name: String, default: f32 },
    #[error("config declares no states")]
    NoStates,
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),
    #[error("initial state `{0}` is not declared")]
    UnknownInitialState(String),
    #[error("state `{state}` field `{field}` is not a finite number")]
    InvalidStateValue { state: String, field: &'static str },
    #[error("state `{state}` has malformed color `{color}`")]
    InvalidColor { state: String, color: String },
    #[error("{context} targets undeclared parameter `{target}`")]
    UnknownTarget { context: &'static str, target: String },
    #[error("parameter `{0}` is mapped more than once")]
    DuplicateMapping(String),
    #[error("invalid tuning value for `{0}`")]
    InvalidTuning(&'static str),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal runtime failures. Callers log these and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HoloError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("unknown element `{0}`")]
    UnknownElement(String),
    #[error("unknown state `{0}`")]
    UnknownState(String),
    #[error("rejected non-finite value for `{0}`")]
    NotFinite(String),
    #[error("a transition is already running")]
    TransitionLocked,
    #[error("already in state `{0}`")]
    AlreadyInState(String),
}

/// A single renderer instance failed; the pool isolates it from the others.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{operation} failed: {message}")]
pub struct RenderError {
    pub operation: &'static str,
    pub message: String,
}

impl RenderError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
