pub mod api;
pub mod blueprint;
pub mod clock;
pub mod config;
pub mod constants;
pub mod context;
pub mod ecosystem;
pub mod error;
pub mod input;
pub mod layout;
pub mod mapping;
pub mod params;
pub mod renderer;
pub mod transition;

pub use api::AgentApi;
pub use clock::{Clock, InstantClock, ManualClock};
pub use config::HoloConfig;
pub use context::{FrameReport, SystemContext};
pub use error::{ConfigError, HoloError, RenderError};
pub use input::InteractionKind;
pub use params::WriteSource;
pub use renderer::{ParamMap, ParamValue, Renderer, RendererPool};
