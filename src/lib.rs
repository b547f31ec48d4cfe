//! Platform-independent core of the crosshair overlay: settings and their
//! persistence, the state machine driven by tray/panel/drag input, the
//! rasterizer and the settings panel model. The Win32 shell lives in the
//! binary and only forwards input here and presents what comes back.

pub mod config;
pub mod constants;
pub mod events;
pub mod panel;
pub mod render;
pub mod settings;
pub mod state;

pub use events::{AppEvent, EventBus, EventPublisher};
pub use settings::{CrosshairSettings, Point, Rgb, ScreenSize, ShapeKind};
pub use state::{Effect, OverlayState};
