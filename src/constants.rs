//! Built-in defaults, slider ranges and fixed sizes.

// ── Defaults (also what "Restore Default Crosshair" resets to) ──────────────

pub const DEFAULT_RADIUS: i32 = 3;
pub const DEFAULT_COLOR: (u8, u8, u8) = (255, 0, 0);
pub const DEFAULT_ALPHA: u8 = 255;
pub const DEFAULT_DOT_RADIUS: i32 = 5;
pub const DEFAULT_THICKNESS: i32 = 3;

// ── Ranges ──────────────────────────────────────────────────────────────────
// MIN_* hold everywhere. MAX_* only bound the panel sliders; grow and the
// settings file can go past them.

/// Radius never drops below this, so the bitmap is at least 2x2.
pub const MIN_RADIUS: i32 = 1;
pub const MAX_RADIUS: i32 = 500;

pub const MIN_DOT_RADIUS: i32 = 1;
pub const MAX_DOT_RADIUS: i32 = 50;

pub const MIN_THICKNESS: i32 = 1;
pub const MAX_THICKNESS: i32 = 10;

/// Ring width of the red-dot shape.
pub const RING_WIDTH: i32 = 2;

// ── Tray size steps ─────────────────────────────────────────────────────────

pub const GROW_FACTOR: f64 = 1.4;
pub const SHRINK_DIVISOR: f64 = 1.2;

// ── Startup splash ──────────────────────────────────────────────────────────

pub const SPLASH_FILE_NAME: &str = "startup_image.png";
pub const SPLASH_WIDTH: u32 = 800;
pub const SPLASH_HEIGHT: u32 = 200;
pub const SPLASH_DURATION_MS: u32 = 3000;
/// Gap between the caption baseline box and the splash bottom edge.
pub const SPLASH_CAPTION_MARGIN: i32 = 10;

// ── Settings file ───────────────────────────────────────────────────────────

pub const CONFIG_DIR_NAME: &str = "Crosshair";
pub const CONFIG_FILE_NAME: &str = "crosshair_config.json";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
