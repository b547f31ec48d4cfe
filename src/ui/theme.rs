use windows::Win32::Foundation::COLORREF;

// ── Colors (COLORREF is 0x00BBGGRR) ──────────────────────────────────────────

/// Panel background, near-black slate #15171C
pub const CLR_BACKGROUND: COLORREF = COLORREF(0x001C1715);

/// Primary text #F1F3F5
pub const CLR_FOREGROUND: COLORREF = COLORREF(0x00F5F3F1);

/// Dropdown, tracks and idle buttons #262A33
pub const CLR_SURFACE: COLORREF = COLORREF(0x00332A26);

/// Hovered buttons and the open dropdown list #323845
pub const CLR_SURFACE_HOVER: COLORREF = COLORREF(0x00453832);

/// Labels and secondary text #9AA3B2
pub const CLR_MUTED_FG: COLORREF = COLORREF(0x00B2A39A);

/// Crosshair red #E5383B
pub const CLR_ACCENT: COLORREF = COLORREF(0x003B38E5);

pub const CLR_BORDER: COLORREF = COLORREF(0x00413A36);

/// Corner radius for the dropdown and buttons
pub const CORNER_RADIUS: i32 = 6;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub const FONT_SIZE_TITLE: i32 = -18;
pub const FONT_SIZE_LABEL: i32 = -12;
pub const FONT_SIZE_SMALL: i32 = -11;

pub const FONT_NAME: &str = "Segoe UI";
