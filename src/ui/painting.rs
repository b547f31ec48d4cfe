// GDI owner-draw rendering of the settings panel laid out by `crosshair::panel`

use super::theme::*;
use crosshair::constants::APP_VERSION;
use crosshair::panel::{
    PanelState, Rect, SliderState, CONTENT_WIDTH, LABEL_HEIGHT, PADDING, THUMB_RADIUS,
};
use crosshair::ShapeKind;
use windows::Win32::Foundation::{COLORREF, RECT, SIZE};
use windows::Win32::Graphics::Gdi::*;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn create_font(size: i32, weight: i32) -> HFONT {
    let face: Vec<u16> = FONT_NAME.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        let mut lf = LOGFONTW {
            lfHeight: size,
            lfWeight: weight,
            lfQuality: CLEARTYPE_QUALITY,
            lfCharSet: DEFAULT_CHARSET,
            ..Default::default()
        };
        let len = face.len().min(lf.lfFaceName.len());
        lf.lfFaceName[..len].copy_from_slice(&face[..len]);
        CreateFontIndirectW(&lf)
    }
}

fn fill(hdc: HDC, r: &RECT, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        FillRect(hdc, r, brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
    }
}

fn rounded(hdc: HDC, r: &Rect, radius: i32, fill: COLORREF, border: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(fill);
        let pen = CreatePen(PS_SOLID, 1, border);
        let old_brush = SelectObject(hdc, HGDIOBJ::from(brush));
        let old_pen = SelectObject(hdc, HGDIOBJ::from(pen));
        let _ = RoundRect(hdc, r.left, r.top, r.right, r.bottom, radius, radius);
        SelectObject(hdc, old_pen);
        SelectObject(hdc, old_brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
        let _ = DeleteObject(HGDIOBJ::from(pen));
    }
}

fn text(hdc: HDC, s: &str, x: i32, y: i32, color: COLORREF, font: HFONT) {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        SetTextColor(hdc, color);
        SetBkMode(hdc, TRANSPARENT);
        let wide: Vec<u16> = s.encode_utf16().collect();
        let _ = TextOutW(hdc, x, y, &wide);
        SelectObject(hdc, old_font);
    }
}

fn measure(hdc: HDC, s: &str, font: HFONT) -> (i32, i32) {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        let wide: Vec<u16> = s.encode_utf16().collect();
        let mut size = SIZE::default();
        let _ = GetTextExtentPoint32W(hdc, &wide, &mut size);
        SelectObject(hdc, old_font);
        (size.cx, size.cy)
    }
}

/// Text centered in `r`.
fn text_centered(hdc: HDC, s: &str, r: &Rect, color: COLORREF, font: HFONT) {
    let (w, h) = measure(hdc, s, font);
    text(
        hdc,
        s,
        r.left + (r.width() - w) / 2,
        r.top + (r.height() - h) / 2,
        color,
        font,
    );
}

fn disc(hdc: HDC, cx: i32, cy: i32, r: i32, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        let pen = CreatePen(PS_SOLID, 0, color);
        let old_brush = SelectObject(hdc, HGDIOBJ::from(brush));
        let old_pen = SelectObject(hdc, HGDIOBJ::from(pen));
        let _ = Ellipse(hdc, cx - r, cy - r, cx + r, cy + r);
        SelectObject(hdc, old_pen);
        SelectObject(hdc, old_brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
        let _ = DeleteObject(HGDIOBJ::from(pen));
    }
}

// ── Font cache ──────────────────────────────────────────────────────────────

struct Fonts {
    title: HFONT,
    label: HFONT,
    label_bold: HFONT,
    small: HFONT,
}

impl Fonts {
    fn create() -> Self {
        Self {
            title: create_font(FONT_SIZE_TITLE, 600),
            label: create_font(FONT_SIZE_LABEL, 400),
            label_bold: create_font(FONT_SIZE_LABEL, 600),
            small: create_font(FONT_SIZE_SMALL, 400),
        }
    }

    fn destroy(&self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ::from(self.title));
            let _ = DeleteObject(HGDIOBJ::from(self.label));
            let _ = DeleteObject(HGDIOBJ::from(self.label_bold));
            let _ = DeleteObject(HGDIOBJ::from(self.small));
        }
    }
}

// ── Main paint function ─────────────────────────────────────────────────────

pub fn paint(hdc: HDC, client: &RECT, panel: &PanelState) {
    fill(hdc, client, CLR_BACKGROUND);

    let fonts = Fonts::create();

    draw_title(hdc, &fonts);
    draw_dropdown(hdc, panel, &fonts);
    for slider in panel.visible_sliders() {
        draw_slider(hdc, slider, &fonts);
    }
    if let Some(y) = panel.extra_heading_y {
        text(
            hdc,
            "Additional settings",
            PADDING,
            y,
            CLR_FOREGROUND,
            fonts.label_bold,
        );
    }
    draw_buttons(hdc, panel, &fonts);

    // Last, so the open list covers the sliders below it.
    if panel.dropdown.open {
        draw_dropdown_list(hdc, panel, &fonts);
    }

    fonts.destroy();
}

// ── Section renderers ───────────────────────────────────────────────────────

fn draw_title(hdc: HDC, fonts: &Fonts) {
    text(
        hdc,
        "Crosshair Settings",
        PADDING,
        PADDING,
        CLR_FOREGROUND,
        fonts.title,
    );

    let version = format!("v{APP_VERSION}");
    let (w, _) = measure(hdc, &version, fonts.small);
    text(
        hdc,
        &version,
        PADDING + CONTENT_WIDTH - w,
        PADDING + 6,
        CLR_MUTED_FG,
        fonts.small,
    );
}

fn draw_dropdown(hdc: HDC, panel: &PanelState, fonts: &Fonts) {
    let r = &panel.dropdown.rect;
    text(
        hdc,
        "Crosshair type",
        r.left,
        r.top - LABEL_HEIGHT,
        CLR_MUTED_FG,
        fonts.label,
    );

    let border = if panel.dropdown.open {
        CLR_ACCENT
    } else {
        CLR_BORDER
    };
    rounded(hdc, r, CORNER_RADIUS, CLR_SURFACE, border);

    let (_, h) = measure(hdc, "Ag", fonts.label);
    text(
        hdc,
        panel.dropdown.selected.as_str(),
        r.left + 10,
        r.top + (r.height() - h) / 2,
        CLR_FOREGROUND,
        fonts.label,
    );

    // Caret
    let cx = r.right - 16;
    let cy = r.top + r.height() / 2;
    unsafe {
        let pen = CreatePen(PS_SOLID, 2, CLR_MUTED_FG);
        let old_pen = SelectObject(hdc, HGDIOBJ::from(pen));
        let _ = MoveToEx(hdc, cx - 5, cy - 2, None);
        let _ = LineTo(hdc, cx, cy + 3);
        let _ = LineTo(hdc, cx + 5, cy - 2);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(HGDIOBJ::from(pen));
    }
}

fn draw_dropdown_list(hdc: HDC, panel: &PanelState, fonts: &Fonts) {
    let rects = &panel.dropdown.option_rects;
    let outer = Rect::new(
        rects[0].left,
        rects[0].top,
        rects[rects.len() - 1].right,
        rects[rects.len() - 1].bottom,
    );
    rounded(hdc, &outer, CORNER_RADIUS, CLR_SURFACE_HOVER, CLR_BORDER);

    let (_, h) = measure(hdc, "Ag", fonts.label);
    for (kind, r) in ShapeKind::ALL.iter().zip(rects.iter()) {
        let color = if *kind == panel.dropdown.selected {
            CLR_ACCENT
        } else {
            CLR_FOREGROUND
        };
        text(
            hdc,
            kind.as_str(),
            r.left + 10,
            r.top + (r.height() - h) / 2,
            color,
            fonts.label,
        );
    }
}

fn draw_slider(hdc: HDC, slider: &SliderState, fonts: &Fonts) {
    let track = &slider.rect;
    let label_y = track.top - LABEL_HEIGHT;

    text(
        hdc,
        slider.id.label(),
        track.left,
        label_y,
        CLR_MUTED_FG,
        fonts.label,
    );
    let value = slider.value.to_string();
    let (vw, _) = measure(hdc, &value, fonts.label_bold);
    text(
        hdc,
        &value,
        track.right - vw,
        label_y,
        CLR_FOREGROUND,
        fonts.label_bold,
    );

    rounded(hdc, track, track.height(), CLR_SURFACE, CLR_SURFACE);

    let thumb_x = slider.thumb_x();
    if thumb_x > track.left {
        let filled = Rect::new(track.left, track.top, thumb_x, track.bottom);
        rounded(hdc, &filled, track.height(), CLR_ACCENT, CLR_ACCENT);
    }

    disc(
        hdc,
        thumb_x,
        track.top + track.height() / 2,
        THUMB_RADIUS,
        CLR_FOREGROUND,
    );
}

fn draw_buttons(hdc: HDC, panel: &PanelState, fonts: &Fonts) {
    for button in &panel.buttons {
        let (bg, border) = if button.hover {
            (CLR_SURFACE_HOVER, CLR_ACCENT)
        } else {
            (CLR_SURFACE, CLR_BORDER)
        };
        rounded(hdc, &button.rect, CORNER_RADIUS, bg, border);
        text_centered(
            hdc,
            panel.button_label(button.id),
            &button.rect,
            CLR_FOREGROUND,
            fonts.label_bold,
        );
    }
}

