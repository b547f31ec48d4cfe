//! Startup splash: `startup_image.png` beside the executable, captioned with
//! the version and shown centered until the splash timer fires.

use std::path::PathBuf;

use crosshair::constants::{
    APP_VERSION, SPLASH_CAPTION_MARGIN, SPLASH_FILE_NAME, SPLASH_HEIGHT, SPLASH_WIDTH,
};
use crosshair::render;
use crosshair::Point;
use image::RgbaImage;
use windows::Win32::Foundation::{COLORREF, E_FAIL, SIZE};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, CreateFontIndirectW, DeleteDC, DeleteObject, GdiFlush,
    GetTextExtentPoint32W, SelectObject, SetBkMode, SetTextColor, TextOutW, ANTIALIASED_QUALITY,
    BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DEFAULT_CHARSET, DIB_RGB_COLORS, HGDIOBJ, LOGFONTW,
    TRANSPARENT,
};

const CAPTION_FONT: &str = "Arial";
const CAPTION_FONT_SIZE: i32 = -24;

pub struct Splash {
    pub image: RgbaImage,
    /// Top-left corner on screen.
    pub origin: Point,
}

fn splash_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(SPLASH_FILE_NAME))
}

/// Load and caption the splash centered on `center`. None when the file is
/// absent or unreadable; the crosshair is then shown right away.
pub fn load(center: Point) -> Option<Splash> {
    let path = splash_path()?;
    if !path.exists() {
        log::debug!("No splash image at {}", path.display());
        return None;
    }

    let source = match render::load_image(&path) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("{e}");
            return None;
        }
    };
    let mut image = render::prepare_splash(&source);

    let caption = format!("Version: {APP_VERSION}");
    match caption_mask(&caption, SPLASH_WIDTH, SPLASH_HEIGHT) {
        Ok(mask) => render::stamp_mask(&mut image, &mask, [255, 255, 255]),
        Err(e) => log::warn!("Failed to draw splash caption: {e}"),
    }

    let origin = Point::new(
        center.x - SPLASH_WIDTH as i32 / 2,
        center.y - SPLASH_HEIGHT as i32 / 2,
    );
    Some(Splash { image, origin })
}

/// Rasterize `text` with GDI, centered horizontally near the bottom edge,
/// and return one coverage byte per pixel.
fn caption_mask(text: &str, width: u32, height: u32) -> windows::core::Result<Vec<u8>> {
    let (w, h) = (width as i32, height as i32);
    let wide: Vec<u16> = text.encode_utf16().collect();
    let face: Vec<u16> = CAPTION_FONT.encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let dc = CreateCompatibleDC(None);
        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: w,
                biHeight: -h,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut bits: *mut std::ffi::c_void = std::ptr::null_mut();
        let bitmap = match CreateDIBSection(Some(dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0) {
            Ok(bitmap) if !bits.is_null() => bitmap,
            Ok(bitmap) => {
                let _ = DeleteObject(bitmap.into());
                let _ = DeleteDC(dc);
                return Err(E_FAIL.into());
            }
            Err(e) => {
                let _ = DeleteDC(dc);
                return Err(e);
            }
        };
        let old_bitmap = SelectObject(dc, bitmap.into());

        let mut lf = LOGFONTW {
            lfHeight: CAPTION_FONT_SIZE,
            lfWeight: 400,
            lfQuality: ANTIALIASED_QUALITY,
            lfCharSet: DEFAULT_CHARSET,
            ..Default::default()
        };
        let len = face.len().min(lf.lfFaceName.len());
        lf.lfFaceName[..len].copy_from_slice(&face[..len]);
        let font = CreateFontIndirectW(&lf);
        let old_font = SelectObject(dc, HGDIOBJ::from(font));

        SetTextColor(dc, COLORREF(0x00FFFFFF));
        SetBkMode(dc, TRANSPARENT);
        let mut extent = SIZE::default();
        let _ = GetTextExtentPoint32W(dc, &wide, &mut extent);
        let x = (w - extent.cx) / 2;
        let y = h - extent.cy - SPLASH_CAPTION_MARGIN;
        let _ = TextOutW(dc, x, y, &wide);
        let _ = GdiFlush();

        // White text on black: any channel is the coverage.
        let pixels = std::slice::from_raw_parts(bits as *const u8, (w * h * 4) as usize);
        let mask = pixels
            .chunks_exact(4)
            .map(|bgra| bgra[0].max(bgra[1]).max(bgra[2]))
            .collect();

        SelectObject(dc, old_font);
        SelectObject(dc, old_bitmap);
        let _ = DeleteObject(HGDIOBJ::from(font));
        let _ = DeleteObject(bitmap.into());
        let _ = DeleteDC(dc);
        Ok(mask)
    }
}
