//! Rasterizing the crosshair and composing the full-screen frame.
//!
//! Everything here works on plain pixel buffers. The overlay hands the
//! finished [`Frame`] (premultiplied BGRA, top-down) to `UpdateLayeredWindow`.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::constants::{RING_WIDTH, SPLASH_HEIGHT, SPLASH_WIDTH};
use crate::settings::{clamp_radius, CrosshairSettings, Point, ShapeKind};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode an image file into RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, RenderError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| RenderError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Produce the `2r × 2r` crosshair bitmap for the current settings.
///
/// `Image` without a loaded image falls back to the circle. `custom` is
/// ignored unless the settings still name an image file.
pub fn render_crosshair(settings: &CrosshairSettings, custom: Option<&RgbaImage>) -> RgbaImage {
    let custom = custom.filter(|_| settings.image_path.is_some());
    let side = settings.diameter();
    let radius = clamp_radius(settings.radius);
    let color = Rgba(settings.rgba());

    match (settings.kind, custom) {
        (ShapeKind::Image, Some(img)) => {
            let mut scaled = imageops::resize(img, side, side, FilterType::Lanczos3);
            for px in scaled.pixels_mut() {
                px.0[3] = settings.alpha;
            }
            scaled
        }
        (ShapeKind::Circle, _) | (ShapeKind::Image, None) => {
            let mut img = RgbaImage::new(side, side);
            fill_disc(&mut img, radius as f32, color);
            img
        }
        (ShapeKind::Cross, _) => {
            let mut img = RgbaImage::new(side, side);
            draw_cross(&mut img, radius, settings.thickness, color);
            img
        }
        (ShapeKind::RedDot, _) => {
            let mut img = RgbaImage::new(side, side);
            draw_ring(&mut img, radius as f32, RING_WIDTH as f32, color);
            fill_disc(&mut img, settings.dot_radius as f32, color);
            img
        }
    }
}

/// Squared distance from the center of pixel (x, y) to the bitmap center.
fn dist_sq(x: u32, y: u32, center: f32) -> f32 {
    let dx = x as f32 + 0.5 - center;
    let dy = y as f32 + 0.5 - center;
    dx * dx + dy * dy
}

/// Disc of radius `r` centered in the (square) image.
fn fill_disc(img: &mut RgbaImage, r: f32, color: Rgba<u8>) {
    let center = img.width() as f32 / 2.0;
    let r_sq = r * r;
    for (x, y, px) in img.enumerate_pixels_mut() {
        if dist_sq(x, y, center) <= r_sq {
            *px = color;
        }
    }
}

/// Ring touching the image edge, `width` pixels thick.
fn draw_ring(img: &mut RgbaImage, r: f32, width: f32, color: Rgba<u8>) {
    let center = img.width() as f32 / 2.0;
    let outer = r * r;
    let inner_r = (r - width).max(0.0);
    let inner = inner_r * inner_r;
    for (x, y, px) in img.enumerate_pixels_mut() {
        let d = dist_sq(x, y, center);
        if d <= outer && d >= inner {
            *px = color;
        }
    }
}

/// One vertical and one horizontal bar of `thickness` through the center.
fn draw_cross(img: &mut RgbaImage, radius: i32, thickness: i32, color: Rgba<u8>) {
    let side = img.width() as i32;
    let start = radius - thickness / 2;
    let band = start.max(0)..(start + thickness).min(side);
    for (x, y, px) in img.enumerate_pixels_mut() {
        if band.contains(&(x as i32)) || band.contains(&(y as i32)) {
            *px = color;
        }
    }
}

/// Resize the splash picture to its fixed on-screen size.
pub fn prepare_splash(img: &RgbaImage) -> RgbaImage {
    imageops::resize(img, SPLASH_WIDTH, SPLASH_HEIGHT, FilterType::Lanczos3)
}

/// Paint `color` onto `img` through an 8-bit coverage mask of the same size.
///
/// Used for the splash caption, whose glyph coverage comes from GDI.
pub fn stamp_mask(img: &mut RgbaImage, mask: &[u8], color: [u8; 3]) {
    if mask.len() != (img.width() * img.height()) as usize {
        log::warn!("Caption mask size mismatch, skipping caption");
        return;
    }
    for (px, &coverage) in img.pixels_mut().zip(mask) {
        if coverage == 0 {
            continue;
        }
        let a = coverage as u32;
        for i in 0..3 {
            px.0[i] = ((color[i] as u32 * a + px.0[i] as u32 * (255 - a)) / 255) as u8;
        }
        px.0[3] = px.0[3].max(coverage);
    }
}

/// The tray icon: a red cross on black.
pub fn tray_icon(size: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 255]));
    let lo = size / 4;
    let hi = size - size / 4;
    let half_width = (size / 32).max(1);
    let mid = size / 2;
    let red = Rgba([255, 0, 0, 255]);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let on_vertical = x + half_width >= mid && x < mid + half_width && (lo..hi).contains(&y);
        let on_horizontal = y + half_width >= mid && y < mid + half_width && (lo..hi).contains(&x);
        if on_vertical || on_horizontal {
            *px = red;
        }
    }
    img
}

/// Full-screen premultiplied BGRA buffer, top-down rows.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Back to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// BGRA at (x, y), or None outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Source-over `img` with its top-left at `origin`, clipped to the frame.
    pub fn blit(&mut self, img: &RgbaImage, origin: Point) {
        let (fw, fh) = (self.width as i64, self.height as i64);
        for (x, y, src) in img.enumerate_pixels() {
            let fx = origin.x as i64 + x as i64;
            let fy = origin.y as i64 + y as i64;
            if fx < 0 || fy < 0 || fx >= fw || fy >= fh {
                continue;
            }
            let [r, g, b, a] = src.0;
            if a == 0 {
                continue;
            }
            let i = ((fy * fw + fx) * 4) as usize;
            let a32 = a as u32;
            let inv = 255 - a32;
            let dst = &mut self.pixels[i..i + 4];
            let premul = |c: u8| (c as u32 * a32 + 127) / 255;
            dst[0] = (premul(b) + (dst[0] as u32 * inv + 127) / 255) as u8;
            dst[1] = (premul(g) + (dst[1] as u32 * inv + 127) / 255) as u8;
            dst[2] = (premul(r) + (dst[2] as u32 * inv + 127) / 255) as u8;
            dst[3] = (a32 + (dst[3] as u32 * inv + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Rgb;

    fn settings(kind: ShapeKind, radius: i32) -> CrosshairSettings {
        CrosshairSettings {
            kind,
            radius,
            ..Default::default()
        }
    }

    fn alpha_at(img: &RgbaImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[3]
    }

    #[test]
    fn bitmap_side_is_twice_the_radius() {
        for kind in ShapeKind::ALL {
            let img = render_crosshair(&settings(kind, 12), None);
            assert_eq!(img.dimensions(), (24, 24));
        }
    }

    #[test]
    fn zero_radius_still_renders_minimum_bitmap() {
        let img = render_crosshair(&settings(ShapeKind::Circle, 0), None);
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[test]
    fn circle_fills_center_not_corners() {
        let mut s = settings(ShapeKind::Circle, 10);
        s.alpha = 200;
        s.color = Rgb::new(10, 20, 30);
        let img = render_crosshair(&s, None);
        assert_eq!(img.get_pixel(10, 10).0, [10, 20, 30, 200]);
        assert_eq!(alpha_at(&img, 0, 0), 0);
        assert_eq!(alpha_at(&img, 19, 19), 0);
    }

    #[test]
    fn cross_draws_bars_through_center() {
        let mut s = settings(ShapeKind::Cross, 10);
        s.thickness = 3;
        let img = render_crosshair(&s, None);
        // vertical bar at columns 9..12, all rows
        assert_eq!(alpha_at(&img, 10, 0), 255);
        assert_eq!(alpha_at(&img, 9, 19), 255);
        assert_eq!(alpha_at(&img, 11, 5), 255);
        assert_eq!(alpha_at(&img, 12, 5), 0);
        // horizontal bar
        assert_eq!(alpha_at(&img, 0, 10), 255);
        assert_eq!(alpha_at(&img, 0, 0), 0);
    }

    #[test]
    fn red_dot_has_ring_gap_and_dot() {
        let mut s = settings(ShapeKind::RedDot, 20);
        s.dot_radius = 4;
        let img = render_crosshair(&s, None);
        // ring on the edge (left middle)
        assert_eq!(alpha_at(&img, 0, 20), 255);
        // gap between ring and dot
        assert_eq!(alpha_at(&img, 8, 20), 0);
        // dot in the middle
        assert_eq!(alpha_at(&img, 20, 20), 255);
        // outside the ring in the corner
        assert_eq!(alpha_at(&img, 0, 0), 0);
    }

    #[test]
    fn image_kind_without_image_falls_back_to_circle() {
        let img = render_crosshair(&settings(ShapeKind::Image, 8), None);
        let circle = render_crosshair(&settings(ShapeKind::Circle, 8), None);
        assert_eq!(img, circle);
    }

    #[test]
    fn custom_image_is_scaled_and_alpha_forced() {
        let source = RgbaImage::from_pixel(5, 7, Rgba([0, 255, 0, 10]));
        let mut s = settings(ShapeKind::Image, 16);
        s.alpha = 99;
        s.image_path = Some("aim.png".into());
        let img = render_crosshair(&s, Some(&source));
        assert_eq!(img.dimensions(), (32, 32));
        assert!(img.pixels().all(|p| p.0[3] == 99));
    }

    #[test]
    fn stale_image_is_ignored_without_a_path() {
        let source = RgbaImage::from_pixel(5, 5, Rgba([0, 255, 0, 255]));
        let img = render_crosshair(&settings(ShapeKind::Image, 8), Some(&source));
        let circle = render_crosshair(&settings(ShapeKind::Circle, 8), None);
        assert_eq!(img, circle);
    }

    #[test]
    fn blit_premultiplies_and_clips() {
        let mut frame = Frame::new(4, 4);
        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 128]));
        frame.blit(&img, Point::new(3, -1));

        // only (3, 0) lands inside
        assert_eq!(frame.pixel(3, 0), Some([0, 0, 128, 128]));
        assert_eq!(frame.pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(3, 1), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn blit_over_existing_content() {
        let mut frame = Frame::new(1, 1);
        frame.blit(&RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255])), Point::new(0, 0));
        frame.blit(&RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])), Point::new(0, 0));
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut frame = Frame::new(2, 2);
        frame.blit(&RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])), Point::new(0, 0));
        frame.clear();
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn stamp_mask_blends_by_coverage() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        stamp_mask(&mut img, &[255, 0], [255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn stamp_mask_ignores_wrong_size() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        stamp_mask(&mut img, &[255], [255, 255, 255]);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn tray_icon_has_red_center_and_black_corner() {
        let icon = tray_icon(32);
        assert_eq!(icon.get_pixel(16, 16).0, [255, 0, 0, 255]);
        assert_eq!(icon.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn splash_is_resized_to_fixed_size() {
        let splash = prepare_splash(&RgbaImage::new(40, 10));
        assert_eq!(splash.dimensions(), (SPLASH_WIDTH, SPLASH_HEIGHT));
    }

    #[test]
    fn load_image_reports_missing_file() {
        let err = load_image(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("here.png"));
    }
}
