//! The crosshair record and the small value types around it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// One color channel, as addressed by the panel sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// Which marker gets drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Circle,
    Cross,
    /// Outlined ring with a filled dot in the middle.
    RedDot,
    /// User-supplied image scaled to the crosshair square.
    Image,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Cross,
        ShapeKind::RedDot,
        ShapeKind::Image,
    ];

    /// Name used in the settings file and the dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Cross => "cross",
            ShapeKind::RedDot => "red_dot",
            ShapeKind::Image => "image",
        }
    }
}

/// Screen-space point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Primary screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

/// Everything that is persisted between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CrosshairSettings {
    pub radius: i32,
    pub color: Rgb,
    pub alpha: u8,
    pub kind: ShapeKind,
    pub dot_radius: i32,
    pub thickness: i32,
    pub image_path: Option<PathBuf>,
}

impl Default for CrosshairSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            color: Rgb::new(DEFAULT_COLOR.0, DEFAULT_COLOR.1, DEFAULT_COLOR.2),
            alpha: DEFAULT_ALPHA,
            kind: ShapeKind::Circle,
            dot_radius: DEFAULT_DOT_RADIUS,
            thickness: DEFAULT_THICKNESS,
            image_path: None,
        }
    }
}

impl CrosshairSettings {
    /// Raises numeric fields to their minimum. Large values pass through.
    pub fn validate(&mut self) {
        self.radius = clamp_radius(self.radius);
        self.dot_radius = self.dot_radius.max(MIN_DOT_RADIUS);
        self.thickness = self.thickness.max(MIN_THICKNESS);
    }

    /// Side of the square crosshair bitmap.
    pub fn diameter(&self) -> u32 {
        (clamp_radius(self.radius) * 2) as u32
    }

    pub fn set_channel(&mut self, channel: Channel, value: u8) {
        match channel {
            Channel::Red => self.color.r = value,
            Channel::Green => self.color.g = value,
            Channel::Blue => self.color.b = value,
        }
    }

    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.color.r,
            Channel::Green => self.color.g,
            Channel::Blue => self.color.b,
        }
    }

    /// RGBA tuple used by the rasterizer.
    pub fn rgba(&self) -> [u8; 4] {
        [self.color.r, self.color.g, self.color.b, self.alpha]
    }
}

/// Lower bound only.
pub fn clamp_radius(radius: i32) -> i32 {
    radius.max(MIN_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = CrosshairSettings::default();
        assert_eq!(s.radius, 3);
        assert_eq!(s.color, Rgb::new(255, 0, 0));
        assert_eq!(s.alpha, 255);
        assert_eq!(s.kind, ShapeKind::Circle);
        assert_eq!(s.dot_radius, 5);
        assert_eq!(s.thickness, 3);
        assert!(s.image_path.is_none());
    }

    #[test]
    fn validate_raises_values_below_minimum() {
        let mut s = CrosshairSettings {
            radius: -4,
            dot_radius: 0,
            thickness: 0,
            ..Default::default()
        };
        s.validate();
        assert_eq!(s.radius, MIN_RADIUS);
        assert_eq!(s.dot_radius, MIN_DOT_RADIUS);
        assert_eq!(s.thickness, MIN_THICKNESS);
    }

    #[test]
    fn validate_keeps_values_above_slider_range() {
        let mut s = CrosshairSettings {
            radius: 600,
            dot_radius: 80,
            thickness: 20,
            ..Default::default()
        };
        s.validate();
        assert_eq!(s.radius, 600);
        assert_eq!(s.dot_radius, 80);
        assert_eq!(s.thickness, 20);
    }

    #[test]
    fn shape_names_match_serde_names() {
        for kind in ShapeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn channel_accessors_address_one_component() {
        let mut s = CrosshairSettings::default();
        s.set_channel(Channel::Green, 128);
        assert_eq!(s.color, Rgb::new(255, 128, 0));
        assert_eq!(s.channel(Channel::Green), 128);
    }

    #[test]
    fn screen_center_rounds_down() {
        assert_eq!(ScreenSize::new(1921, 1081).center(), Point::new(960, 540));
    }
}
