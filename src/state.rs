//! Runtime overlay state and the transitions every user action goes through.
//!
//! `OverlayState::apply` is the only mutator the shell calls. It returns an
//! [`Effect`] describing what the window layer has to do afterwards, so the
//! whole state machine stays testable without a window.

use std::path::PathBuf;

use crate::constants::{GROW_FACTOR, SHRINK_DIVISOR};
use crate::events::AppEvent;
use crate::settings::{clamp_radius, CrosshairSettings, Point, ScreenSize};

/// What the shell has to do after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Redraw,
    /// Moving mode changed; update window interactivity and redraw.
    MovingChanged(bool),
    /// Show or hide the overlay window. No redraw.
    SetVisible(bool),
    OpenSettings,
    /// Decode the file; on success call [`OverlayState::use_custom_image`].
    LoadImage(PathBuf),
    /// Defaults restored: drop any decoded custom image, then redraw.
    ResetImage,
    /// Save settings and tear everything down.
    Quit,
}

/// Tracks the last pointer position of an ongoing drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragTracker {
    anchor: Option<Point>,
}

impl DragTracker {
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct OverlayState {
    pub settings: CrosshairSettings,
    pub center: Point,
    pub screen: ScreenSize,
    pub moving: bool,
    pub visible: bool,
    drag: DragTracker,
}

impl OverlayState {
    /// Fresh state with the crosshair in the middle of the screen.
    pub fn new(settings: CrosshairSettings, screen: ScreenSize) -> Self {
        Self {
            settings,
            center: screen.center(),
            screen,
            moving: false,
            visible: true,
            drag: DragTracker::default(),
        }
    }

    pub fn apply(&mut self, event: &AppEvent) -> Effect {
        match event {
            AppEvent::Grow => {
                self.grow();
                Effect::Redraw
            }
            AppEvent::Shrink => {
                self.shrink();
                Effect::Redraw
            }
            AppEvent::Center => {
                self.center = self.screen.center();
                Effect::Redraw
            }
            AppEvent::ToggleMove => {
                self.moving = !self.moving;
                self.drag = DragTracker::default();
                Effect::MovingChanged(self.moving)
            }
            AppEvent::ToggleVisible => {
                self.visible = !self.visible;
                Effect::SetVisible(self.visible)
            }
            AppEvent::OpenSettings => Effect::OpenSettings,
            AppEvent::Quit => Effect::Quit,
            AppEvent::SetKind(kind) => {
                self.settings.kind = *kind;
                Effect::Redraw
            }
            AppEvent::SetRadius(radius) => {
                self.settings.radius = clamp_radius(*radius);
                Effect::Redraw
            }
            AppEvent::SetChannel(channel, value) => {
                self.settings.set_channel(*channel, *value);
                Effect::Redraw
            }
            AppEvent::SetAlpha(alpha) => {
                self.settings.alpha = *alpha;
                Effect::Redraw
            }
            AppEvent::SetDotRadius(radius) => {
                self.settings.dot_radius = *radius;
                self.settings.validate();
                Effect::Redraw
            }
            AppEvent::SetThickness(thickness) => {
                self.settings.thickness = *thickness;
                self.settings.validate();
                Effect::Redraw
            }
            AppEvent::LoadImage(path) => Effect::LoadImage(path.clone()),
            AppEvent::RestoreDefaults => {
                self.settings = CrosshairSettings::default();
                Effect::ResetImage
            }
        }
    }

    /// Radius × 1.4, truncated. No upper cap.
    pub fn grow(&mut self) {
        let grown = (self.settings.radius as f64 * GROW_FACTOR) as i32;
        self.settings.radius = clamp_radius(grown);
    }

    /// Radius ÷ 1.2, truncated, never below the minimum.
    pub fn shrink(&mut self) {
        let shrunk = (self.settings.radius as f64 / SHRINK_DIVISOR) as i32;
        self.settings.radius = clamp_radius(shrunk);
    }

    /// Record a successfully decoded custom image.
    pub fn use_custom_image(&mut self, path: PathBuf) {
        self.settings.image_path = Some(path);
        self.settings.kind = crate::settings::ShapeKind::Image;
    }

    /// Left button pressed on the overlay.
    pub fn begin_drag(&mut self, at: Point) {
        if self.moving {
            self.drag.anchor = Some(at);
        }
    }

    /// Pointer moved with the button held. Returns true if the center moved.
    pub fn drag_to(&mut self, at: Point) -> bool {
        if !self.moving {
            return false;
        }
        let Some(anchor) = self.drag.anchor else {
            return false;
        };

        let dx = at.x - anchor.x;
        let dy = at.y - anchor.y;
        self.drag.anchor = Some(at);

        let radius = self.settings.radius;
        let next = Point::new(
            clamp_axis(self.center.x + dx, radius, self.screen.width),
            clamp_axis(self.center.y + dy, radius, self.screen.height),
        );
        let moved = next != self.center;
        self.center = next;
        moved
    }

    pub fn end_drag(&mut self) {
        self.drag = DragTracker::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Top-left corner of the crosshair bitmap in screen space.
    pub fn crosshair_origin(&self) -> Point {
        let r = clamp_radius(self.settings.radius);
        Point::new(self.center.x - r, self.center.y - r)
    }
}

/// Keep `v` within `[radius, dim - radius]`; the lower bound wins when the
/// range is empty.
fn clamp_axis(v: i32, radius: i32, dim: i32) -> i32 {
    v.min(dim - radius).max(radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Channel, Rgb, ShapeKind};

    fn state() -> OverlayState {
        OverlayState::new(CrosshairSettings::default(), ScreenSize::new(1920, 1080))
    }

    #[test]
    fn starts_centered_visible_and_locked() {
        let s = state();
        assert_eq!(s.center, Point::new(960, 540));
        assert!(s.visible);
        assert!(!s.moving);
    }

    #[test]
    fn grow_truncates_each_step() {
        let mut s = state();
        s.settings.radius = 10;
        let mut expected = 10;
        for _ in 0..5 {
            s.apply(&AppEvent::Grow);
            expected = (expected as f64 * 1.4) as i32;
            assert_eq!(s.settings.radius, expected);
        }
        // 10 -> 14 -> 19 -> 26 -> 36 -> 50
        assert_eq!(s.settings.radius, 50);
    }

    #[test]
    fn shrink_never_reaches_zero() {
        let mut s = state();
        s.settings.radius = 2;
        assert_eq!(s.apply(&AppEvent::Shrink), Effect::Redraw);
        assert_eq!(s.settings.radius, 1);
        s.apply(&AppEvent::Shrink);
        assert_eq!(s.settings.radius, 1);
    }

    #[test]
    fn shrink_truncates() {
        let mut s = state();
        s.settings.radius = 100;
        s.apply(&AppEvent::Shrink);
        assert_eq!(s.settings.radius, 83);
    }

    #[test]
    fn center_resets_point() {
        let mut s = state();
        s.center = Point::new(5, 5);
        assert_eq!(s.apply(&AppEvent::Center), Effect::Redraw);
        assert_eq!(s.center, Point::new(960, 540));
    }

    #[test]
    fn toggle_visible_does_not_redraw() {
        let mut s = state();
        assert_eq!(s.apply(&AppEvent::ToggleVisible), Effect::SetVisible(false));
        assert_eq!(s.apply(&AppEvent::ToggleVisible), Effect::SetVisible(true));
    }

    #[test]
    fn drag_ignored_when_not_moving() {
        let mut s = state();
        s.begin_drag(Point::new(960, 540));
        assert!(!s.drag_to(Point::new(1000, 600)));
        assert_eq!(s.center, Point::new(960, 540));
    }

    #[test]
    fn drag_applies_incremental_deltas() {
        let mut s = state();
        s.apply(&AppEvent::ToggleMove);
        s.begin_drag(Point::new(100, 100));
        assert!(s.drag_to(Point::new(110, 95)));
        assert!(s.drag_to(Point::new(120, 95)));
        assert_eq!(s.center, Point::new(980, 535));
    }

    #[test]
    fn drag_is_clamped_to_screen_minus_radius() {
        let mut s = state();
        s.settings.radius = 20;
        s.apply(&AppEvent::ToggleMove);
        s.begin_drag(Point::new(0, 0));
        s.drag_to(Point::new(-5000, -5000));
        assert_eq!(s.center, Point::new(20, 20));
        s.drag_to(Point::new(5000, 5000));
        assert_eq!(s.center, Point::new(1900, 1060));
    }

    #[test]
    fn toggling_move_off_mid_drag_stops_updates() {
        let mut s = state();
        s.apply(&AppEvent::ToggleMove);
        s.begin_drag(Point::new(0, 0));
        s.drag_to(Point::new(10, 0));
        assert_eq!(s.center, Point::new(970, 540));

        assert_eq!(s.apply(&AppEvent::ToggleMove), Effect::MovingChanged(false));
        assert!(!s.drag_to(Point::new(50, 0)));
        assert_eq!(s.center, Point::new(970, 540));

        // Re-enabling alone does not resume: a new press is needed.
        s.apply(&AppEvent::ToggleMove);
        assert!(!s.drag_to(Point::new(60, 0)));
        s.begin_drag(Point::new(60, 0));
        assert!(s.drag_to(Point::new(70, 0)));
        assert_eq!(s.center, Point::new(980, 540));
    }

    #[test]
    fn restore_defaults_resets_every_field() {
        let mut s = state();
        s.settings = CrosshairSettings {
            radius: 77,
            color: Rgb::new(1, 2, 3),
            alpha: 9,
            kind: ShapeKind::Image,
            dot_radius: 40,
            thickness: 9,
            image_path: Some(PathBuf::from("c:/x.png")),
        };
        assert_eq!(s.apply(&AppEvent::RestoreDefaults), Effect::ResetImage);
        assert_eq!(s.settings, CrosshairSettings::default());
    }

    #[test]
    fn image_kind_after_restore_has_no_path() {
        let mut s = state();
        s.use_custom_image(PathBuf::from("aim.png"));
        assert_eq!(s.apply(&AppEvent::RestoreDefaults), Effect::ResetImage);

        // Picking "image" again must not bring the old file back.
        assert_eq!(s.apply(&AppEvent::SetKind(ShapeKind::Image)), Effect::Redraw);
        assert_eq!(s.settings.kind, ShapeKind::Image);
        assert!(s.settings.image_path.is_none());
    }

    #[test]
    fn grow_is_not_capped_by_the_slider_range() {
        let mut s = state();
        s.apply(&AppEvent::SetRadius(400));
        s.apply(&AppEvent::Grow);
        assert_eq!(s.settings.radius, 560);
    }

    #[test]
    fn panel_setters_update_fields() {
        let mut s = state();
        s.apply(&AppEvent::SetKind(ShapeKind::Cross));
        s.apply(&AppEvent::SetRadius(0));
        s.apply(&AppEvent::SetChannel(Channel::Blue, 200));
        s.apply(&AppEvent::SetAlpha(128));
        s.apply(&AppEvent::SetThickness(0));
        assert_eq!(s.settings.kind, ShapeKind::Cross);
        assert_eq!(s.settings.radius, 1);
        assert_eq!(s.settings.color, Rgb::new(255, 0, 200));
        assert_eq!(s.settings.alpha, 128);
        assert_eq!(s.settings.thickness, 1);
    }

    #[test]
    fn load_image_is_deferred_to_the_shell() {
        let mut s = state();
        let path = PathBuf::from("aim.png");
        assert_eq!(
            s.apply(&AppEvent::LoadImage(path.clone())),
            Effect::LoadImage(path.clone())
        );
        assert!(s.settings.image_path.is_none());

        s.use_custom_image(path.clone());
        assert_eq!(s.settings.image_path, Some(path));
        assert_eq!(s.settings.kind, ShapeKind::Image);
    }

    #[test]
    fn origin_is_center_minus_radius() {
        let mut s = state();
        s.settings.radius = 10;
        assert_eq!(s.crosshair_origin(), Point::new(950, 530));
    }
}
