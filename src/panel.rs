//! Settings panel model: control state, layout and hit-testing.
//!
//! The Windows window in `ui` only paints what is laid out here and forwards
//! mouse input; every decision about which control was hit and what event it
//! produces lives in this module.

use crate::constants::*;
use crate::events::AppEvent;
use crate::settings::{Channel, CrosshairSettings, ShapeKind};
use crate::state::OverlayState;

// ── Dimensions ───────────────────────────────────────────────────────────────

pub const PANEL_WIDTH: i32 = 340;
pub const PANEL_HEIGHT: i32 = 640;
pub const PADDING: i32 = 20;
pub const CONTENT_WIDTH: i32 = PANEL_WIDTH - 2 * PADDING;
pub const TITLE_HEIGHT: i32 = 40;
pub const DROPDOWN_HEIGHT: i32 = 30;
/// Label line above each slider track.
pub const LABEL_HEIGHT: i32 = 18;
pub const TRACK_HEIGHT: i32 = 8;
pub const THUMB_RADIUS: i32 = 8;
pub const SLIDER_ROW_HEIGHT: i32 = 46;
pub const SECTION_GAP: i32 = 16;
pub const BUTTON_HEIGHT: i32 = 32;
pub const BUTTON_GAP: i32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderId {
    Size,
    Red,
    Green,
    Blue,
    Alpha,
    DotRadius,
    Thickness,
}

impl SliderId {
    pub fn label(self) -> &'static str {
        match self {
            SliderId::Size => "Size",
            SliderId::Red => "Red",
            SliderId::Green => "Green",
            SliderId::Blue => "Blue",
            SliderId::Alpha => "Transparency",
            SliderId::DotRadius => "Dot radius",
            SliderId::Thickness => "Thickness",
        }
    }

    pub fn range(self) -> (i32, i32) {
        match self {
            SliderId::Size => (MIN_RADIUS, MAX_RADIUS),
            SliderId::Red | SliderId::Green | SliderId::Blue | SliderId::Alpha => (0, 255),
            SliderId::DotRadius => (MIN_DOT_RADIUS, MAX_DOT_RADIUS),
            SliderId::Thickness => (MIN_THICKNESS, MAX_THICKNESS),
        }
    }

    fn value_in(self, settings: &CrosshairSettings) -> i32 {
        match self {
            SliderId::Size => settings.radius,
            SliderId::Red => settings.channel(Channel::Red) as i32,
            SliderId::Green => settings.channel(Channel::Green) as i32,
            SliderId::Blue => settings.channel(Channel::Blue) as i32,
            SliderId::Alpha => settings.alpha as i32,
            SliderId::DotRadius => settings.dot_radius,
            SliderId::Thickness => settings.thickness,
        }
    }

    fn event(self, value: i32) -> AppEvent {
        let byte = value.clamp(0, 255) as u8;
        match self {
            SliderId::Size => AppEvent::SetRadius(value),
            SliderId::Red => AppEvent::SetChannel(Channel::Red, byte),
            SliderId::Green => AppEvent::SetChannel(Channel::Green, byte),
            SliderId::Blue => AppEvent::SetChannel(Channel::Blue, byte),
            SliderId::Alpha => AppEvent::SetAlpha(byte),
            SliderId::DotRadius => AppEvent::SetDotRadius(value),
            SliderId::Thickness => AppEvent::SetThickness(value),
        }
    }
}

/// Sliders shown for every shape, top to bottom.
pub const COMMON_SLIDERS: [SliderId; 5] = [
    SliderId::Size,
    SliderId::Red,
    SliderId::Green,
    SliderId::Blue,
    SliderId::Alpha,
];

/// Shape-specific sliders for `kind`.
pub fn shape_sliders(kind: ShapeKind) -> &'static [SliderId] {
    match kind {
        ShapeKind::RedDot => &[SliderId::DotRadius],
        ShapeKind::Cross => &[SliderId::Thickness],
        ShapeKind::Circle | ShapeKind::Image => &[],
    }
}

#[derive(Debug, Clone)]
pub struct SliderState {
    pub id: SliderId,
    pub value: i32,
    pub visible: bool,
    /// Full track rect.
    pub rect: Rect,
    /// Grab area around the track.
    pub thumb_rect: Rect,
}

impl SliderState {
    pub fn new(id: SliderId, value: i32) -> Self {
        let (min, max) = id.range();
        Self {
            id,
            value: value.clamp(min, max),
            visible: true,
            rect: Rect::default(),
            thumb_rect: Rect::default(),
        }
    }

    /// Fraction of the track filled by the current value.
    pub fn fraction(&self) -> f32 {
        let (min, max) = self.id.range();
        if max == min {
            return 0.0;
        }
        (self.value - min) as f32 / (max - min) as f32
    }

    pub fn thumb_x(&self) -> i32 {
        self.rect.left + (self.fraction() * self.rect.width() as f32) as i32
    }

    /// Value under an x position on the track.
    pub fn value_from_x(&self, x: i32) -> i32 {
        let track_width = self.rect.width();
        if track_width <= 0 {
            return self.value;
        }
        let (min, max) = self.id.range();
        let rel_x = (x - self.rect.left).clamp(0, track_width);
        min + ((rel_x as f32 / track_width as f32) * (max - min) as f32).round() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    ToggleMove,
    Center,
    LoadImage,
    RestoreDefaults,
}

#[derive(Debug, Clone)]
pub struct ButtonState {
    pub id: ButtonId,
    pub rect: Rect,
    pub hover: bool,
}

impl ButtonState {
    pub fn new(id: ButtonId) -> Self {
        Self {
            id,
            rect: Rect::default(),
            hover: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DropdownState {
    pub selected: ShapeKind,
    pub open: bool,
    pub rect: Rect,
    pub option_rects: [Rect; 4],
}

/// What the window should do with a mouse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Repaint,
    /// Apply this event (then repaint from the new state).
    Emit(AppEvent),
    /// Show the file picker; the window emits `LoadImage` with the choice.
    PickImage,
}

#[derive(Debug, Clone)]
pub struct PanelState {
    pub dropdown: DropdownState,
    pub sliders: Vec<SliderState>,
    pub buttons: Vec<ButtonState>,
    pub moving: bool,
    /// Slider being dragged, if any.
    pub dragging: Option<SliderId>,
    /// Y of the "Additional settings" heading, when shown.
    pub extra_heading_y: Option<i32>,
}

impl PanelState {
    pub fn new(state: &OverlayState) -> Self {
        let settings = &state.settings;
        let sliders = COMMON_SLIDERS
            .iter()
            .chain([SliderId::DotRadius, SliderId::Thickness].iter())
            .map(|&id| SliderState::new(id, id.value_in(settings)))
            .collect();
        let buttons = [
            ButtonId::ToggleMove,
            ButtonId::Center,
            ButtonId::LoadImage,
            ButtonId::RestoreDefaults,
        ]
        .into_iter()
        .map(ButtonState::new)
        .collect();

        let mut panel = Self {
            dropdown: DropdownState {
                selected: settings.kind,
                open: false,
                rect: Rect::default(),
                option_rects: [Rect::default(); 4],
            },
            sliders,
            buttons,
            moving: state.moving,
            dragging: None,
            extra_heading_y: None,
        };
        panel.layout();
        panel
    }

    /// Pull every control value from the state and re-run layout.
    pub fn sync(&mut self, state: &OverlayState) {
        for slider in &mut self.sliders {
            let (min, max) = slider.id.range();
            slider.value = slider.id.value_in(&state.settings).clamp(min, max);
        }
        self.dropdown.selected = state.settings.kind;
        self.moving = state.moving;
        self.layout();
    }

    pub fn slider(&self, id: SliderId) -> Option<&SliderState> {
        self.sliders.iter().find(|s| s.id == id)
    }

    pub fn visible_sliders(&self) -> impl Iterator<Item = &SliderState> {
        self.sliders.iter().filter(|s| s.visible)
    }

    pub fn button_label(&self, id: ButtonId) -> &'static str {
        match id {
            ButtonId::ToggleMove if self.moving => "Lock Crosshair",
            ButtonId::ToggleMove => "Move Crosshair",
            ButtonId::Center => "Center Crosshair",
            ButtonId::LoadImage => "Load Crosshair Image",
            ButtonId::RestoreDefaults => "Restore Default Crosshair",
        }
    }

    /// Compute every rect top to bottom for the selected shape.
    pub fn layout(&mut self) {
        let left = PADDING;
        let right = PADDING + CONTENT_WIDTH;
        let mut y = PADDING + TITLE_HEIGHT;

        // Type dropdown, label above
        y += LABEL_HEIGHT;
        self.dropdown.rect = Rect::new(left, y, right, y + DROPDOWN_HEIGHT);
        for (i, r) in self.dropdown.option_rects.iter_mut().enumerate() {
            let top = y + DROPDOWN_HEIGHT * (i as i32 + 1);
            *r = Rect::new(left, top, right, top + DROPDOWN_HEIGHT);
        }
        y += DROPDOWN_HEIGHT + SECTION_GAP;

        let extra = shape_sliders(self.dropdown.selected);
        for slider in &mut self.sliders {
            slider.visible = COMMON_SLIDERS.contains(&slider.id) || extra.contains(&slider.id);
        }

        let place = |slider: &mut SliderState, y: &mut i32| {
            let track_top = *y + LABEL_HEIGHT;
            slider.rect = Rect::new(left, track_top, right, track_top + TRACK_HEIGHT);
            slider.thumb_rect = Rect::new(
                left - THUMB_RADIUS,
                track_top - THUMB_RADIUS - 4,
                right + THUMB_RADIUS,
                track_top + TRACK_HEIGHT + THUMB_RADIUS + 4,
            );
            *y += SLIDER_ROW_HEIGHT;
        };

        for slider in self.sliders.iter_mut().filter(|s| COMMON_SLIDERS.contains(&s.id)) {
            place(slider, &mut y);
        }

        if extra.is_empty() {
            self.extra_heading_y = None;
        } else {
            self.extra_heading_y = Some(y);
            y += LABEL_HEIGHT + 8;
            for slider in self.sliders.iter_mut().filter(|s| extra.contains(&s.id)) {
                place(slider, &mut y);
            }
        }

        y += SECTION_GAP;
        for button in &mut self.buttons {
            button.rect = Rect::new(left, y, right, y + BUTTON_HEIGHT);
            y += BUTTON_HEIGHT + BUTTON_GAP;
        }
    }

    pub fn on_mouse_down(&mut self, x: i32, y: i32) -> PanelAction {
        if self.dropdown.open {
            self.dropdown.open = false;
            let hit = self
                .dropdown
                .option_rects
                .iter()
                .position(|r| r.contains(x, y));
            return match hit {
                Some(i) => {
                    let kind = ShapeKind::ALL[i];
                    self.dropdown.selected = kind;
                    self.layout();
                    PanelAction::Emit(AppEvent::SetKind(kind))
                }
                None => PanelAction::Repaint,
            };
        }

        if self.dropdown.rect.contains(x, y) {
            self.dropdown.open = true;
            return PanelAction::Repaint;
        }

        if let Some(slider) = self
            .sliders
            .iter_mut()
            .find(|s| s.visible && s.thumb_rect.contains(x, y))
        {
            self.dragging = Some(slider.id);
            slider.value = slider.value_from_x(x);
            return PanelAction::Emit(slider.id.event(slider.value));
        }

        match self.buttons.iter().find(|b| b.rect.contains(x, y)).map(|b| b.id) {
            Some(ButtonId::ToggleMove) => PanelAction::Emit(AppEvent::ToggleMove),
            Some(ButtonId::Center) => PanelAction::Emit(AppEvent::Center),
            Some(ButtonId::LoadImage) => PanelAction::PickImage,
            Some(ButtonId::RestoreDefaults) => PanelAction::Emit(AppEvent::RestoreDefaults),
            None => PanelAction::None,
        }
    }

    pub fn on_mouse_move(&mut self, x: i32, y: i32) -> PanelAction {
        if let Some(id) = self.dragging {
            let Some(slider) = self.sliders.iter_mut().find(|s| s.id == id) else {
                return PanelAction::None;
            };
            let value = slider.value_from_x(x);
            if value == slider.value {
                return PanelAction::None;
            }
            slider.value = value;
            return PanelAction::Emit(id.event(value));
        }

        let mut changed = false;
        for button in &mut self.buttons {
            let hover = button.rect.contains(x, y);
            changed |= hover != button.hover;
            button.hover = hover;
        }
        if changed {
            PanelAction::Repaint
        } else {
            PanelAction::None
        }
    }

    /// Returns true if a slider drag ended.
    pub fn on_mouse_up(&mut self) -> bool {
        self.dragging.take().is_some()
    }
}
