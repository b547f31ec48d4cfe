//! Events flowing from the tray thread, the settings panel and the hotkey to
//! the main thread, which is the only place state is mutated.
//!
//! The tray publishes through an [`EventPublisher`] (a cloneable mpsc sender)
//! and then wakes the main loop; the main thread drains the [`EventBus`].

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::settings::{Channel, ShapeKind};

/// Everything a user can ask the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // Tray menu
    Grow,
    Shrink,
    Center,
    ToggleMove,
    ToggleVisible,
    OpenSettings,
    Quit,

    // Settings panel
    SetKind(ShapeKind),
    SetRadius(i32),
    SetChannel(Channel, u8),
    SetAlpha(u8),
    SetDotRadius(i32),
    SetThickness(i32),
    LoadImage(PathBuf),
    RestoreDefaults,
}

impl AppEvent {
    pub fn description(&self) -> &'static str {
        match self {
            AppEvent::Grow => "Grow crosshair",
            AppEvent::Shrink => "Shrink crosshair",
            AppEvent::Center => "Center crosshair",
            AppEvent::ToggleMove => "Toggle moving mode",
            AppEvent::ToggleVisible => "Toggle visibility",
            AppEvent::OpenSettings => "Open settings panel",
            AppEvent::Quit => "Quit",
            AppEvent::SetKind(_) => "Set shape",
            AppEvent::SetRadius(_) => "Set radius",
            AppEvent::SetChannel(..) => "Set color channel",
            AppEvent::SetAlpha(_) => "Set transparency",
            AppEvent::SetDotRadius(_) => "Set dot radius",
            AppEvent::SetThickness(_) => "Set thickness",
            AppEvent::LoadImage(_) => "Load crosshair image",
            AppEvent::RestoreDefaults => "Restore defaults",
        }
    }
}

/// Single-consumer end of the event channel, owned by the main thread.
pub struct EventBus {
    sender: Sender<AppEvent>,
    receiver: Receiver<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// A publisher handle that can be moved to another thread.
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            sender: self.sender.clone(),
        }
    }

    pub fn try_recv(&self) -> Option<AppEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Collect everything published since the last drain, in order.
    pub fn drain(&self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    sender: Sender<AppEvent>,
}

impl EventPublisher {
    /// Queue an event. A dropped receiver means the app is shutting down,
    /// so send errors are ignored.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bus_drains_nothing() {
        let bus = EventBus::new();
        assert!(bus.drain().is_empty());
        assert!(bus.try_recv().is_none());
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let bus = EventBus::new();
        let publisher = bus.publisher();

        publisher.publish(AppEvent::ToggleMove);
        publisher.publish(AppEvent::SetRadius(12));
        publisher.publish(AppEvent::Quit);

        assert_eq!(
            bus.drain(),
            vec![AppEvent::ToggleMove, AppEvent::SetRadius(12), AppEvent::Quit]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn publisher_works_from_another_thread() {
        let bus = EventBus::new();
        let publisher = bus.publisher();

        std::thread::spawn(move || {
            publisher.publish(AppEvent::Center);
            publisher.publish(AppEvent::Grow);
        })
        .join()
        .unwrap();

        assert_eq!(bus.drain(), vec![AppEvent::Center, AppEvent::Grow]);
    }

    #[test]
    fn publish_after_bus_dropped_is_silent() {
        let bus = EventBus::new();
        let publisher = bus.publisher();
        drop(bus);
        publisher.publish(AppEvent::Quit);
    }

    #[test]
    fn every_event_has_a_description() {
        let events = [
            AppEvent::Grow,
            AppEvent::Shrink,
            AppEvent::Center,
            AppEvent::ToggleMove,
            AppEvent::ToggleVisible,
            AppEvent::OpenSettings,
            AppEvent::Quit,
            AppEvent::SetKind(ShapeKind::Cross),
            AppEvent::SetRadius(1),
            AppEvent::SetChannel(Channel::Red, 0),
            AppEvent::SetAlpha(0),
            AppEvent::SetDotRadius(1),
            AppEvent::SetThickness(1),
            AppEvent::LoadImage(PathBuf::from("x.png")),
            AppEvent::RestoreDefaults,
        ];
        for event in events {
            assert!(!event.description().is_empty());
        }
    }
}
