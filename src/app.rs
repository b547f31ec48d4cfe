//! Main-thread owner of everything mutable.
//!
//! All state lives in one thread-local `App`. Window procedures reach it
//! through [`with_app`], which never nests: a message that arrives while the
//! state is borrowed is dropped instead of panicking. Win32 calls that can
//! pump messages (dialogs, showing windows, destroying them) happen with the
//! borrow released.

use std::cell::RefCell;
use std::path::PathBuf;

use crosshair::config;
use crosshair::constants::APP_VERSION;
use crosshair::panel::PanelState;
use crosshair::render::{self, Frame};
use crosshair::{AppEvent, CrosshairSettings, Effect, EventBus, OverlayState};
use image::RgbaImage;
use thiserror::Error;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HWND;
use windows::Win32::System::Threading::{CreateMutexW, OpenMutexW, SYNCHRONIZATION_ACCESS_RIGHTS};
use windows::Win32::UI::WindowsAndMessaging::{DispatchMessageW, GetMessageW, TranslateMessage, MSG};

use crate::splash::Splash;
use crate::tray::TrayHandle;
use crate::{hotkeys, overlay, splash, tray, ui};

const SINGLE_INSTANCE_MUTEX: &str = "CrosshairOverlayMutex\0";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Win32 call failed: {0}")]
    Win32(#[from] windows::core::Error),
    #[error("tray thread exited before creating its window")]
    TrayStartup,
}

pub struct App {
    pub state: OverlayState,
    pub panel: PanelState,
    pub panel_hwnd: HWND,
    overlay_hwnd: HWND,
    custom_image: Option<RgbaImage>,
    settings_path: PathBuf,
    splash: Option<Splash>,
    frame: Frame,
    bus: EventBus,
    tray: Option<TrayHandle>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Run `f` against the app state. Returns None once the app has shut down
/// or when called re-entrantly.
pub fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            log::debug!("App state busy, dropping nested call");
            None
        }
    })
}

/// Apply one event and carry out whatever it asks of the windows.
pub fn dispatch(event: AppEvent) {
    log::debug!("{}: {:?}", event.description(), event);
    let Some(effect) = with_app(|app| app.state.apply(&event)) else {
        return;
    };

    match effect {
        Effect::Redraw => {
            with_app(App::redraw);
        }
        Effect::MovingChanged(moving) => {
            if let Some(hwnd) = with_app(|app| app.overlay_hwnd) {
                overlay::set_interactive(hwnd, moving);
            }
            with_app(App::redraw);
        }
        Effect::SetVisible(visible) => {
            if visible {
                with_app(App::redraw);
            }
            if let Some(hwnd) = with_app(|app| app.overlay_hwnd) {
                overlay::set_visible(hwnd, visible);
            }
        }
        Effect::OpenSettings => {
            if let Some(hwnd) = with_app(|app| app.panel_hwnd) {
                ui::show_window(hwnd);
            }
        }
        Effect::LoadImage(path) => {
            with_app(|app| app.load_custom_image(path));
        }
        Effect::ResetImage => {
            with_app(|app| {
                app.custom_image = None;
                app.redraw();
            });
        }
        Effect::Quit => {
            quit();
            return;
        }
    }

    with_app(App::sync_panel);
}

/// Apply everything the tray thread published since the last wake-up.
pub fn drain_events() {
    let events = with_app(|app| app.bus.drain()).unwrap_or_default();
    for event in events {
        dispatch(event);
    }
}

/// The splash timer fired: from now on only the crosshair is drawn.
pub fn end_splash() {
    with_app(|app| {
        if app.splash.take().is_some() {
            log::debug!("Splash finished");
            app.redraw();
        }
    });
}

impl App {
    /// Compose the frame and push it to the overlay window.
    pub fn redraw(&mut self) {
        self.frame.clear();
        match &self.splash {
            Some(splash) => self.frame.blit(&splash.image, splash.origin),
            None => {
                let bitmap =
                    render::render_crosshair(&self.state.settings, self.custom_image.as_ref());
                self.frame.blit(&bitmap, self.state.crosshair_origin());
            }
        }
        if let Err(e) = overlay::present(self.overlay_hwnd, &self.frame) {
            log::warn!("Failed to present overlay frame: {e}");
        }
    }

    fn sync_panel(&mut self) {
        self.panel.sync(&self.state);
        ui::invalidate(self.panel_hwnd);
    }

    fn load_custom_image(&mut self, path: PathBuf) {
        match render::load_image(&path) {
            Ok(img) => {
                log::info!("Loaded crosshair image {}", path.display());
                self.custom_image = Some(img);
                self.state.use_custom_image(path);
                self.redraw();
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    /// Save, stop the tray thread and destroy the windows. Failures are
    /// logged; shutdown always runs to the end.
    fn shutdown(self) {
        log::info!("Quitting, saving settings to {}", self.settings_path.display());
        if let Err(e) = config::save_settings(&self.settings_path, &self.state.settings) {
            log::error!("Failed to save settings: {e}");
        }
        if let Some(tray) = self.tray {
            tray.shutdown();
        }
        hotkeys::unregister_all(self.overlay_hwnd);
        ui::destroy_window(self.panel_hwnd);
        overlay::destroy(self.overlay_hwnd);
    }
}

fn quit() {
    let app = APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.take(),
        Err(_) => {
            log::error!("Quit requested while app state was busy");
            None
        }
    });
    if let Some(app) = app {
        app.shutdown();
    }
}

/// Decode the image remembered in the settings. A missing or broken file
/// clears the path so the generated shape is drawn instead.
fn load_saved_image(settings: &mut CrosshairSettings) -> Option<RgbaImage> {
    let path = settings.image_path.clone()?;
    match render::load_image(&path) {
        Ok(img) => Some(img),
        Err(e) => {
            log::warn!("{e}");
            settings.image_path = None;
            None
        }
    }
}

pub fn run() -> Result<(), AppError> {
    let settings_path = config::config_path();
    log::info!(
        "Crosshair {APP_VERSION} starting, settings at {}",
        settings_path.display()
    );

    let mut settings = config::load_settings(&settings_path);
    let custom_image = load_saved_image(&mut settings);

    let screen = overlay::primary_screen_size();
    let state = OverlayState::new(settings, screen);

    let overlay_hwnd = overlay::create_window(screen)?;
    let panel_hwnd = ui::create_window()?;

    let bus = EventBus::new();
    let tray = match tray::spawn(bus.publisher(), overlay_hwnd) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Tray icon unavailable: {e}");
            None
        }
    };

    if let Err(e) = hotkeys::register_all(overlay_hwnd) {
        log::warn!("Failed to register F9 hotkey: {e}");
    }

    let splash = splash::load(state.center);
    let has_splash = splash.is_some();

    let mut app = App {
        panel: PanelState::new(&state),
        state,
        panel_hwnd,
        overlay_hwnd,
        custom_image,
        settings_path,
        splash,
        frame: Frame::new(screen.width.max(1) as u32, screen.height.max(1) as u32),
        bus,
        tray,
    };
    app.redraw();
    APP.with(|cell| *cell.borrow_mut() = Some(app));

    overlay::set_visible(overlay_hwnd, true);
    if has_splash {
        overlay::start_splash_timer(overlay_hwnd);
    }

    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // The loop can also end without Quit (e.g. session end).
    quit();
    log::info!("Crosshair closed");
    Ok(())
}

/// Check if another instance is already running
pub fn is_already_running() -> bool {
    let name: Vec<u16> = SINGLE_INSTANCE_MUTEX.encode_utf16().collect();

    unsafe {
        let existing = OpenMutexW(
            SYNCHRONIZATION_ACCESS_RIGHTS(0x001F0001), // MUTEX_ALL_ACCESS
            false,
            PCWSTR(name.as_ptr()),
        );
        if existing.is_ok() {
            return true;
        }

        // Held for the life of the process.
        let _ = CreateMutexW(None, true, PCWSTR(name.as_ptr()));
        false
    }
}
