// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
mod app;
#[cfg(windows)]
mod hotkeys;
#[cfg(windows)]
mod overlay;
#[cfg(windows)]
mod splash;
#[cfg(windows)]
mod tray;
#[cfg(windows)]
mod ui;

use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    #[cfg(windows)]
    {
        if app::is_already_running() {
            log::info!("Crosshair is already running");
            return;
        }
        if let Err(e) = app::run() {
            log::error!("Crosshair stopped: {e}");
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        log::error!("The crosshair overlay needs Windows (Win32 layered windows and tray)");
        std::process::exit(1);
    }
}
