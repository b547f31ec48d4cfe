// Global F9 quit hotkey using Win32 RegisterHotKey API

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, MOD_NOREPEAT, VK_F9,
};

/// Hotkey ID delivered in WM_HOTKEY's wparam
pub const HOTKEY_QUIT: i32 = 1;

/// F9 without modifiers, delivered to `hwnd`.
pub fn register_all(hwnd: HWND) -> windows::core::Result<()> {
    unsafe { RegisterHotKey(Some(hwnd), HOTKEY_QUIT, MOD_NOREPEAT, VK_F9.0 as u32) }
}

pub fn unregister_all(hwnd: HWND) {
    unsafe {
        let _ = UnregisterHotKey(Some(hwnd), HOTKEY_QUIT);
    }
}
