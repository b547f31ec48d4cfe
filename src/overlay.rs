// Full-screen crosshair overlay using a per-pixel-alpha layered window.
//
// The window covers the primary screen and is presented with
// UpdateLayeredWindow from a premultiplied BGRA frame. Pixels with alpha 0
// never receive input. While moving mode is off the window also carries
// WS_EX_TRANSPARENT so every click falls through to what is underneath.

use crosshair::constants::SPLASH_DURATION_MS;
use crosshair::render::Frame;
use crosshair::{AppEvent, Point, ScreenSize};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, E_FAIL, HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, ReleaseDC, SelectObject,
    BITMAPINFO, BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetSystemMetrics, GetWindowLongPtrW,
    KillTimer, PostQuitMessage, RegisterClassW, SetTimer, SetWindowLongPtrW, SetWindowPos,
    ShowWindow, UpdateLayeredWindow, GWL_EXSTYLE, HWND_TOPMOST, SM_CXSCREEN, SM_CYSCREEN,
    SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_HIDE, SW_SHOWNOACTIVATE, ULW_ALPHA, WM_APP,
    WM_DESTROY, WM_HOTKEY, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_TIMER, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use crate::app::{self, AppError};
use crate::hotkeys;

/// Posted by the tray thread after it publishes an event.
pub const WM_APP_WAKE: u32 = WM_APP + 1;

const SPLASH_TIMER_ID: usize = 1;

const CLASS_NAME: &str = "CrosshairOverlay\0";

fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_APP_WAKE => {
            app::drain_events();
            LRESULT(0)
        }

        WM_LBUTTONDOWN => {
            let at = point_from_lparam(lparam);
            let dragging = app::with_app(|app| {
                app.state.begin_drag(at);
                app.state.is_dragging()
            });
            if dragging == Some(true) {
                SetCapture(hwnd);
            }
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            let at = point_from_lparam(lparam);
            app::with_app(|app| {
                if app.state.drag_to(at) {
                    app.redraw();
                }
            });
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            app::with_app(|app| app.state.end_drag());
            let _ = ReleaseCapture();
            LRESULT(0)
        }

        WM_HOTKEY => {
            if wparam.0 as i32 == hotkeys::HOTKEY_QUIT {
                app::dispatch(AppEvent::Quit);
            }
            LRESULT(0)
        }

        WM_TIMER => {
            if wparam.0 == SPLASH_TIMER_ID {
                let _ = KillTimer(Some(hwnd), SPLASH_TIMER_ID);
                app::end_splash();
            }
            LRESULT(0)
        }

        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

pub fn primary_screen_size() -> ScreenSize {
    unsafe { ScreenSize::new(GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
}

/// Create the (hidden, click-through) overlay covering `screen`.
pub fn create_window(screen: ScreenSize) -> Result<HWND, AppError> {
    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null())?;
        let class_name: Vec<u16> = CLASS_NAME.encode_utf16().collect();

        let wc = WNDCLASSW {
            lpfnWndProc: Some(window_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(windows::core::Error::from(E_FAIL).into());
        }

        let hwnd = CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
            PCWSTR(class_name.as_ptr()),
            PCWSTR::null(),
            WS_POPUP,
            0,
            0,
            screen.width,
            screen.height,
            None,
            None,
            Some(hinstance.into()),
            None,
        )?;

        log::debug!("Overlay window {}x{} created", screen.width, screen.height);
        Ok(hwnd)
    }
}

/// Copy `frame` into a DIB and apply it to the window with per-pixel alpha.
pub fn present(hwnd: HWND, frame: &Frame) -> windows::core::Result<()> {
    let width = frame.width() as i32;
    let height = frame.height() as i32;

    unsafe {
        let screen_dc = GetDC(None);
        let mem_dc = CreateCompatibleDC(Some(screen_dc));

        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // top-down
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut bits: *mut std::ffi::c_void = std::ptr::null_mut();
        let bitmap = match CreateDIBSection(Some(mem_dc), &bmi, DIB_RGB_COLORS, &mut bits, None, 0)
        {
            Ok(bitmap) if !bits.is_null() => bitmap,
            Ok(bitmap) => {
                let _ = DeleteObject(bitmap.into());
                let _ = DeleteDC(mem_dc);
                ReleaseDC(None, screen_dc);
                return Err(E_FAIL.into());
            }
            Err(e) => {
                let _ = DeleteDC(mem_dc);
                ReleaseDC(None, screen_dc);
                return Err(e);
            }
        };

        let bytes = frame.as_bytes();
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), bits as *mut u8, bytes.len());
        let old_bitmap = SelectObject(mem_dc, bitmap.into());

        let pt_src = POINT { x: 0, y: 0 };
        let pt_dst = POINT { x: 0, y: 0 };
        let size = SIZE {
            cx: width,
            cy: height,
        };
        let blend = BLENDFUNCTION {
            BlendOp: 0, // AC_SRC_OVER
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: 1, // AC_SRC_ALPHA
        };

        let result = UpdateLayeredWindow(
            hwnd,
            Some(screen_dc),
            Some(&pt_dst),
            Some(&size),
            Some(mem_dc),
            Some(&pt_src),
            COLORREF(0),
            Some(&blend),
            ULW_ALPHA,
        );

        SelectObject(mem_dc, old_bitmap);
        let _ = DeleteObject(bitmap.into());
        let _ = DeleteDC(mem_dc);
        ReleaseDC(None, screen_dc);
        result
    }
}

/// Moving mode on: crosshair pixels take the mouse. Off: fully click-through.
pub fn set_interactive(hwnd: HWND, interactive: bool) {
    unsafe {
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
        let transparent = WS_EX_TRANSPARENT.0 as isize;
        let next = if interactive {
            ex_style & !transparent
        } else {
            ex_style | transparent
        };
        SetWindowLongPtrW(hwnd, GWL_EXSTYLE, next);
        if !interactive {
            let _ = ReleaseCapture();
        }
    }
}

pub fn set_visible(hwnd: HWND, visible: bool) {
    unsafe {
        if visible {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
            let _ = SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        } else {
            let _ = ShowWindow(hwnd, SW_HIDE);
        }
    }
}

pub fn start_splash_timer(hwnd: HWND) {
    unsafe {
        SetTimer(Some(hwnd), SPLASH_TIMER_ID, SPLASH_DURATION_MS, None);
    }
}

/// Destroying the overlay ends the main message loop.
pub fn destroy(hwnd: HWND) {
    unsafe {
        if let Err(e) = DestroyWindow(hwnd) {
            log::error!("Failed to destroy overlay window: {e}");
            PostQuitMessage(0);
        }
    }
}
