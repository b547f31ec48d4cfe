pub mod dialogs;
pub mod painting;
pub mod theme;

use theme::*;

use crate::app::{self, AppError};
use crosshair::panel::{PanelAction, PANEL_HEIGHT, PANEL_WIDTH};
use crosshair::AppEvent;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{E_FAIL, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::*;

const CLASS_NAME: &str = "CrosshairSettingsWnd";

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Create the settings panel window (initially hidden)
pub fn create_window() -> Result<HWND, AppError> {
    let class_name = wide(CLASS_NAME);

    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null())?;

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hbrBackground: CreateSolidBrush(CLR_BACKGROUND),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            hIcon: LoadIconW(None, IDI_APPLICATION).unwrap_or_default(),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(windows::core::Error::from(E_FAIL).into());
        }

        // Size the frame so the client area matches the panel layout
        let mut wr = RECT {
            left: 0,
            top: 0,
            right: PANEL_WIDTH,
            bottom: PANEL_HEIGHT,
        };
        let style = WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX;
        let _ = AdjustWindowRectEx(&mut wr, style, false, WS_EX_TOPMOST);

        let title = wide("Crosshair Settings");

        let hwnd = CreateWindowExW(
            WS_EX_TOPMOST,
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            style,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            wr.right - wr.left,
            wr.bottom - wr.top,
            None,
            None,
            Some(hinstance.into()),
            None,
        )?;

        Ok(hwnd)
    }
}

/// Show and focus the settings window
pub fn show_window(hwnd: HWND) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
    }
}

pub fn hide_window(hwnd: HWND) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_HIDE);
    }
}

pub fn invalidate(hwnd: HWND) {
    unsafe {
        let _ = InvalidateRect(Some(hwnd), None, false);
    }
}

pub fn destroy_window(hwnd: HWND) {
    unsafe {
        if let Err(e) = DestroyWindow(hwnd) {
            log::error!("Failed to destroy settings window: {e}");
        }
    }
}

fn mouse_pos(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    (x, y)
}

/// Carry out what the panel model asked for. Runs with the app state
/// released so dispatch and the file dialog can borrow it.
fn perform(hwnd: HWND, action: Option<PanelAction>) {
    match action {
        Some(PanelAction::Emit(event)) => app::dispatch(event),
        Some(PanelAction::Repaint) => invalidate(hwnd),
        Some(PanelAction::PickImage) => {
            if let Some(path) = dialogs::pick_image(hwnd) {
                app::dispatch(AppEvent::LoadImage(path));
            }
        }
        Some(PanelAction::None) | None => {}
    }
}

/// Window procedure
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            // Double-buffer to avoid flicker
            let mut client = RECT::default();
            let _ = GetClientRect(hwnd, &mut client);

            let mem_dc = CreateCompatibleDC(Some(hdc));
            let mem_bmp = CreateCompatibleBitmap(hdc, client.right, client.bottom);
            let old_bmp = SelectObject(mem_dc, HGDIOBJ::from(mem_bmp));

            let painted = app::with_app(|app| painting::paint(mem_dc, &client, &app.panel));

            if painted.is_some() {
                let _ = BitBlt(
                    hdc,
                    0,
                    0,
                    client.right,
                    client.bottom,
                    Some(mem_dc),
                    0,
                    0,
                    SRCCOPY,
                );
            }

            SelectObject(mem_dc, old_bmp);
            let _ = DeleteObject(HGDIOBJ::from(mem_bmp));
            let _ = DeleteDC(mem_dc);
            let _ = EndPaint(hwnd, &ps);
            LRESULT(0)
        }

        WM_LBUTTONDOWN => {
            let (x, y) = mouse_pos(lparam);
            let result = app::with_app(|app| {
                let action = app.panel.on_mouse_down(x, y);
                (action, app.panel.dragging.is_some())
            });
            let Some((action, dragging)) = result else {
                return LRESULT(0);
            };
            if dragging {
                SetCapture(hwnd);
            }
            perform(hwnd, Some(action));
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            let (x, y) = mouse_pos(lparam);
            let action = app::with_app(|app| app.panel.on_mouse_move(x, y));
            perform(hwnd, action);
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            if app::with_app(|app| app.panel.on_mouse_up()) == Some(true) {
                let _ = ReleaseCapture();
                invalidate(hwnd);
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            // Hide instead of destroying; reopened from the tray
            hide_window(hwnd);
            LRESULT(0)
        }

        WM_ERASEBKGND => {
            // Handled in WM_PAINT with double buffering
            LRESULT(1)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
