// System tray icon with context menu, running on its own thread.
//
// The tray thread owns a hidden window, the notify icon and its popup menu.
// Menu picks are published on the event bus and the overlay is woken with
// WM_APP_WAKE; the tray never touches overlay state directly.

use std::cell::RefCell;
use std::sync::mpsc;
use std::thread::JoinHandle;

use crosshair::render;
use crosshair::{AppEvent, EventPublisher};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{E_FAIL, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    CreateBitmap, CreateDIBSection, DeleteObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
    DIB_RGB_COLORS,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreateIconIndirect, CreatePopupMenu, CreateWindowExW, DefWindowProcW,
    DestroyIcon, DestroyMenu, DestroyWindow, DispatchMessageW, GetCursorPos, GetMessageW,
    PostMessageW, PostQuitMessage, RegisterClassW, SetForegroundWindow, TrackPopupMenu,
    TranslateMessage, HICON, ICONINFO, MF_SEPARATOR, MF_STRING, MSG, TPM_BOTTOMALIGN,
    TPM_LEFTALIGN, WINDOW_EX_STYLE, WM_APP, WM_CLOSE, WM_COMMAND, WM_DESTROY, WM_LBUTTONUP,
    WM_NULL, WM_RBUTTONUP, WNDCLASSW, WS_OVERLAPPED,
};

use crate::app::AppError;
use crate::overlay::WM_APP_WAKE;

/// Custom message ID for tray icon callbacks
pub const WM_TRAY_ICON: u32 = WM_APP + 2;

/// Menu item IDs
pub const IDM_MOVE: u32 = 1001;
pub const IDM_CENTER: u32 = 1002;
pub const IDM_TOGGLE_VISIBLE: u32 = 1003;
pub const IDM_SETTINGS: u32 = 1004;
pub const IDM_BIGGER: u32 = 1005;
pub const IDM_SMALLER: u32 = 1006;
pub const IDM_QUIT: u32 = 1007;

const MENU_ITEMS: [(u32, &str); 7] = [
    (IDM_MOVE, "Move Crosshair"),
    (IDM_CENTER, "Center Crosshair"),
    (IDM_TOGGLE_VISIBLE, "Hide/show Crosshair"),
    (IDM_SETTINGS, "Configure Crosshair"),
    (IDM_BIGGER, "Bigger Crosshair"),
    (IDM_SMALLER, "Smaller Crosshair"),
    (IDM_QUIT, "Quit (F9)"),
];

const ICON_SIZE: u32 = 32;

const CLASS_NAME: &str = "CrosshairTray";

/// Tray thread state, only touched on the tray thread.
struct TrayContext {
    publisher: EventPublisher,
    overlay: isize,
    icon: HICON,
}

thread_local! {
    static CONTEXT: RefCell<Option<TrayContext>> = const { RefCell::new(None) };
}

/// Owned by the main thread; stops the tray thread on shutdown.
pub struct TrayHandle {
    hwnd: isize,
    thread: JoinHandle<()>,
}

impl TrayHandle {
    /// Ask the tray window to close and wait for its thread.
    pub fn shutdown(self) {
        unsafe {
            let hwnd = HWND(self.hwnd as *mut std::ffi::c_void);
            if let Err(e) = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0)) {
                log::error!("Failed to signal tray thread: {e}");
                return;
            }
        }
        if self.thread.join().is_err() {
            log::error!("Tray thread panicked");
        }
    }
}

fn wide_str(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn menu_event(id: u32) -> Option<AppEvent> {
    match id {
        IDM_MOVE => Some(AppEvent::ToggleMove),
        IDM_CENTER => Some(AppEvent::Center),
        IDM_TOGGLE_VISIBLE => Some(AppEvent::ToggleVisible),
        IDM_SETTINGS => Some(AppEvent::OpenSettings),
        IDM_BIGGER => Some(AppEvent::Grow),
        IDM_SMALLER => Some(AppEvent::Shrink),
        IDM_QUIT => Some(AppEvent::Quit),
        _ => None,
    }
}

/// Start the tray thread. Returns once its window and icon exist.
pub fn spawn(publisher: EventPublisher, overlay: HWND) -> Result<TrayHandle, AppError> {
    let overlay = overlay.0 as isize;
    let (ready_tx, ready_rx) = mpsc::channel::<windows::core::Result<isize>>();

    let thread = std::thread::Builder::new()
        .name("tray".into())
        .spawn(move || {
            let hwnd = match create_tray_window() {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let icon = create_cross_icon().unwrap_or_default();
            CONTEXT.with(|c| {
                *c.borrow_mut() = Some(TrayContext {
                    publisher,
                    overlay,
                    icon,
                })
            });
            if !add_tray_icon(hwnd, icon) {
                log::warn!("Shell_NotifyIconW refused the tray icon");
            }
            let _ = ready_tx.send(Ok(hwnd.0 as isize));

            unsafe {
                let mut msg = MSG::default();
                while GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
            log::debug!("Tray thread exiting");
        })
        .map_err(|_| AppError::TrayStartup)?;

    match ready_rx.recv() {
        Ok(Ok(hwnd)) => Ok(TrayHandle { hwnd, thread }),
        Ok(Err(e)) => {
            let _ = thread.join();
            Err(e.into())
        }
        Err(_) => Err(AppError::TrayStartup),
    }
}

fn create_tray_window() -> windows::core::Result<HWND> {
    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null())?;
        let class_name = wide_str(CLASS_NAME);

        let wc = WNDCLASSW {
            lpfnWndProc: Some(tray_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(E_FAIL.into());
        }

        // Never shown; only hosts the icon callbacks and the popup menu.
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR::null(),
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
    }
}

/// Build the 32×32 red-cross icon from the rendered bitmap.
fn create_cross_icon() -> Option<HICON> {
    let img = render::tray_icon(ICON_SIZE);
    let side = ICON_SIZE as i32;

    unsafe {
        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: side,
                biHeight: -side, // top-down
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut bits: *mut std::ffi::c_void = std::ptr::null_mut();
        let hbm_color = CreateDIBSection(None, &bmi, DIB_RGB_COLORS, &mut bits, None, 0).ok()?;
        if bits.is_null() {
            let _ = DeleteObject(hbm_color.into());
            return None;
        }

        let px = bits as *mut u8;
        for (i, p) in img.pixels().enumerate() {
            let [r, g, b, a] = p.0;
            *px.add(i * 4) = b;
            *px.add(i * 4 + 1) = g;
            *px.add(i * 4 + 2) = r;
            *px.add(i * 4 + 3) = a;
        }

        // Unused mask: the 32-bit color bitmap carries alpha.
        let hbm_mask = CreateBitmap(side, side, 1, 1, None);
        let ii = ICONINFO {
            fIcon: true.into(),
            xHotspot: 0,
            yHotspot: 0,
            hbmMask: hbm_mask,
            hbmColor: hbm_color,
        };
        let icon = CreateIconIndirect(&ii);

        // Bitmaps can be deleted after icon creation.
        let _ = DeleteObject(hbm_color.into());
        let _ = DeleteObject(hbm_mask.into());

        match icon {
            Ok(icon) => Some(icon),
            Err(e) => {
                log::warn!("Failed to build tray icon: {e}");
                None
            }
        }
    }
}

fn add_tray_icon(hwnd: HWND, icon: HICON) -> bool {
    unsafe {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd,
            uID: 1,
            uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP,
            uCallbackMessage: WM_TRAY_ICON,
            hIcon: icon,
            ..Default::default()
        };

        let tip = wide_str("Crosshair");
        let len = tip.len().min(nid.szTip.len());
        nid.szTip[..len].copy_from_slice(&tip[..len]);

        Shell_NotifyIconW(NIM_ADD, &nid).as_bool()
    }
}

fn remove_tray_icon(hwnd: HWND) {
    unsafe {
        let nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: hwnd,
            uID: 1,
            ..Default::default()
        };
        let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
    }
}

fn show_context_menu(hwnd: HWND) {
    unsafe {
        let Ok(menu) = CreatePopupMenu() else {
            log::warn!("Failed to create tray menu");
            return;
        };

        let labels: Vec<Vec<u16>> = MENU_ITEMS.iter().map(|(_, label)| wide_str(label)).collect();
        for ((id, _), label) in MENU_ITEMS.iter().zip(&labels) {
            if *id == IDM_QUIT {
                let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
            }
            let _ = AppendMenuW(menu, MF_STRING, *id as usize, PCWSTR(label.as_ptr()));
        }

        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);

        // Required for TrackPopupMenu to work correctly with tray icons
        let _ = SetForegroundWindow(hwnd);

        let _ = TrackPopupMenu(
            menu,
            TPM_LEFTALIGN | TPM_BOTTOMALIGN,
            pt.x,
            pt.y,
            Some(0),
            hwnd,
            None,
        );
        let _ = PostMessageW(Some(hwnd), WM_NULL, WPARAM(0), LPARAM(0));

        let _ = DestroyMenu(menu);
    }
}

/// Publish and wake the main thread.
fn publish(event: AppEvent) {
    CONTEXT.with(|c| {
        if let Some(ctx) = c.borrow().as_ref() {
            ctx.publisher.publish(event);
            let overlay = HWND(ctx.overlay as *mut std::ffi::c_void);
            unsafe {
                if let Err(e) = PostMessageW(Some(overlay), WM_APP_WAKE, WPARAM(0), LPARAM(0)) {
                    log::warn!("Failed to wake overlay: {e}");
                }
            }
        }
    });
}

unsafe extern "system" fn tray_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TRAY_ICON => {
            match (lparam.0 & 0xFFFF) as u32 {
                WM_LBUTTONUP => publish(AppEvent::OpenSettings),
                WM_RBUTTONUP => show_context_menu(hwnd),
                _ => {}
            }
            LRESULT(0)
        }

        WM_COMMAND => {
            let cmd = (wparam.0 & 0xFFFF) as u32;
            if let Some(event) = menu_event(cmd) {
                publish(event);
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            remove_tray_icon(hwnd);
            let icon = CONTEXT.with(|c| c.borrow_mut().take().map(|ctx| ctx.icon));
            if let Some(icon) = icon.filter(|i| !i.is_invalid()) {
                let _ = DestroyIcon(icon);
            }
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_menu_item_maps_to_an_event() {
        for (id, _) in MENU_ITEMS {
            assert!(menu_event(id).is_some(), "menu id {id} has no event");
        }
        assert_eq!(menu_event(IDM_QUIT), Some(AppEvent::Quit));
        assert_eq!(menu_event(IDM_BIGGER), Some(AppEvent::Grow));
        assert_eq!(menu_event(0), None);
    }
}
