//! Native open-file dialog for picking a crosshair image.

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Controls::Dialogs::{
    GetOpenFileNameW, OFN_FILEMUSTEXIST, OFN_NOCHANGEDIR, OFN_PATHMUSTEXIST, OPENFILENAMEW,
};

const FILTER: &str = "Image files (*.png;*.jpg;*.jpeg;*.gif)\0*.png;*.jpg;*.jpeg;*.gif\0\0";
const MAX_PATH_CHARS: usize = 1024;

/// Modal; pumps messages until the user picks a file or cancels.
pub fn pick_image(owner: HWND) -> Option<PathBuf> {
    let filter: Vec<u16> = FILTER.encode_utf16().collect();
    let title: Vec<u16> = "Select Crosshair Image\0".encode_utf16().collect();
    let mut buffer = vec![0u16; MAX_PATH_CHARS];

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buffer.as_mut_ptr()),
        nMaxFile: buffer.len() as u32,
        lpstrTitle: PCWSTR(title.as_ptr()),
        Flags: OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_NOCHANGEDIR,
        ..Default::default()
    };

    if !unsafe { GetOpenFileNameW(&mut ofn) }.as_bool() {
        return None;
    }

    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    Some(PathBuf::from(OsString::from_wide(&buffer[..len])))
}
