//! Shared library exporting the engine's C surface, loaded by the `native_library` tests.
//!
//! Boxes are derived from the inputs so the caller can check what crossed the boundary:
//! `detect_image` reports the path length as width and height, `detect_mat` reports the
//! buffer length as width and its first byte as height.

use std::ffi::{c_char, c_int, CStr};
use std::slice;
use std::sync::atomic::{AtomicI32, Ordering};

#[repr(C)]
#[derive(Clone, Copy)]
pub struct BboxT {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub prob: f32,
    pub obj_id: u32,
    pub track_id: u32,
    pub frames_counter: u32,
}

#[repr(C)]
pub struct BboxContainer {
    pub candidates: [BboxT; 1000],
}

// -1 until init, then the device index init received.
static DEVICE: AtomicI32 = AtomicI32::new(-1);

fn bbox(obj_id: u32, w: u32, h: u32) -> BboxT {
    BboxT { x: 1, y: 2, w, h, prob: 0.75, obj_id, track_id: 0, frames_counter: 0 }
}

/// # Safety
/// Both paths must be NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn init(config: *const c_char, weights: *const c_char, gpu: c_int) -> c_int {
    if config.is_null() || weights.is_null() {
        return -1;
    }
    DEVICE.store(gpu, Ordering::SeqCst);
    1
}

/// # Safety
/// `filename` must be NUL-terminated and `container` writable.
#[no_mangle]
pub unsafe extern "C" fn detect_image(filename: *const c_char, container: *mut BboxContainer) -> c_int {
    if DEVICE.load(Ordering::SeqCst) < 0 || filename.is_null() || container.is_null() {
        return -1;
    }
    let len = CStr::from_ptr(filename).to_bytes().len() as u32;
    (*container).candidates[0] = bbox(0, len, len);
    1
}

/// # Safety
/// `data` must point to `data_length` readable bytes and `container` must be writable.
#[no_mangle]
pub unsafe extern "C" fn detect_mat(data: *const u8, data_length: c_int, container: *mut BboxContainer) -> c_int {
    if DEVICE.load(Ordering::SeqCst) < 0 || data.is_null() || data_length <= 0 || container.is_null() {
        return -1;
    }
    let bytes = slice::from_raw_parts(data, data_length as usize);
    (*container).candidates[0] = bbox(1, bytes.len() as u32, bytes[0] as u32);
    (*container).candidates[1] = bbox(2, 0, 0);
    2
}

#[no_mangle]
pub extern "C" fn dispose() -> c_int {
    DEVICE.store(-1, Ordering::SeqCst);
    1
}
