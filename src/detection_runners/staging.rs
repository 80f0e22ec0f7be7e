//! Staging of caller image bytes into a buffer handed to `detect_mat`.
//!
//! The staged block lives exactly as long as its [`StagedBuffer`]; dropping it releases
//! the block on every exit path, including unwinding out of the native call.

use std::ffi::c_int;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::error::DetectError;

static LIVE_BUFFERS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct StagedBuffer {
    block: Box<[u8]>,
    native_len: c_int,
}

impl StagedBuffer {
    /// Copies `bytes` into a fresh block. Performs no image parsing.
    pub fn stage(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.is_empty() {
            return Err(DetectError::Transfer("image buffer is empty".to_string()));
        }
        let native_len = c_int::try_from(bytes.len()).map_err(|_| {
            DetectError::Transfer(format!("image buffer of {} bytes exceeds the native length limit", bytes.len()))
        })?;

        let mut block = Vec::new();
        block
            .try_reserve_exact(bytes.len())
            .map_err(|e| DetectError::Transfer(format!("cannot allocate {} bytes: {}", bytes.len(), e)))?;
        block.extend_from_slice(bytes);

        LIVE_BUFFERS.fetch_add(1, Ordering::SeqCst);
        Ok(Self { block: block.into_boxed_slice(), native_len })
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.block.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Length as the engine's `int` parameter.
    pub fn native_len(&self) -> c_int {
        self.native_len
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.block
    }

    /// Staged blocks not yet released, process-wide.
    pub fn live_count() -> usize {
        LIVE_BUFFERS.load(Ordering::SeqCst)
    }
}

impl Drop for StagedBuffer {
    fn drop(&mut self) {
        LIVE_BUFFERS.fetch_sub(1, Ordering::SeqCst);
        log::trace!("Released staged buffer of {} bytes", self.block.len());
    }
}
