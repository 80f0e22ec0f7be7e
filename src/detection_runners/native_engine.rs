use std::ffi::CStr;
use crate::common::Backend;
use crate::data::{BboxContainer, SessionConfig};
use crate::detection_runners::StagedBuffer;

/// Uniform call surface over one native backend.
///
/// Methods return the engine's raw codes; interpreting them is the session's job.
/// An implementation wraps exactly one backend, so a session holding one engine can
/// never reach the other backend's entry points.
pub trait NativeEngine: Send {
    fn backend(&self) -> Backend;

    /// `init(config, weights, device)`.
    fn initialize(&mut self, config_path: &CStr, weights_path: &CStr, device_index: i32) -> i32;

    /// `detect_image(path, &container)`. Returns the number of filled slots.
    fn detect_image(&mut self, image_path: &CStr, container: &mut BboxContainer) -> i32;

    /// `detect_mat(ptr, len, &container)`. Returns the number of filled slots.
    fn detect_buffer(&mut self, buffer: &StagedBuffer, container: &mut BboxContainer) -> i32;

    /// `dispose()`.
    fn dispose(&mut self) -> i32;
}

/// Produces the engine for a selected backend.
pub trait EngineLoader {
    fn load(&self, backend: Backend, config: &SessionConfig) -> crate::Result<Box<dyn NativeEngine>>;
}
