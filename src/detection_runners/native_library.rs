//! Engines backed by the prebuilt `yolo_cpp_dll_{cpu,gpu}` shared libraries.

use std::ffi::{c_char, c_int, CStr};
use std::path::{Path, PathBuf};
use libloading::Library;
use parking_lot::Mutex;
use crate::common::Backend;
use crate::data::{BboxContainer, SessionConfig};
use crate::detection_runners::{EngineLoader, NativeEngine, StagedBuffer};
use crate::error::DetectError;

type InitFn = unsafe extern "C" fn(*const c_char, *const c_char, c_int) -> c_int;
type DetectImageFn = unsafe extern "C" fn(*const c_char, *mut BboxContainer) -> c_int;
type DetectMatFn = unsafe extern "C" fn(*const u8, c_int, *mut BboxContainer) -> c_int;
type DisposeFn = unsafe extern "C" fn() -> c_int;

// The engines keep their detector in process-global state, one per library.
static LIVE_BACKENDS: Mutex<Vec<Backend>> = parking_lot::const_mutex(Vec::new());

struct BackendLease(Backend);

impl BackendLease {
    fn acquire(backend: Backend) -> crate::Result<Self> {
        let mut live = LIVE_BACKENDS.lock();
        if live.contains(&backend) {
            return Err(DetectError::BackendInUse(backend));
        }
        live.push(backend);
        Ok(Self(backend))
    }
}

impl Drop for BackendLease {
    fn drop(&mut self) {
        LIVE_BACKENDS.lock().retain(|b| *b != self.0);
    }
}

pub struct NativeLibrary {
    backend: Backend,
    path: PathBuf,
    init: InitFn,
    detect_image: DetectImageFn,
    detect_mat: DetectMatFn,
    dispose: DisposeFn,
    _lease: BackendLease,
    // Dropped last: the function pointers above point into it.
    _library: Library,
}

impl NativeLibrary {
    pub fn load(backend: Backend, path: &Path) -> crate::Result<Self> {
        let lease = BackendLease::acquire(backend)?;

        // SAFETY: loading runs the library's initializers; the engine libraries have no
        // initializer side effects beyond their own globals.
        let library = unsafe { Library::new(path) }.map_err(|source| DetectError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: each type alias matches the engine's exported C signature.
        let (init, detect_image, detect_mat, dispose) = unsafe {
            (
                symbol::<InitFn>(&library, b"init\0", path)?,
                symbol::<DetectImageFn>(&library, b"detect_image\0", path)?,
                symbol::<DetectMatFn>(&library, b"detect_mat\0", path)?,
                symbol::<DisposeFn>(&library, b"dispose\0", path)?,
            )
        };

        log::info!("Loaded {} engine from {}", backend, path.display());
        Ok(Self {
            backend,
            path: path.to_path_buf(),
            init,
            detect_image,
            detect_mat,
            dispose,
            _lease: lease,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &[u8], path: &Path) -> crate::Result<T> {
    library
        .get::<T>(name)
        .map(|s| *s)
        .map_err(|source| DetectError::LibraryLoad { path: path.to_path_buf(), source })
}

impl NativeEngine for NativeLibrary {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn initialize(&mut self, config_path: &CStr, weights_path: &CStr, device_index: i32) -> i32 {
        // SAFETY: both strings are NUL-terminated and outlive the call.
        unsafe { (self.init)(config_path.as_ptr(), weights_path.as_ptr(), device_index) }
    }

    fn detect_image(&mut self, image_path: &CStr, container: &mut BboxContainer) -> i32 {
        // SAFETY: the container has the engine's capacity and is exclusively borrowed.
        unsafe { (self.detect_image)(image_path.as_ptr(), container) }
    }

    fn detect_buffer(&mut self, buffer: &StagedBuffer, container: &mut BboxContainer) -> i32 {
        // SAFETY: `buffer` owns `native_len` readable bytes for the duration of the call.
        unsafe { (self.detect_mat)(buffer.as_ptr(), buffer.native_len(), container) }
    }

    fn dispose(&mut self) -> i32 {
        // SAFETY: no arguments; the session calls this at most once.
        unsafe { (self.dispose)() }
    }
}

/// Loads engines from `SessionConfig::engine_dir`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLoader;

impl EngineLoader for LibraryLoader {
    fn load(&self, backend: Backend, config: &SessionConfig) -> crate::Result<Box<dyn NativeEngine>> {
        let path = config
            .library_path(backend)
            .ok_or_else(|| DetectError::Config(format!("no native library for backend {}", backend)))?;
        Ok(Box::new(NativeLibrary::load(backend, &path)?))
    }
}
