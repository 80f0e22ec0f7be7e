use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use parking_lot::Mutex;
use crate::common::{Backend, ClassNameTable, Detection, ModelArtifacts};
use crate::data::{BboxContainer, CapabilityReport, RawDetections, SessionConfig};
use crate::detection_processing;
use crate::detection_runners::{EngineLoader, LibraryLoader, NativeEngine, StagedBuffer};
use crate::error::DetectError;
use crate::probe::{self, CapabilityProber, HostEnvironment, SystemEnvironment};
use crate::utils;

// The darknet wrapper returns 1 from init/dispose, other builds return 0.
fn status_ok(status: i32) -> bool {
    status == 0 || status == 1
}

fn path_to_cstring(path: &Path) -> crate::Result<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| DetectError::InvalidPath(format!("{} is not valid UTF-8", path.display())))?;
    CString::new(text).map_err(|_| DetectError::InvalidPath(format!("{} contains a NUL byte", path.display())))
}

/// A live detector bound to one backend.
///
/// The engine behind it keeps process-global state, so every native call goes through
/// one lock: concurrent `detect_*` calls on the same session run one after another.
/// Dropping the session disposes the engine if [`DetectionSession::dispose`] wasn't called.
pub struct DetectionSession {
    backend: Backend,
    report: CapabilityReport,
    names: ClassNameTable,
    engine: Mutex<Option<Box<dyn NativeEngine>>>,
}

impl DetectionSession {
    pub fn create(artifacts: ModelArtifacts, device_index: i32) -> crate::Result<Self> {
        Self::from_config(&SessionConfig::new(artifacts).with_device_index(device_index))
    }

    pub fn from_config(config: &SessionConfig) -> crate::Result<Self> {
        Self::with_parts(config, &SystemEnvironment, &LibraryLoader)
    }

    /// Creation with the host view and engine loader supplied by the caller.
    ///
    /// Each step must succeed before the next runs: address width, capability probe,
    /// backend selection, native init, names file. Nothing usable is returned on failure.
    pub fn with_parts(config: &SessionConfig, host: &dyn HostEnvironment, loader: &dyn EngineLoader) -> crate::Result<Self> {
        probe::ensure_64bit(usize::BITS as usize)?;

        let report = CapabilityProber::new(host, &config.engine_dir).probe()?;
        let backend = probe::select_backend(&report, config.prefer_cpu)?;
        log::info!("Initializing {} backend (report: {:?})", backend, report);

        let artifacts = &config.artifacts;
        artifacts.validate()?;
        let config_path = path_to_cstring(&artifacts.config_path)?;
        let weights_path = path_to_cstring(&artifacts.weights_path)?;

        let mut engine = loader.load(backend, config)?;
        if engine.backend() != backend {
            return Err(DetectError::Config(format!(
                "loader returned a {} engine for the {} backend", engine.backend(), backend
            )));
        }

        let device_index = match backend {
            Backend::GPU => config.device_index,
            _ => 0,
        };
        let now = Instant::now();
        let status = engine.initialize(&config_path, &weights_path, device_index);
        if !status_ok(status) {
            return Err(DetectError::native("init", status));
        }
        log::info!("{} engine initialized in {:.2?}", backend, now.elapsed());

        let names = match ClassNameTable::from_file(&artifacts.names_path) {
            Ok(names) => names,
            Err(e) => {
                // There is no partial un-init; a full dispose is the only teardown the engine offers.
                let status = engine.dispose();
                if !status_ok(status) {
                    log::warn!("Dispose after failed names load returned {}", status);
                }
                return Err(e);
            }
        };
        log::info!("Loaded {} class names from {}", names.len(), artifacts.names_path.display());

        Ok(Self {
            backend,
            report,
            names,
            engine: Mutex::new(Some(engine)),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn capability_report(&self) -> &CapabilityReport {
        &self.report
    }

    pub fn class_names(&self) -> &ClassNameTable {
        &self.names
    }

    pub fn is_disposed(&self) -> bool {
        self.engine.lock().is_none()
    }

    /// Runs detection on an image file the engine opens itself.
    pub fn detect_path(&self, path: &Path) -> crate::Result<Vec<Detection>> {
        if !path.is_file() {
            return Err(DetectError::ImageNotFound(path.to_path_buf()));
        }
        let image_path = path_to_cstring(path)?;

        let raw = self.with_engine("detect_image", |engine, container| {
            engine.detect_image(&image_path, container)
        })?;
        detection_processing::process_predictions(&raw, &self.names)
    }

    /// Runs detection on an encoded image held in memory.
    pub fn detect_bytes(&self, bytes: &[u8]) -> crate::Result<Vec<Detection>> {
        let staged = StagedBuffer::stage(bytes)?;
        let raw = self.with_engine("detect_mat", |engine, container| {
            engine.detect_buffer(&staged, container)
        });
        drop(staged);
        detection_processing::process_predictions(&raw?, &self.names)
    }

    fn with_engine<F>(&self, operation: &'static str, call: F) -> crate::Result<RawDetections>
    where
        F: FnOnce(&mut dyn NativeEngine, &mut BboxContainer) -> i32,
    {
        let mut container = BboxContainer::boxed();
        let detect_time = Instant::now();

        let mut guard = self.engine.lock();
        let engine = guard.as_mut().ok_or(DetectError::SessionDisposed)?;
        let mut _detect_elapsed = detect_time.elapsed();
        _detect_elapsed = utils::trace("TIME", "Waiting for engine", detect_time, _detect_elapsed);

        let returned = call(&mut **engine, &mut *container);
        drop(guard);
        utils::trace("TIME", operation, detect_time, _detect_elapsed);

        RawDetections::new(container, returned, operation)
    }

    /// Releases the native engine. Safe to call any number of times; only the first call
    /// reaches the engine. Failures are logged, never returned.
    pub fn dispose(&self) {
        let Some(mut engine) = self.engine.lock().take() else {
            log::debug!("{} session already disposed", self.backend);
            return;
        };
        let status = engine.dispose();
        if status_ok(status) {
            log::info!("{} engine disposed", self.backend);
        } else {
            log::warn!("{} engine dispose returned {}", self.backend, status);
        }
    }

    /// [`DetectionSession::detect_path`] on tokio's blocking pool.
    pub async fn detect_path_async(self: &Arc<Self>, path: PathBuf) -> crate::Result<Vec<Detection>> {
        let session = Arc::clone(self);
        join_blocking(tokio::task::spawn_blocking(move || session.detect_path(&path))).await
    }

    /// [`DetectionSession::detect_bytes`] on tokio's blocking pool.
    pub async fn detect_bytes_async(self: &Arc<Self>, bytes: Vec<u8>) -> crate::Result<Vec<Detection>> {
        let session = Arc::clone(self);
        join_blocking(tokio::task::spawn_blocking(move || session.detect_bytes(&bytes))).await
    }
}

async fn join_blocking<T>(handle: tokio::task::JoinHandle<crate::Result<T>>) -> crate::Result<T> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(DetectError::WorkerFailed(e.to_string())),
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for DetectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionSession")
            .field("backend", &self.backend)
            .field("report", &self.report)
            .field("names", &self.names.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_dispose_status_codes() {
        assert!(status_ok(0));
        assert!(status_ok(1));
        assert!(!status_ok(-1));
        assert!(!status_ok(2));
    }

    #[test]
    fn paths_with_nul_are_rejected() {
        let err = path_to_cstring(Path::new("bad\0name.jpg")).unwrap_err();
        assert!(matches!(err, DetectError::InvalidPath(_)));
        assert_eq!(path_to_cstring(Path::new("dog.jpg")).unwrap().as_bytes(), b"dog.jpg");
    }
}
