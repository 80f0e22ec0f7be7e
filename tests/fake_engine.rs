//! In-process stand-ins for the native engine and the host, shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::ffi::CStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use parking_lot::Mutex;
use tempfile::TempDir;
use yolo_detect::data::{BboxContainer, BboxT};
use yolo_detect::detection_runners::{EngineLoader, NativeEngine, StagedBuffer};
use yolo_detect::probe::{HostEnvironment, HostOs};
use yolo_detect::{Backend, DetectError, ModelArtifacts, SessionConfig};

pub const ENGINE_DIR: &str = "engine";

#[derive(Default)]
pub struct FakeState {
    pub calls: Mutex<Vec<String>>,
    pub init_args: Mutex<Option<(String, String, i32)>>,
    pub init_status: Mutex<i32>,
    pub dispose_status: Mutex<i32>,
    pub entries: Mutex<Vec<BboxT>>,
    pub detect_return: Mutex<Option<i32>>,
    pub last_buffer: Mutex<Vec<u8>>,
    pub delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeState {
    pub fn new() -> Arc<Self> {
        let state = Self::default();
        *state.init_status.lock() = 1;
        *state.dispose_status.lock() = 1;
        Arc::new(state)
    }

    pub fn with_entries(entries: &[BboxT]) -> Arc<Self> {
        let state = Self::new();
        *state.entries.lock() = entries.to_vec();
        state
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    fn fill(&self, container: &mut BboxContainer) -> i32 {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock();
        thread::sleep(delay);

        let entries = self.entries.lock().clone();
        container.candidates[..entries.len()].copy_from_slice(&entries);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let forced = *self.detect_return.lock();
        forced.unwrap_or(entries.len() as i32)
    }
}

pub struct FakeEngine {
    backend: Backend,
    state: Arc<FakeState>,
}

impl NativeEngine for FakeEngine {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn initialize(&mut self, config_path: &CStr, weights_path: &CStr, device_index: i32) -> i32 {
        self.state.calls.lock().push("init".to_string());
        *self.state.init_args.lock() = Some((
            config_path.to_string_lossy().into_owned(),
            weights_path.to_string_lossy().into_owned(),
            device_index,
        ));
        *self.state.init_status.lock()
    }

    fn detect_image(&mut self, _image_path: &CStr, container: &mut BboxContainer) -> i32 {
        self.state.calls.lock().push("detect_image".to_string());
        self.state.fill(container)
    }

    fn detect_buffer(&mut self, buffer: &StagedBuffer, container: &mut BboxContainer) -> i32 {
        self.state.calls.lock().push("detect_mat".to_string());
        *self.state.last_buffer.lock() = buffer.as_slice().to_vec();
        self.state.fill(container)
    }

    fn dispose(&mut self) -> i32 {
        self.state.calls.lock().push("dispose".to_string());
        *self.state.dispose_status.lock()
    }
}

pub struct FakeLoader {
    pub state: Arc<FakeState>,
    pub loaded: Mutex<Vec<Backend>>,
}

impl FakeLoader {
    pub fn new(state: Arc<FakeState>) -> Self {
        Self { state, loaded: Mutex::new(Vec::new()) }
    }
}

impl EngineLoader for FakeLoader {
    fn load(&self, backend: Backend, _config: &SessionConfig) -> yolo_detect::Result<Box<dyn NativeEngine>> {
        self.loaded.lock().push(backend);
        Ok(Box::new(FakeEngine { backend, state: Arc::clone(&self.state) }))
    }
}

/// Unix-like host with a fixed set of files and no environment variables.
pub struct FakeHost {
    files: HashSet<PathBuf>,
}

impl FakeHost {
    pub fn bare() -> Self {
        Self { files: HashSet::new() }
    }

    pub fn cpu_only() -> Self {
        let mut host = Self::bare();
        host.files.insert(PathBuf::from("/usr/lib/libstdc++.so.6"));
        host
    }

    pub fn gpu() -> Self {
        let mut host = Self::cpu_only();
        host.files.insert(Path::new(ENGINE_DIR).join("libcudart.so"));
        host.files.insert(Path::new(ENGINE_DIR).join("libcudnn.so.7"));
        host
    }
}

impl HostEnvironment for FakeHost {
    fn env_var(&self, _name: &str) -> Result<Option<String>, DetectError> {
        Ok(None)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn os(&self) -> HostOs {
        HostOs::Unix
    }
}

/// Writes `model.cfg`, `model.weights` and `model.names` into a fresh directory.
pub fn model_dir(names: &[&str]) -> (TempDir, ModelArtifacts) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("model.cfg"), b"[net]\n").unwrap();
    fs::write(dir.path().join("model.weights"), b"\0\0\0\0").unwrap();
    fs::write(dir.path().join("model.names"), names.join("\n")).unwrap();
    let artifacts = ModelArtifacts::discover(dir.path()).unwrap();
    (dir, artifacts)
}

pub fn config(artifacts: ModelArtifacts) -> SessionConfig {
    SessionConfig::new(artifacts).with_engine_dir(ENGINE_DIR)
}

/// A small image file next to the model, for detect-by-path.
pub fn image_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("dog.jpg");
    fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
    path
}
