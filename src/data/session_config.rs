//! Options for building a detection session.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::common::{Backend, ModelArtifacts};
use crate::error::DetectError;

const DEFAULT_ENGINE_DIR: &str = "x64";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub artifacts: ModelArtifacts,
    /// GPU ordinal handed to the GPU engine. The CPU engine ignores it.
    pub device_index: i32,
    /// Directory holding both native libraries and the GPU support libraries.
    pub engine_dir: PathBuf,
    pub cpu_library: String,
    pub gpu_library: String,
    /// Use the CPU engine even when the host could run the GPU one.
    pub prefer_cpu: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            artifacts: ModelArtifacts::default(),
            device_index: 0,
            engine_dir: PathBuf::from(DEFAULT_ENGINE_DIR),
            cpu_library: default_library_name(Backend::CPU),
            gpu_library: default_library_name(Backend::GPU),
            prefer_cpu: false,
        }
    }
}

fn default_library_name(backend: Backend) -> String {
    backend
        .library_stem()
        .map(|stem| libloading::library_filename(stem).to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl SessionConfig {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts, ..Default::default() }
    }

    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DetectError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| DetectError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn with_device_index(mut self, device_index: i32) -> Self {
        self.device_index = device_index;
        self
    }

    pub fn with_engine_dir(mut self, engine_dir: impl Into<PathBuf>) -> Self {
        self.engine_dir = engine_dir.into();
        self
    }

    pub fn with_cpu_library(mut self, name: &str) -> Self {
        self.cpu_library = name.to_string();
        self
    }

    pub fn with_gpu_library(mut self, name: &str) -> Self {
        self.gpu_library = name.to_string();
        self
    }

    pub fn with_prefer_cpu(mut self, prefer_cpu: bool) -> Self {
        self.prefer_cpu = prefer_cpu;
        self
    }

    /// Full path of the native library implementing `backend`.
    pub fn library_path(&self, backend: Backend) -> Option<PathBuf> {
        match backend {
            Backend::CPU => Some(self.engine_dir.join(&self.cpu_library)),
            Backend::GPU => Some(self.engine_dir.join(&self.gpu_library)),
            Backend::Unknown => None,
        }
    }
}
