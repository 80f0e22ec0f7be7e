//! Host capability probing and backend selection.
//!
//! Absence of a library is a normal outcome and only shows up as `false` in the
//! [`CapabilityReport`]. Failing to query the host at all is an error.

use std::env;
use std::path::{Path, PathBuf};
use crate::common::Backend;
use crate::data::CapabilityReport;
use crate::error::DetectError;

const CUDA_TOOLKIT_MARKER: &str = "CUDA_PATH";

const WINDOWS_REDISTRIBUTABLE: [&str; 2] = ["vcruntime140.dll", "msvcp140.dll"];
const WINDOWS_CUDA_RUNTIME: [&str; 5] = ["cudart64_92.dll", "cudart64_100.dll", "cudart64_101.dll", "cudart64_110.dll", "cudart64_12.dll"];
const WINDOWS_CUDNN: [&str; 2] = ["cudnn64_7.dll", "cudnn64_8.dll"];

const UNIX_REDISTRIBUTABLE: &str = "libstdc++.so.6";
const UNIX_LIBRARY_DIRS: [&str; 7] = [
    "/usr/lib",
    "/usr/lib64",
    "/lib",
    "/lib64",
    "/usr/lib/x86_64-linux-gnu",
    "/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
];
const UNIX_CUDA_RUNTIME: [&str; 4] = ["libcudart.so", "libcudart.so.10.0", "libcudart.so.11.0", "libcudart.so.12"];
const UNIX_CUDNN: [&str; 3] = ["libcudnn.so.7", "libcudnn.so.8", "libcudnn.so"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Unix,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(windows) { HostOs::Windows } else { HostOs::Unix }
    }
}

/// Read-only view of the host the prober inspects.
pub trait HostEnvironment {
    /// `Ok(None)` when the variable is unset. A set but unreadable variable is an error.
    fn env_var(&self, name: &str) -> crate::Result<Option<String>>;

    fn file_exists(&self, path: &Path) -> bool;

    fn os(&self) -> HostOs {
        HostOs::current()
    }
}

/// The real process environment and filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn env_var(&self, name: &str) -> crate::Result<Option<String>> {
        match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(DetectError::EnvironmentQuery(format!("{} is not valid unicode", name)))
            }
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

pub struct CapabilityProber<'a> {
    host: &'a dyn HostEnvironment,
    engine_dir: PathBuf,
}

impl<'a> CapabilityProber<'a> {
    pub fn new(host: &'a dyn HostEnvironment, engine_dir: &Path) -> Self {
        Self { host, engine_dir: engine_dir.to_path_buf() }
    }

    pub fn probe(&self) -> crate::Result<CapabilityReport> {
        let report = CapabilityReport {
            runtime_redistributable_present: self.redistributable_present()?,
            cuda_present: self.cuda_present()?,
            cudnn_present: self.cudnn_present(),
        };
        log::debug!("Capability report: {:?}", report);
        Ok(report)
    }

    fn redistributable_present(&self) -> crate::Result<bool> {
        match self.host.os() {
            HostOs::Windows => {
                let root = self.host.env_var("SystemRoot")?.ok_or_else(|| {
                    DetectError::EnvironmentQuery("SystemRoot is not set, cannot locate the system directory".to_string())
                })?;
                let system32 = Path::new(&root).join("System32");
                Ok(WINDOWS_REDISTRIBUTABLE.iter().all(|dll| self.host.file_exists(&system32.join(dll))))
            }
            HostOs::Unix => {
                let mut dirs: Vec<PathBuf> = UNIX_LIBRARY_DIRS.iter().map(PathBuf::from).collect();
                if let Some(extra) = self.host.env_var("LD_LIBRARY_PATH")? {
                    dirs.extend(env::split_paths(&extra));
                }
                Ok(dirs.iter().any(|dir| self.host.file_exists(&dir.join(UNIX_REDISTRIBUTABLE))))
            }
        }
    }

    fn cuda_present(&self) -> crate::Result<bool> {
        let runtime_names: &[&str] = match self.host.os() {
            HostOs::Windows => &WINDOWS_CUDA_RUNTIME,
            HostOs::Unix => &UNIX_CUDA_RUNTIME,
        };
        if self.any_in_engine_dir(runtime_names) {
            return Ok(true);
        }
        Ok(self.host.env_var(CUDA_TOOLKIT_MARKER)?.is_some_and(|v| !v.is_empty()))
    }

    fn cudnn_present(&self) -> bool {
        let cudnn_names: &[&str] = match self.host.os() {
            HostOs::Windows => &WINDOWS_CUDNN,
            HostOs::Unix => &UNIX_CUDNN,
        };
        self.any_in_engine_dir(cudnn_names)
    }

    fn any_in_engine_dir(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.host.file_exists(&self.engine_dir.join(name)))
    }
}

/// Backend selection policy. A pure function of the report.
///
/// Without the runtime redistributable neither engine can load. GPU needs both the CUDA
/// runtime and cuDNN, everything else falls back to CPU.
pub fn select_backend(report: &CapabilityReport, prefer_cpu: bool) -> crate::Result<Backend> {
    if !report.runtime_redistributable_present {
        return Err(DetectError::MissingDependency(
            "C++ runtime redistributable (x64) required by the native engines".to_string(),
        ));
    }
    if report.gpu_capable() && !prefer_cpu {
        Ok(Backend::GPU)
    } else {
        Ok(Backend::CPU)
    }
}

/// The native engines only exist as 64-bit builds.
pub fn ensure_64bit(pointer_width: usize) -> crate::Result<()> {
    if pointer_width == 64 {
        Ok(())
    } else {
        Err(DetectError::UnsupportedPlatform { pointer_width })
    }
}
