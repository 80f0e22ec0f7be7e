use std::fmt;
use serde::{Deserialize, Serialize};

/// Compute engine variant a session runs on. Chosen once at session creation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    #[default] Unknown,
    CPU,
    GPU,
}

// Hardcoded backend names. Storing the "proper" spelling and the lowercase version.
const UNKNOWN: [&str; 2] = ["Unknown", "unknown"];
const CPU: [&str; 2] = ["CPU", "cpu"];
const GPU: [&str; 2] = ["GPU", "gpu"];

impl Backend {
    pub fn str(&self) -> &'static str {
        match self {
            Backend::Unknown => UNKNOWN[0],
            Backend::CPU => CPU[0],
            Backend::GPU => GPU[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            Backend::Unknown => UNKNOWN[1],
            Backend::CPU => CPU[1],
            Backend::GPU => GPU[1],
        }
    }

    /// Stem of the native library implementing this backend, without platform prefix/suffix.
    pub fn library_stem(&self) -> Option<&'static str> {
        match self {
            Backend::Unknown => None,
            Backend::CPU => Some("yolo_cpp_dll_cpu"),
            Backend::GPU => Some("yolo_cpp_dll_gpu"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.str())
    }
}
