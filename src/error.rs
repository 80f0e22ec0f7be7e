use std::io;
use std::path::PathBuf;
use thiserror::Error;
use crate::common::Backend;

/// Everything that can go wrong between the caller and the native engine.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("unsupported platform: native engines require a 64-bit process, this one is {pointer_width}-bit")]
    UnsupportedPlatform { pointer_width: usize },

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("failed to query host environment: {0}")]
    EnvironmentQuery(String),

    #[error("failed to read names file {}: {source}", path.display())]
    NamesFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image buffer transfer failed: {0}")]
    Transfer(String),

    #[error("class id {class_id} is not in the names table ({known} names loaded)")]
    UnknownClassId { class_id: u32, known: usize },

    #[error("native engine {operation} failed with code {code}")]
    NativeEngine { operation: &'static str, code: i32 },

    #[error("failed to load native library {}: {source}", path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("a {0} engine is already live in this process")]
    BackendInUse(Backend),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("detection session has been disposed")]
    SessionDisposed,

    #[error("model artifact discovery failed: {0}")]
    ArtifactDiscovery(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("detection worker failed: {0}")]
    WorkerFailed(String),
}

impl DetectError {
    /// Per-call failures. The session stays usable and the same call may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            DetectError::Transfer(_) | DetectError::ImageNotFound(_) => true,
            DetectError::NativeEngine { operation, .. } => operation.starts_with("detect"),
            _ => false,
        }
    }

    pub(crate) fn native(operation: &'static str, code: i32) -> Self {
        DetectError::NativeEngine { operation, code }
    }
}
