//! Object detection through the prebuilt darknet engines.
//!
//! [`DetectionSession`] picks the CPU or GPU engine for the current host, loads it,
//! and returns typed [`Detection`]s for image files or encoded images in memory.

mod utils;
mod detectors;
mod detection_processing;
mod error;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod probe;
pub mod send_channels;

pub use crate::common::{Backend, ClassNameTable, Detection, ModelArtifacts};
pub use crate::data::{CapabilityReport, SessionConfig};
pub use crate::detection_processing::process_predictions;
pub use crate::detectors::DetectionSession;
pub use crate::error::DetectError;
pub use crate::send_channels::{DetectionWorker, ImageInput};

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Creates a session for `artifacts`, choosing the backend from the host.
pub fn create_session(artifacts: ModelArtifacts, device_index: i32) -> Result<DetectionSession> {
    DetectionSession::create(artifacts, device_index)
}
