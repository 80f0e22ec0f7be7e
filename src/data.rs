mod capability_report;
mod filesystem_access;
mod raw_detection;
mod session_config;

pub use capability_report::CapabilityReport;
pub use filesystem_access::FsAccess;
pub use raw_detection::{BboxContainer, BboxT, RawDetections, MAX_OBJECTS};
pub use session_config::SessionConfig;
