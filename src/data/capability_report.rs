use serde::{Deserialize, Serialize};

/// Snapshot of what the host offers the native engines. Taken once per session.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub runtime_redistributable_present: bool,
    pub cuda_present: bool,
    pub cudnn_present: bool,
}

impl CapabilityReport {
    pub fn new(runtime_redistributable_present: bool, cuda_present: bool, cudnn_present: bool) -> Self {
        Self {
            runtime_redistributable_present,
            cuda_present,
            cudnn_present,
        }
    }

    pub fn gpu_capable(&self) -> bool {
        self.cuda_present && self.cudnn_present
    }
}
