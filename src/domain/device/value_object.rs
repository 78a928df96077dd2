//! Device value objects

use serde::{Deserialize, Serialize};

/// Readiness of the device connection to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Uninitialized,
    /// Registered with the provider, waiting for ready
    Initializing,
    Ready,
    Offline,
    Failed,
}

impl DeviceStatus {
    pub fn can_place_calls(&self) -> bool {
        matches!(self, DeviceStatus::Ready)
    }
}

/// Options handed to the provider when the device registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOptions {
    /// Ask the provider for verbose signalling logs
    pub debug: bool,
}
