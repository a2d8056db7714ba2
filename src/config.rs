//! Driver configuration.
//!
//! All settings are plain serde structs with defaults matching the firmware.
//! Loading and saving them is left to the application.

use crate::constants::*;
use crate::types::{DacConfig, WireFormat};
use serde::{Deserialize, Serialize};

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            timeout_ms: TIMEOUT_MS,
        }
    }
}

/// DDS clocking and amplitude reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdsConfig {
    pub sysclk_hz: f64,
    pub amplitude_reference: f64,
}

impl Default for DdsConfig {
    fn default() -> Self {
        Self {
            sysclk_hz: (1u64 << 30) as f64,
            amplitude_reference: 1.0,
        }
    }
}

/// Everything a [`DeviceDriver`](crate::DeviceDriver) needs besides its transport.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub serial: SerialConfig,
    pub wire_format: WireFormat,
    pub dac: DacConfig,
    pub dds: DdsConfig,
}
