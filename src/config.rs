//! Session configuration.
//!
//! A [`Config`] is assembled by the caller (CLI/file plumbing lives outside
//! this crate) and is immutable for the lifetime of a session once
//! `Session::connect` begins. The defaults match the stock AmpServer
//! deployment.

use serde::{Deserialize, Serialize};

use crate::{AmpError, Result};

/// Connection and acquisition settings for one amplifier session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AmpServer host address.
    pub address: String,

    /// Text command channel port.
    pub command_port: u16,

    /// Notification channel port.
    pub notification_port: u16,

    /// Binary data channel port.
    pub data_port: u16,

    /// Amplifier id as known to AmpServer.
    pub amplifier_id: i32,

    /// Decimated acquisition rate in Hz.
    pub sampling_rate: u32,

    /// Stream name announced to the sink. When empty, a name is derived
    /// from the amplifier id reported on the wire.
    pub stream_name: String,

    /// Samples per chunk hint forwarded to the sink.
    pub samples_per_chunk: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "172.16.2.249".to_string(),
            command_port: 9877,
            notification_port: 9878,
            data_port: 9879,
            amplifier_id: 0,
            sampling_rate: 1000,
            stream_name: "EGI NetAmp".to_string(),
            samples_per_chunk: 32,
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML document.
    ///
    /// Missing keys fall back to the defaults above.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml_ng::from_str(yaml)
            .map_err(|e| AmpError::protocol("config parsing", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings that would otherwise fail deep inside the session.
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(AmpError::protocol("config validation", "address must not be empty"));
        }
        if self.sampling_rate == 0 {
            return Err(AmpError::protocol("config validation", "sampling_rate must be nonzero"));
        }
        Ok(())
    }
}
