//! Stream descriptor announced to the sink.

use serde::{Deserialize, Serialize};

use crate::Config;

/// Element type of the emitted sample vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    Float32,
}

/// One-time stream announcement a sink needs before accepting samples.
///
/// Built once per session, after the EEG channel count has been resolved
/// from discovery or the first data record, and announced before the first
/// sample vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Stream name; falls back to "EGI NetAmp <ampId>" when unconfigured.
    pub name: String,

    /// Number of EEG channels per sample vector.
    pub channel_count: u16,

    /// Nominal sampling rate in Hz.
    pub sampling_rate: u32,

    /// Element type of each channel value.
    pub sample_format: SampleFormat,

    /// Stable source identifier combining name and amplifier address.
    pub source_id: String,

    /// Samples-per-chunk hint for the sink.
    pub samples_per_chunk: u32,

    /// Fixed acquisition metadata for downstream consumers.
    pub acquisition: AcquisitionInfo,
}

/// Fixed metadata describing the acquisition hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionInfo {
    pub manufacturer: String,
    pub model: String,
    pub application: String,
    pub precision: String,
}

impl Default for AcquisitionInfo {
    fn default() -> Self {
        Self {
            manufacturer: "Philips Neuro".to_string(),
            model: "NetAmp".to_string(),
            application: "AmpServer".to_string(),
            precision: "24".to_string(),
        }
    }
}

impl StreamDescriptor {
    /// Build the session's descriptor.
    ///
    /// `wire_amp_id` is the amplifier id reported in the frame header, used
    /// only for the fallback name when no stream name is configured.
    pub fn new(config: &Config, wire_amp_id: i64, channel_count: u16) -> Self {
        let name = if config.stream_name.is_empty() {
            format!("EGI NetAmp {wire_amp_id}")
        } else {
            config.stream_name.clone()
        };
        let source_id = format!("{}_at_{}", name, config.address);

        Self {
            name,
            channel_count,
            sampling_rate: config.sampling_rate,
            sample_format: SampleFormat::Float32,
            source_id,
            samples_per_chunk: config.samples_per_chunk,
            acquisition: AcquisitionInfo::default(),
        }
    }
}
