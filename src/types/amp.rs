//! Amplifier identity enumerations.
//!
//! These map the values AmpServer reports during discovery (and embeds in
//! data records) to the constants the decoder needs: the per-model scaling
//! factor, the wire record size, and the electrode-net channel count.

use serde::{Deserialize, Serialize};

/// Amplifier hardware model, resolved during discovery.
///
/// Each model has one fixed scaling factor converting raw integer readings
/// to microvolts. `Unknown` keeps readings unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmplifierType {
    Unknown,
    /// Net Amps 300
    NA300,
    /// Net Amps 400
    NA400,
    /// Net Amps 410 (reported via the legacy_board flag)
    NA410,
}

impl AmplifierType {
    /// Raw-to-physical-unit scaling factor for this model.
    ///
    /// Fixed for the lifetime of a session once the type is resolved.
    pub const fn scaling_factor(&self) -> f32 {
        match self {
            AmplifierType::NA300 => 0.0244140625,
            AmplifierType::NA400 => 0.00015522042,
            AmplifierType::NA410 => 0.00009636188,
            AmplifierType::Unknown => 1.0,
        }
    }
}

/// Wire layout version of the data channel records.
///
/// Discovered once per session and never re-checked per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketFormat {
    /// Legacy float-based layout (NA300 era).
    Format1,
    /// Current integer-based layout with packet sequencing.
    Format2,
}

impl PacketFormat {
    /// Fixed on-wire size of one record in this format.
    pub const fn record_size(&self) -> usize {
        match self {
            PacketFormat::Format1 => crate::packet::FORMAT1_RECORD_SIZE,
            PacketFormat::Format2 => crate::packet::FORMAT2_RECORD_SIZE,
        }
    }
}

/// Electrode net / channel density code carried in each data record.
///
/// Identifies the headset model plugged into the amplifier; its only use
/// here is inferring the EEG channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetCode {
    Gsn64_2_0,
    Gsn128_2_0,
    Gsn256_2_0,
    Hcgsn32_1_0,
    Hcgsn64_1_0,
    Hcgsn128_1_0,
    Hcgsn256_1_0,
    Mcgsn32_1_0,
    Mcgsn64_1_0,
    Mcgsn128_1_0,
    Mcgsn256_1_0,
    TestConnector,
    NoNet,
    Unknown,
}

impl NetCode {
    /// Decode the raw net code byte from a data record.
    pub fn from_wire(code: u8) -> Self {
        match code {
            0 => NetCode::Gsn64_2_0,
            1 => NetCode::Gsn128_2_0,
            2 => NetCode::Gsn256_2_0,
            3 => NetCode::Hcgsn32_1_0,
            4 => NetCode::Hcgsn64_1_0,
            5 => NetCode::Hcgsn128_1_0,
            6 => NetCode::Hcgsn256_1_0,
            7 => NetCode::Mcgsn32_1_0,
            8 => NetCode::Mcgsn64_1_0,
            9 => NetCode::Mcgsn128_1_0,
            10 => NetCode::Mcgsn256_1_0,
            14 => NetCode::TestConnector,
            15 => NetCode::NoNet,
            _ => NetCode::Unknown,
        }
    }

    /// EEG channel count implied by this net, or 0 when the code carries
    /// no channel information (test connector, no net, unknown).
    pub const fn channel_count(&self) -> u16 {
        match self {
            NetCode::Hcgsn32_1_0 | NetCode::Mcgsn32_1_0 => 32,
            NetCode::Gsn64_2_0 | NetCode::Hcgsn64_1_0 | NetCode::Mcgsn64_1_0 => 64,
            NetCode::Gsn128_2_0 | NetCode::Hcgsn128_1_0 | NetCode::Mcgsn128_1_0 => 128,
            NetCode::Gsn256_2_0 | NetCode::Hcgsn256_1_0 | NetCode::Mcgsn256_1_0 => 256,
            NetCode::TestConnector | NetCode::NoNet | NetCode::Unknown => 0,
        }
    }
}
