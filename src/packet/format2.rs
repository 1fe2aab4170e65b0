//! Format-2 record layout (current integer-based hardware).
//!
//! Fixed 1264-byte records, no inter-field padding:
//!
//! | offset | field |
//! |---|---|
//! | 0 | digital inputs (u16) |
//! | 2 | tr (u8) |
//! | 3 | PIB-1 AUX block (11 bytes) |
//! | 14 | PIB-2 AUX block (11 bytes) |
//! | 25 | packet counter (u64) |
//! | 33 | timestamp (u64) |
//! | 41 | net code (u8) |
//! | 42 | reserved (38 bytes) |
//! | 80 | EEG channels (256 × i32) |
//! | 1104 | aux channels (3 × i32) |
//! | 1116 | ref/com/drive monitors, diagnostics, current sense (5 × i32) |
//! | 1136 | PIB-1 data (16 × i32) |
//! | 1200 | PIB-2 data (16 × i32) |
//!
//! Byte order: the enclosing frame header is big-endian, but the integer
//! payload of a Format-2 record undergoes no byte-order conversion anywhere
//! in the protocol. The asymmetry is part of the wire behavior and is kept
//! (native-order reads), not normalized.

use crate::{AmpError, Result};

/// On-wire size of one Format-2 record.
pub const FORMAT2_RECORD_SIZE: usize = 1264;

const EEG_CHANNEL_SLOTS: usize = 256;
const PIB_DATA_SLOTS: usize = 16;

const OFF_DIGITAL_INPUTS: usize = 0;
const OFF_TR: usize = 2;
const OFF_PIB1_AUX: usize = 3;
const OFF_PIB2_AUX: usize = 14;
const OFF_PACKET_COUNTER: usize = 25;
const OFF_TIMESTAMP: usize = 33;
const OFF_NET_CODE: usize = 41;
const OFF_EEG: usize = 80;
const OFF_AUX: usize = 1104;
const OFF_REF_MONITOR: usize = 1116;
const OFF_COM_MONITOR: usize = 1120;
const OFF_DRIVE_MONITOR: usize = 1124;
const OFF_DIAGNOSTICS: usize = 1128;
const OFF_CURRENT_SENSE: usize = 1132;
const OFF_PIB1_DATA: usize = 1136;
const OFF_PIB2_DATA: usize = 1200;

/// Physiology AUX sub-block carried twice per record (one per PIB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PibAuxBlock {
    pub digital_inputs: u8,
    pub status: u8,
    pub battery_level: [u8; 3],
    pub temperature: [u8; 3],
    pub spo2: u8,
    pub heart_rate: [u8; 2],
}

impl PibAuxBlock {
    const SIZE: usize = 11;

    fn parse(buf: &[u8]) -> Self {
        Self {
            digital_inputs: buf[0],
            status: buf[1],
            battery_level: [buf[2], buf[3], buf[4]],
            temperature: [buf[5], buf[6], buf[7]],
            spo2: buf[8],
            heart_rate: [buf[9], buf[10]],
        }
    }
}

/// One decoded Format-2 record.
#[derive(Debug, Clone)]
pub struct Format2Record {
    pub digital_inputs: u16,
    pub tr: u8,
    pub pib1_aux: PibAuxBlock,
    pub pib2_aux: PibAuxBlock,
    pub packet_counter: u64,
    pub timestamp: u64,
    pub net_code: u8,
    pub eeg: [i32; EEG_CHANNEL_SLOTS],
    pub aux: [i32; 3],
    pub ref_monitor: i32,
    pub com_monitor: i32,
    pub drive_monitor: i32,
    pub diagnostics_channel: i32,
    pub current_sense: i32,
    pub pib1_data: [i32; PIB_DATA_SLOTS],
    pub pib2_data: [i32; PIB_DATA_SLOTS],
}

impl Format2Record {
    /// Decode one record from its wire bytes.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() != FORMAT2_RECORD_SIZE {
            return Err(AmpError::protocol(
                "format-2 record",
                format!("expected {} bytes, got {}", FORMAT2_RECORD_SIZE, buf.len()),
            ));
        }

        let mut eeg = [0i32; EEG_CHANNEL_SLOTS];
        for (i, slot) in eeg.iter_mut().enumerate() {
            *slot = read_i32_ne(buf, OFF_EEG + i * 4);
        }
        let mut aux = [0i32; 3];
        for (i, slot) in aux.iter_mut().enumerate() {
            *slot = read_i32_ne(buf, OFF_AUX + i * 4);
        }
        let mut pib1_data = [0i32; PIB_DATA_SLOTS];
        for (i, slot) in pib1_data.iter_mut().enumerate() {
            *slot = read_i32_ne(buf, OFF_PIB1_DATA + i * 4);
        }
        let mut pib2_data = [0i32; PIB_DATA_SLOTS];
        for (i, slot) in pib2_data.iter_mut().enumerate() {
            *slot = read_i32_ne(buf, OFF_PIB2_DATA + i * 4);
        }

        Ok(Self {
            digital_inputs: u16::from_ne_bytes([buf[OFF_DIGITAL_INPUTS], buf[OFF_DIGITAL_INPUTS + 1]]),
            tr: buf[OFF_TR],
            pib1_aux: PibAuxBlock::parse(&buf[OFF_PIB1_AUX..OFF_PIB1_AUX + PibAuxBlock::SIZE]),
            pib2_aux: PibAuxBlock::parse(&buf[OFF_PIB2_AUX..OFF_PIB2_AUX + PibAuxBlock::SIZE]),
            packet_counter: read_u64_ne(buf, OFF_PACKET_COUNTER),
            timestamp: read_u64_ne(buf, OFF_TIMESTAMP),
            net_code: buf[OFF_NET_CODE],
            eeg,
            aux,
            ref_monitor: read_i32_ne(buf, OFF_REF_MONITOR),
            com_monitor: read_i32_ne(buf, OFF_COM_MONITOR),
            drive_monitor: read_i32_ne(buf, OFF_DRIVE_MONITOR),
            diagnostics_channel: read_i32_ne(buf, OFF_DIAGNOSTICS),
            current_sense: read_i32_ne(buf, OFF_CURRENT_SENSE),
            pib1_data,
            pib2_data,
        })
    }

    /// Build the physical-unit sample vector from the leading
    /// `channel_count` EEG slots: `raw as f32 * scaling_factor`.
    pub fn samples(&self, channel_count: u16, scaling_factor: f32) -> Vec<f32> {
        self.eeg[..channel_count as usize]
            .iter()
            .map(|&raw| raw as f32 * scaling_factor)
            .collect()
    }
}

fn read_i32_ne(buf: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u64_ne(buf: &[u8], offset: usize) -> u64 {
    u64::from_ne_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ])
}
