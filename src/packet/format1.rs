//! Format-1 record layout (legacy float-based hardware).
//!
//! Fixed 1152-byte records, no inter-field padding:
//!
//! | offset | field |
//! |---|---|
//! | 0 | header block (8 × 32-bit words) |
//! | 32 | EEG channels (256 × f32, network byte order) |
//! | 1056 | PIB channels (7 × f32) |
//! | 1084 | unused, ref, com, unused (4 × f32) |
//! | 1100 | padding (13 × f32) |
//!
//! Only the EEG floats are converted from network to host byte order; the
//! PIB/ref/com floats are read untouched. Samples are already in physical
//! units, so no scaling applies.
//!
//! The amplifier net code lives in the header block: byte offset 26, bits
//! 3-6. It is meaningful only on the first record of a session.

use crate::{AmpError, Result};

/// On-wire size of one Format-1 record.
pub const FORMAT1_RECORD_SIZE: usize = 1152;

const EEG_CHANNEL_SLOTS: usize = 256;
const HEADER_BYTES: usize = 32;

const OFF_EEG: usize = 32;
const OFF_PIB: usize = 1056;
const OFF_REF: usize = 1088;
const OFF_COM: usize = 1092;

/// Header byte holding the net code field.
const NET_CODE_BYTE: usize = 26;
/// Bits 3-6 of that byte.
const NET_CODE_MASK: u8 = 0x78;

/// One decoded Format-1 record.
#[derive(Debug, Clone)]
pub struct Format1Record {
    /// Raw 8-word header block, kept as bytes for field extraction.
    pub header: [u8; HEADER_BYTES],
    /// EEG values converted to host byte order, in physical units.
    pub eeg: [f32; EEG_CHANNEL_SLOTS],
    pub pib: [f32; 7],
    pub reference: f32,
    pub com: f32,
}

impl Format1Record {
    /// Decode one record from its wire bytes.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() != FORMAT1_RECORD_SIZE {
            return Err(AmpError::protocol(
                "format-1 record",
                format!("expected {} bytes, got {}", FORMAT1_RECORD_SIZE, buf.len()),
            ));
        }

        let mut header = [0u8; HEADER_BYTES];
        header.copy_from_slice(&buf[..HEADER_BYTES]);

        let mut eeg = [0f32; EEG_CHANNEL_SLOTS];
        for (i, slot) in eeg.iter_mut().enumerate() {
            *slot = read_f32_be(buf, OFF_EEG + i * 4);
        }
        let mut pib = [0f32; 7];
        for (i, slot) in pib.iter_mut().enumerate() {
            *slot = read_f32_ne(buf, OFF_PIB + i * 4);
        }

        Ok(Self {
            header,
            eeg,
            pib,
            reference: read_f32_ne(buf, OFF_REF),
            com: read_f32_ne(buf, OFF_COM),
        })
    }

    /// Net code embedded in the header block.
    pub fn net_code(&self) -> u8 {
        (self.header[NET_CODE_BYTE] & NET_CODE_MASK) >> 3
    }

    /// The leading `channel_count` EEG values, already physical units.
    pub fn samples(&self, channel_count: u16) -> Vec<f32> {
        self.eeg[..channel_count as usize].to_vec()
    }
}

fn read_f32_be(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

fn read_f32_ne(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(u32::from_ne_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetCode;

    /// Build a wire record with the given net code byte and EEG values
    /// (written big-endian, as the amplifier does).
    fn wire_record(net_code_byte: u8, eeg: &[f32]) -> Vec<u8> {
        let mut buf = vec![0u8; FORMAT1_RECORD_SIZE];
        buf[NET_CODE_BYTE] = net_code_byte;
        for (i, value) in eeg.iter().enumerate() {
            buf[OFF_EEG + i * 4..OFF_EEG + i * 4 + 4]
                .copy_from_slice(&value.to_bits().to_be_bytes());
        }
        buf
    }

    #[test]
    fn record_size_matches_packed_layout() {
        // 8 header words + 256 EEG + 7 PIB + 4 ref/com/unused + 13 padding
        assert_eq!(FORMAT1_RECORD_SIZE, (8 + 256 + 7 + 4 + 13) * 4);
    }

    #[test]
    fn eeg_floats_are_converted_from_network_order() {
        let buf = wire_record(0, &[1.5, -2.25, 1e-6]);
        let record = Format1Record::parse(&buf).unwrap();
        assert_eq!(record.eeg[0], 1.5);
        assert_eq!(record.eeg[1], -2.25);
        assert_eq!(record.eeg[2], 1e-6);

        let samples = record.samples(3);
        assert_eq!(samples, vec![1.5, -2.25, 1e-6]);
    }

    #[test]
    fn net_code_is_bits_3_to_6_of_header_byte_26() {
        // 0b01010000: bits 3-6 hold 0b1010 = 10 (MCGSN 256-channel net)
        let record = Format1Record::parse(&wire_record(0x50, &[])).unwrap();
        assert_eq!(record.net_code(), 10);
        assert_eq!(NetCode::from_wire(record.net_code()).channel_count(), 256);

        // 0b00010000: bits 3-6 hold 0b0010 = 2 (GSN 256-channel net)
        let record = Format1Record::parse(&wire_record(0x10, &[])).unwrap();
        assert_eq!(record.net_code(), 2);
        assert_eq!(NetCode::from_wire(record.net_code()).channel_count(), 256);

        // Bits outside the mask are ignored
        let record = Format1Record::parse(&wire_record(0x87, &[])).unwrap();
        assert_eq!(record.net_code(), 0);
    }

    #[test]
    fn short_buffer_is_rejected() {
        let result = Format1Record::parse(&[0u8; 100]);
        assert!(matches!(result, Err(AmpError::Protocol { .. })));
    }
}
