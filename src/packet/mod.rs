//! Binary framing and record layouts of the data channel.
//!
//! During streaming the data channel carries a sequence of frames: one
//! [`FrameHeader`] (16 bytes, big-endian) followed by `length / record_size`
//! fixed-size records with no padding between them. The record layout is one
//! of two mutually exclusive formats selected once at discovery:
//!
//! - [`Format1Record`]: legacy float-based layout, EEG in network byte order
//! - [`Format2Record`]: current integer-based layout with packet sequencing
//!
//! A frame length that is not an exact multiple of the active record size is
//! a protocol violation; no partial record is ever decoded.

mod format1;
mod format2;

pub use format1::{FORMAT1_RECORD_SIZE, Format1Record};
pub use format2::{FORMAT2_RECORD_SIZE, Format2Record, PibAuxBlock};

use crate::net::WireChannel;
use crate::{AmpError, Result};

/// Frame header preceding each batch of records on the data channel.
///
/// Both fields are big-endian on the wire, unlike the record payloads that
/// follow (see the format modules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Amplifier id echoed by the server.
    pub amp_id: i64,

    /// Total byte length of the records that follow.
    pub length: u64,
}

impl FrameHeader {
    /// On-wire size of the header.
    pub const SIZE: usize = 16;

    /// Read one header from the data channel.
    pub async fn read_from(channel: &mut WireChannel) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        channel.read_exact(&mut buf).await?;
        Ok(Self::parse(&buf))
    }

    /// Decode a header from its 16 wire bytes.
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        let amp_id = i64::from_be_bytes([
            buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
        ]);
        let length = u64::from_be_bytes([
            buf[8], buf[9], buf[10], buf[11], buf[12], buf[13], buf[14], buf[15],
        ]);
        Self { amp_id, length }
    }

    /// Number of whole records announced by this header.
    ///
    /// Any remainder means the server and client disagree about the record
    /// layout; that is unrecoverable, so it is rejected rather than decoded
    /// partially.
    pub fn record_count(&self, record_size: usize) -> Result<usize> {
        if self.length % record_size as u64 != 0 {
            return Err(AmpError::protocol(
                "frame header",
                format!(
                    "frame length {} is not a multiple of the record size {}",
                    self.length, record_size
                ),
            ));
        }
        Ok((self.length / record_size as u64) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_are_big_endian() {
        let mut buf = [0u8; FrameHeader::SIZE];
        buf[..8].copy_from_slice(&3i64.to_be_bytes());
        buf[8..].copy_from_slice(&(2 * FORMAT2_RECORD_SIZE as u64).to_be_bytes());

        let header = FrameHeader::parse(&buf);
        assert_eq!(header.amp_id, 3);
        assert_eq!(header.length, 2 * FORMAT2_RECORD_SIZE as u64);
        assert_eq!(header.record_count(FORMAT2_RECORD_SIZE).unwrap(), 2);
    }

    #[test]
    fn negative_amp_id_survives_decoding() {
        let mut buf = [0u8; FrameHeader::SIZE];
        buf[..8].copy_from_slice(&(-1i64).to_be_bytes());
        buf[8..].copy_from_slice(&0u64.to_be_bytes());

        let header = FrameHeader::parse(&buf);
        assert_eq!(header.amp_id, -1);
        assert_eq!(header.record_count(FORMAT1_RECORD_SIZE).unwrap(), 0);
    }

    #[test]
    fn non_multiple_length_is_rejected() {
        let header = FrameHeader { amp_id: 0, length: FORMAT2_RECORD_SIZE as u64 + 1 };
        let result = header.record_count(FORMAT2_RECORD_SIZE);
        assert!(matches!(result, Err(AmpError::Protocol { .. })));

        let header = FrameHeader { amp_id: 0, length: FORMAT1_RECORD_SIZE as u64 - 1 };
        assert!(header.record_count(FORMAT1_RECORD_SIZE).is_err());
    }
}
