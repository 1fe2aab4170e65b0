//! Amplifier discovery and acquisition setup.
//!
//! Before streaming, the command channel answers `cmd_GetAmpDetails` with a
//! response full of parenthesized key/value pairs, for example:
//!
//! ```text
//! (sendCommand_return (status complete) (amp_type NA400) (packet_format 2)
//!  (number_of_channels 256) (legacy_board false) ...)
//! ```
//!
//! Three of those pairs drive the whole decoding pipeline (packet format,
//! channel count, amplifier model); the rest are ignored. After discovery
//! the acquisition state machine is reset with a fixed command sequence so
//! the amplifier streams at the configured rate regardless of what a prior
//! client left behind.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::net::{WireChannel, command};
use crate::types::{AmplifierType, PacketFormat};
use crate::{AmpError, Result};

/// Matches one `(key value)` pair. Value may contain spaces but never a
/// nested parenthesis, which conveniently skips the outer wrapper groups.
static DETAIL_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\w+)\s+([^()]+)\)").expect("detail pair pattern"));

/// The subset of `cmd_GetAmpDetails` a session needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmpDetails {
    pub packet_format: PacketFormat,
    /// Channel count as reported by the server. For Format 1 hardware the
    /// server reports nothing useful here and the count is refined from the
    /// net code on the first data record.
    pub channel_count: u16,
    pub amplifier_type: AmplifierType,
}

impl AmpDetails {
    /// Parse a `cmd_GetAmpDetails` response line.
    ///
    /// A reported packet format must be a known layout; a missing one means
    /// Format 2. Everything else degrades gracefully (unknown model keeps
    /// readings unscaled, missing channel count stays 0 until the net code
    /// fills it in).
    pub fn parse(response: &str) -> Result<Self> {
        let mut packet_format = None;
        let mut channel_count = 0u16;
        let mut amplifier_type = AmplifierType::Unknown;

        for capture in DETAIL_PAIR.captures_iter(response) {
            let key = &capture[1];
            let value = capture[2].trim();
            if key.contains("packet_format") {
                packet_format = match value {
                    "1" => Some(PacketFormat::Format1),
                    "2" => Some(PacketFormat::Format2),
                    other => {
                        return Err(AmpError::protocol(
                            "amplifier details",
                            format!("unsupported packet format {other:?}"),
                        ));
                    }
                };
            } else if key.contains("number_of_channels") {
                channel_count = value.parse().unwrap_or_else(|_| {
                    warn!("unparseable channel count {:?}, assuming 0", value);
                    0
                });
            } else if key.contains("amp_type") {
                if value.contains("NA300") {
                    amplifier_type = AmplifierType::NA300;
                } else if value.contains("NA400") {
                    amplifier_type = AmplifierType::NA400;
                }
            } else if key.contains("legacy_board") {
                // The NA410 reports no amp_type of its own; it is the
                // legacy-board amplifier that otherwise stays unidentified.
                if value.contains("true") && amplifier_type == AmplifierType::Unknown {
                    amplifier_type = AmplifierType::NA410;
                }
            }
        }

        // Older servers omit the key; current hardware is the default.
        let packet_format = packet_format.unwrap_or(PacketFormat::Format2);

        if amplifier_type == AmplifierType::Unknown {
            warn!("amplifier type not identified, readings stay unscaled");
        }

        Ok(Self { packet_format, channel_count, amplifier_type })
    }
}

/// Query the amplifier's details over the command channel.
pub async fn discover(channel: &mut WireChannel, amp_id: i32) -> Result<AmpDetails> {
    let response = command::send_command(channel, "cmd_GetAmpDetails", amp_id, 0, "0").await?;
    let details = AmpDetails::parse(&response)?;
    info!(
        "amplifier {}: {:?}, {:?}, {} channels",
        amp_id, details.amplifier_type, details.packet_format, details.channel_count
    );
    Ok(details)
}

/// Reset the amplifier's acquisition state and start it at the configured
/// rate.
///
/// The stop / power-cycle prefix is deliberate: AmpServer keeps acquisition
/// state across client connections, so a crashed predecessor would otherwise
/// leave the amplifier running with stale settings.
pub async fn initialize(channel: &mut WireChannel, config: &Config) -> Result<()> {
    let amp_id = config.amplifier_id;
    let rate = config.sampling_rate.to_string();

    let sequence: [(&str, &str); 6] = [
        ("cmd_Stop", "0"),
        ("cmd_SetPower", "0"),
        ("cmd_SetDecimatedRate", rate.as_str()),
        ("cmd_SetPower", "1"),
        ("cmd_Start", "0"),
        ("cmd_DefaultAcquisitionState", "0"),
    ];

    for (name, value) in sequence {
        command::send_command(channel, name, amp_id, 0, value).await?;
    }
    debug!("amplifier {} initialized at {} Hz", amp_id, config.sampling_rate);
    Ok(())
}
