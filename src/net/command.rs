//! Text command framing.
//!
//! Every command, on both the command channel and the data channel, is one
//! line of the shape `(sendCommand <NAME> <AMPID> <CHANNEL> <VALUE>)`.
//! The command channel answers each command with exactly one response line;
//! the data channel never answers (it is only commanded to start/stop
//! listening before switching to binary framing).

use tracing::{debug, trace};

use crate::net::WireChannel;
use crate::{AmpError, Result};

/// Render the single-line wire form of a command, newline included.
pub fn format_command(name: &str, amp_id: i32, channel: i32, value: &str) -> String {
    format!("(sendCommand {name} {amp_id} {channel} {value})\n")
}

/// Send a command over the command channel and return the one-line response
/// verbatim for the caller to parse.
///
/// A failed response read is a protocol error: the server acknowledged the
/// connection but broke the request/response contract.
pub async fn send_command(
    channel: &mut WireChannel,
    name: &str,
    amp_id: i32,
    cmd_channel: i32,
    value: &str,
) -> Result<String> {
    let line = format_command(name, amp_id, cmd_channel, value);
    trace!("sending command: {}", line.trim_end());
    channel.write_all(line.as_bytes()).await?;

    let response = channel
        .read_line()
        .await
        .map_err(|e| AmpError::protocol(format!("{name} response"), e.to_string()))?;
    debug!("{} -> {}", name, response);
    Ok(response)
}

/// Send a command over the data channel without reading a response.
///
/// Used for the listen / stop-listening pair that frames the streaming
/// phase.
pub async fn send_datastream_command(
    channel: &mut WireChannel,
    name: &str,
    amp_id: i32,
    cmd_channel: i32,
    value: &str,
) -> Result<()> {
    let line = format_command(name, amp_id, cmd_channel, value);
    trace!("sending datastream command: {}", line.trim_end());
    channel.write_all(line.as_bytes()).await
}
