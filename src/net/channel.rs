//! Byte-stream channel over one TCP connection.
//!
//! AmpServer speaks over three of these (command, notification, data). The
//! channel owns its socket exclusively and carries a re-armable read
//! deadline: phases of the protocol use different deadlines (short connect
//! timeout, effectively unbounded command reads after handshake, per-header
//! and per-record liveness deadlines while streaming).
//!
//! There is no retry at this layer. A timed-out or short read is surfaced
//! as stream loss; a failed connect or write as a connection error.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::{AmpError, Result};

/// A read deadline long enough to never fire in practice (one year).
///
/// Used on the command channel after the handshake, where the server may
/// legitimately take arbitrarily long between responses.
pub const EFFECTIVELY_UNBOUNDED: Duration = Duration::from_secs(365 * 24 * 3600);

/// One TCP channel with a settable read deadline.
pub struct WireChannel {
    reader: BufReader<TcpStream>,
    deadline: Duration,
    label: &'static str,
}

impl WireChannel {
    /// Connect to `host:port`, failing if the connection is not established
    /// within `connect_timeout`. The connect timeout also becomes the
    /// initial read deadline until [`set_timeout`](Self::set_timeout) is
    /// called.
    pub async fn connect(
        label: &'static str,
        host: &str,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let stream = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                AmpError::connection_failed(format!(
                    "{label} channel: no connection to {addr} within {connect_timeout:?}"
                ))
            })?
            .map_err(|e| {
                AmpError::connection_failed_with_source(
                    format!("{label} channel: connect to {addr} failed"),
                    Box::new(e),
                )
            })?;

        trace!("{} channel connected to {}", label, addr);

        Ok(Self { reader: BufReader::new(stream), deadline: connect_timeout, label })
    }

    /// Rearm the read deadline used by subsequent reads.
    pub fn set_timeout(&mut self, deadline: Duration) {
        self.deadline = deadline;
    }

    /// Read one newline-delimited text line, without the trailing newline.
    ///
    /// Fails with stream loss on timeout, EOF, or any read error.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = timeout(self.deadline, self.reader.read_line(&mut line))
            .await
            .map_err(|_| {
                AmpError::stream_lost(format!(
                    "{} channel: no line within {:?}",
                    self.label, self.deadline
                ))
            })?
            .map_err(|e| {
                AmpError::stream_lost_with_source(
                    format!("{} channel: line read failed", self.label),
                    Box::new(e),
                )
            })?;

        if n == 0 {
            return Err(AmpError::stream_lost(format!(
                "{} channel: connection closed by server",
                self.label
            )));
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Read exactly `buf.len()` bytes.
    ///
    /// Fails with stream loss on timeout, EOF, or short read; the buffer
    /// contents are unspecified on failure.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        timeout(self.deadline, self.reader.read_exact(buf))
            .await
            .map_err(|_| {
                AmpError::stream_lost(format!(
                    "{} channel: {} bytes not received within {:?}",
                    self.label,
                    buf.len(),
                    self.deadline
                ))
            })?
            .map_err(|e| {
                AmpError::stream_lost_with_source(
                    format!("{} channel: exact read of {} bytes failed", self.label, buf.len()),
                    Box::new(e),
                )
            })?;
        Ok(())
    }

    /// Write all bytes, fire-and-forget. Fails with a connection error.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(bytes).await.map_err(|e| {
            AmpError::connection_failed_with_source(
                format!("{} channel: write failed", self.label),
                Box::new(e),
            )
        })?;
        stream.flush().await.map_err(|e| {
            AmpError::connection_failed_with_source(
                format!("{} channel: flush failed", self.label),
                Box::new(e),
            )
        })?;
        Ok(())
    }
}
