//! Error types for AmpServer sessions.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The taxonomy follows the protocol's failure stages:
//!
//! - **Connection**: a channel could not be established or written to.
//!   Fatal before streaming starts; the session never reaches the stream loop.
//! - **Protocol**: a discovery/init response was malformed, or the data
//!   channel violated the binary framing (e.g. a frame length that is not an
//!   exact multiple of the record size). Fatal at the same stage.
//! - **StreamLost**: a read timeout, EOF, or short read during streaming.
//!   Terminates the stream loop only; reported to the caller, never a panic.
//! - **Timeout**: an operation-level deadline elapsed outside the stream loop.
//!
//! Failures inside the notification listener are swallowed at the source and
//! never surface here.
//!
//! No layer retries automatically; restart policy belongs to the caller.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for amplifier session operations.
pub type Result<T, E = AmpError> = std::result::Result<T, E>;

/// Main error type for AmpServer client operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AmpError {
    #[error("Failed to connect to AmpServer: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Protocol error in {context}: {details}")]
    Protocol { context: String, details: String },

    #[error("Data stream lost: {reason}")]
    StreamLost {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl AmpError {
    /// Returns whether this error aborts the whole connect sequence.
    ///
    /// Fatal errors occur before streaming and leave the session unusable.
    /// `StreamLost` is not fatal in this sense: it only terminates the
    /// stream loop, and teardown still runs.
    pub fn is_fatal(&self) -> bool {
        match self {
            AmpError::Connection { .. } => true,
            AmpError::Protocol { .. } => true,
            AmpError::Timeout { .. } => true,
            AmpError::StreamLost { .. } => false,
        }
    }

    /// Returns whether this error signals loss of the data stream.
    pub fn is_stream_loss(&self) -> bool {
        matches!(self, AmpError::StreamLost { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AmpError::Connection { .. } => vec![
                "Ensure AmpServer is running on the amplifier host",
                "Check the configured address and command/notification/data ports",
                "Verify the amplifier is powered on and reachable",
            ],
            AmpError::Protocol { .. } => vec![
                "Check the amplifier firmware/AmpServer version",
                "Verify the amplifier id matches an attached amplifier",
            ],
            AmpError::StreamLost { .. } => vec![
                "Check the network link to the amplifier",
                "Reconnect the session; no automatic retry is performed",
            ],
            AmpError::Timeout { .. } => {
                vec!["Increase the channel timeout", "Verify AmpServer is responding"]
            }
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        AmpError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AmpError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for protocol errors.
    pub fn protocol(context: impl Into<String>, details: impl Into<String>) -> Self {
        AmpError::Protocol { context: context.into(), details: details.into() }
    }

    /// Helper constructor for stream loss.
    pub fn stream_lost(reason: impl Into<String>) -> Self {
        AmpError::StreamLost { reason: reason.into(), source: None }
    }

    /// Helper constructor for stream loss with source.
    pub fn stream_lost_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        AmpError::StreamLost { reason: reason.into(), source: Some(source) }
    }
}
