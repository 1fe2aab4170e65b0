//! Async client for EGI AmpServer EEG amplifiers.
//!
//! AmpServer exposes one amplifier over three TCP channels: a text
//! command channel, a push notification channel, and a binary data channel.
//! This crate drives all three as a single [`Session`]: it discovers the
//! amplifier model and record format, resets and starts acquisition, then
//! decodes the record stream into per-sample `Vec<f32>` vectors in physical
//! units and hands them to a [`SampleSink`].
//!
//! Both wire record formats are supported (the legacy float layout and the
//! current integer layout with packet sequencing), with duplicate records
//! suppressed and counter gaps surfaced in the logs.
//!
//! A lost stream is not retried internally. The error taxonomy separates
//! fatal setup failures from stream loss ([`AmpError::is_stream_loss`]);
//! callers recover from the latter by building a fresh session.
//!
//! # Example
//!
//! ```no_run
//! use ampstream::{channel_sink, Config, Session};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> ampstream::Result<()> {
//! let config = Config { address: "10.0.0.42".into(), ..Config::default() };
//! let (sink, mut stream) = channel_sink(1024);
//!
//! let mut session = Session::connect(config, sink).await?;
//! let cancel = CancellationToken::new();
//!
//! tokio::spawn(async move {
//!     if let Some(descriptor) = stream.descriptor().await {
//!         println!("streaming {} channels", descriptor.channel_count);
//!     }
//!     while let Some(sample) = stream.next_sample().await {
//!         // feed sample downstream
//!         let _ = sample;
//!     }
//! });
//!
//! session.run_stream(&cancel).await?;
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
mod error;
pub mod net;
pub mod notifications;
pub mod packet;
pub mod sequencer;
pub mod session;
pub mod sink;
pub mod types;

pub use config::Config;
pub use error::{AmpError, Result};
pub use session::{Session, SessionState};
pub use sink::{ChannelSink, SampleSink, SampleStream, channel_sink};
pub use types::{AmplifierType, NetCode, PacketFormat, StreamDescriptor};
