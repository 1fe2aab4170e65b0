//! Amplifier session lifecycle.
//!
//! A [`Session`] walks the fixed protocol sequence: connect the three
//! channels, discover the amplifier, reset and start acquisition, subscribe
//! on the data channel, then stream records until cancelled or the stream
//! is lost. Any failure before streaming is fatal; the session is simply
//! never constructed. During streaming, the only recoverable condition is
//! stream loss, and recovery means the caller builds a fresh session.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::discovery;
use crate::net::{EFFECTIVELY_UNBOUNDED, WireChannel, command};
use crate::notifications::NotificationListener;
use crate::packet::{FORMAT1_RECORD_SIZE, FORMAT2_RECORD_SIZE, Format1Record, Format2Record,
    FrameHeader};
use crate::sequencer::{SequenceDecision, StreamSequencer};
use crate::sink::SampleSink;
use crate::types::{AmplifierType, NetCode, PacketFormat, StreamDescriptor};
use crate::Result;

const COMMAND_CONNECT_DEADLINE: Duration = Duration::from_secs(2);
const NOTIFICATION_CONNECT_DEADLINE: Duration = Duration::from_secs(2);
const DATA_CONNECT_DEADLINE: Duration = Duration::from_secs(5);
/// Liveness deadline for each frame header while streaming.
const HEADER_DEADLINE: Duration = Duration::from_secs(5);
/// Per-record deadline used by the Format-1 loop.
const RECORD_DEADLINE: Duration = Duration::from_secs(1);
/// Read deadline for the best-effort teardown commands.
const DISCONNECT_DEADLINE: Duration = Duration::from_secs(2);

/// Resolved per-session decoding parameters.
///
/// `channel_count` may start at 0 (the server reports nothing useful for
/// Format-1 hardware) and is frozen after the first data record.
#[derive(Debug, Clone, Copy)]
pub struct SessionState {
    pub amplifier_type: AmplifierType,
    pub packet_format: PacketFormat,
    pub channel_count: u16,
    pub scaling_factor: f32,
}

/// The channel count to stream with: a nonzero net code wins over whatever
/// discovery reported.
fn resolve_channel_count(discovered: u16, net_code: u8) -> u16 {
    match NetCode::from_wire(net_code).channel_count() {
        0 => discovered,
        from_net => from_net,
    }
}

/// One connected amplifier session.
pub struct Session<S: SampleSink> {
    config: Config,
    state: SessionState,
    command: WireChannel,
    data: WireChannel,
    sink: S,
    sequencer: StreamSequencer,
    notifications: Option<NotificationListener>,
    cancel: CancellationToken,
    announced: bool,
}

impl<S: SampleSink> Session<S> {
    /// Connect all three channels, discover the amplifier, and start
    /// acquisition. On success the amplifier is streaming and
    /// [`run_stream`](Self::run_stream) may be called.
    pub async fn connect(config: Config, sink: S) -> Result<Self> {
        config.validate()?;

        let mut command_channel = WireChannel::connect(
            "command",
            &config.address,
            config.command_port,
            COMMAND_CONNECT_DEADLINE,
        )
        .await?;
        // The server may legitimately take long between command responses.
        command_channel.set_timeout(EFFECTIVELY_UNBOUNDED);

        let notification_channel = WireChannel::connect(
            "notification",
            &config.address,
            config.notification_port,
            NOTIFICATION_CONNECT_DEADLINE,
        )
        .await?;

        let mut data_channel = WireChannel::connect(
            "data",
            &config.address,
            config.data_port,
            DATA_CONNECT_DEADLINE,
        )
        .await?;

        let details = discovery::discover(&mut command_channel, config.amplifier_id).await?;
        discovery::initialize(&mut command_channel, &config).await?;

        command::send_datastream_command(
            &mut data_channel,
            "cmd_ListenToAmp",
            config.amplifier_id,
            0,
            "0",
        )
        .await?;

        let cancel = CancellationToken::new();
        let notifications =
            NotificationListener::spawn(notification_channel, cancel.clone());

        let state = SessionState {
            amplifier_type: details.amplifier_type,
            packet_format: details.packet_format,
            channel_count: details.channel_count,
            scaling_factor: details.amplifier_type.scaling_factor(),
        };
        info!(
            "session established with amplifier {} ({:?}, {:?})",
            config.amplifier_id, state.amplifier_type, state.packet_format
        );

        let sequencer = StreamSequencer::new(config.sampling_rate);
        Ok(Self {
            config,
            state,
            command: command_channel,
            data: data_channel,
            sink,
            sequencer,
            notifications: Some(notifications),
            cancel,
            announced: false,
        })
    }

    /// The parameters resolved for this session.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The most recent hardware timestamp checkpoint (Format 2 only).
    pub fn timestamp_checkpoint(&self) -> u64 {
        self.sequencer.checkpoint()
    }

    /// Stream records to the sink until `cancel` fires (checked once per
    /// frame) or the stream fails.
    ///
    /// A returned error means the session is over; the channels are left in
    /// an unspecified state and only [`disconnect`](Self::disconnect)
    /// remains meaningful.
    pub async fn run_stream(&mut self, cancel: &CancellationToken) -> Result<()> {
        match self.state.packet_format {
            PacketFormat::Format2 => self.stream_format2(cancel).await,
            PacketFormat::Format1 => self.stream_format1(cancel).await,
        }
    }

    async fn stream_format2(&mut self, cancel: &CancellationToken) -> Result<()> {
        let mut buf = vec![0u8; FORMAT2_RECORD_SIZE];
        self.data.set_timeout(HEADER_DEADLINE);

        while !cancel.is_cancelled() {
            let header = FrameHeader::read_from(&mut self.data).await?;
            let count = header.record_count(FORMAT2_RECORD_SIZE)?;
            debug!("frame from amp {}: {} records", header.amp_id, count);

            for _ in 0..count {
                self.data.read_exact(&mut buf).await?;
                let record = Format2Record::parse(&buf)?;
                self.announce_once(header.amp_id, record.net_code).await;

                match self.sequencer.observe(record.packet_counter, record.timestamp) {
                    SequenceDecision::Duplicate => continue,
                    SequenceDecision::Emit | SequenceDecision::EmitAfterGap(_) => {}
                }

                let sample =
                    record.samples(self.state.channel_count, self.state.scaling_factor);
                self.sink.push_sample(sample).await;
            }
        }
        Ok(())
    }

    async fn stream_format1(&mut self, cancel: &CancellationToken) -> Result<()> {
        let mut buf = vec![0u8; FORMAT1_RECORD_SIZE];

        while !cancel.is_cancelled() {
            self.data.set_timeout(HEADER_DEADLINE);
            let header = FrameHeader::read_from(&mut self.data).await?;
            let count = header.record_count(FORMAT1_RECORD_SIZE)?;
            debug!("frame from amp {}: {} records", header.amp_id, count);

            self.data.set_timeout(RECORD_DEADLINE);
            for _ in 0..count {
                self.data.read_exact(&mut buf).await?;
                let record = Format1Record::parse(&buf)?;
                self.announce_once(header.amp_id, record.net_code()).await;
                self.sink.push_sample(record.samples(self.state.channel_count)).await;
            }
        }
        Ok(())
    }

    /// Resolve the channel count from the first record's net code and
    /// announce the stream. Later records never change the count.
    async fn announce_once(&mut self, wire_amp_id: i64, net_code: u8) {
        if self.announced {
            return;
        }
        self.state.channel_count =
            resolve_channel_count(self.state.channel_count, net_code);

        let descriptor =
            StreamDescriptor::new(&self.config, wire_amp_id, self.state.channel_count);
        info!(
            "announcing stream {:?}: {} channels at {} Hz",
            descriptor.name, descriptor.channel_count, descriptor.sampling_rate
        );
        self.sink.announce(&descriptor).await;
        self.announced = true;
    }

    /// Stop acquisition and tear the session down.
    ///
    /// Every step is best-effort: a half-dead server must not keep the
    /// teardown from completing. Always joins the notification listener.
    pub async fn disconnect(mut self) {
        let amp_id = self.config.amplifier_id;

        if let Err(e) = command::send_datastream_command(
            &mut self.data,
            "cmd_StopListeningToAmp",
            amp_id,
            0,
            "0",
        )
        .await
        {
            debug!("stop-listening failed during disconnect: {}", e);
        }

        self.command.set_timeout(DISCONNECT_DEADLINE);
        for (name, value) in [("cmd_Stop", "0"), ("cmd_SetPower", "0")] {
            if let Err(e) =
                command::send_command(&mut self.command, name, amp_id, 0, value).await
            {
                debug!("{} failed during disconnect: {}", name, e);
            }
        }

        if let Some(notifications) = self.notifications.take() {
            notifications.join().await;
        }
        info!("session with amplifier {} closed", amp_id);
    }
}

impl<S: SampleSink> Drop for Session<S> {
    fn drop(&mut self) {
        // Backstop for sessions dropped without disconnect().
        self.cancel.cancel();
    }
}
