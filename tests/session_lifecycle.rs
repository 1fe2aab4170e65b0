//! End-to-end session tests against an in-process AmpServer stand-in.

mod common;

use ampstream::packet::FORMAT2_RECORD_SIZE;
use ampstream::{AmpError, Config, Session, channel_sink};
use common::*;
use tokio_util::sync::CancellationToken;

const NA300_FORMAT2: &str = "(sendCommand_return (status complete) (amp_type NA300) \
    (legacy_board false) (packet_format 2) (number_of_channels 256))";
const NA300_FORMAT1: &str = "(sendCommand_return (status complete) (amp_type NA300) \
    (packet_format 1) (number_of_channels 0))";

const NA300_SCALE: f32 = 0.0244140625;

#[tokio::test]
async fn format2_session_streams_scaled_deduplicated_samples() {
    init_tracing();

    // Counters 1, 2, 2, 5: one duplicate (dropped) and one gap (kept).
    let records = vec![
        format2_record(1, 10, 0, &[100]),
        format2_record(2, 20, 0, &[200]),
        format2_record(2, 20, 0, &[200]),
        format2_record(5, 50, 0, &[500]),
    ];
    let mut server = spawn_amp_server(NA300_FORMAT2, vec![frame(3, &records)], true).await;
    let config = Config { stream_name: String::new(), ..server.config.clone() };

    let (sink, mut stream) = channel_sink(64);
    let session = Session::connect(config, sink).await.expect("session should connect");
    assert_eq!(session.state().channel_count, 256);

    // Discovery then the fixed acquisition-reset sequence, in order.
    for expected in [
        "cmd_GetAmpDetails",
        "cmd_Stop",
        "cmd_SetPower",
        "cmd_SetDecimatedRate",
        "cmd_SetPower",
        "cmd_Start",
        "cmd_DefaultAcquisitionState",
    ] {
        assert_eq!(server.commands.recv().await.as_deref(), Some(expected));
    }

    let cancel = CancellationToken::new();
    let streamer = tokio::spawn(async move {
        let mut session = session;
        let result = session.run_stream(&cancel).await;
        (session, result)
    });

    let descriptor = stream.descriptor().await.expect("stream should be announced");
    // Net code 0 (GSN 64-channel) overrides the discovered 256.
    assert_eq!(descriptor.channel_count, 64);
    assert_eq!(descriptor.name, "EGI NetAmp 3");
    assert_eq!(descriptor.sampling_rate, 1000);

    let first = stream.next_sample().await.expect("first sample");
    assert_eq!(first.len(), 64);
    assert_eq!(first[0], 100.0 * NA300_SCALE);

    let second = stream.next_sample().await.expect("second sample");
    assert_eq!(second[0], 200.0 * NA300_SCALE);

    // The duplicate of counter 2 never shows up; counter 5 follows directly.
    let third = stream.next_sample().await.expect("third sample");
    assert_eq!(third[0], 500.0 * NA300_SCALE);

    let (session, result) = streamer.await.unwrap();
    let err = result.expect_err("server closed the data channel");
    assert!(err.is_stream_loss());
    assert_eq!(session.timestamp_checkpoint(), 10);

    session.disconnect().await;

    // Best-effort teardown still reaches the command channel.
    assert_eq!(server.commands.recv().await.as_deref(), Some("cmd_Stop"));
    assert_eq!(server.commands.recv().await.as_deref(), Some("cmd_SetPower"));
}

#[tokio::test]
async fn format1_session_resolves_channels_from_the_header_net_code() {
    init_tracing();

    // Header byte 26 = 0x18: net code 3, a 32-channel HydroCel net.
    let records = vec![format1_record(0x18, &[1.5, -3.0]), format1_record(0x18, &[2.5, 4.0])];
    let config = spawn_amp_server(NA300_FORMAT1, vec![frame(0, &records)], true).await.config;

    let (sink, mut stream) = channel_sink(64);
    let session = Session::connect(config, sink).await.expect("session should connect");
    assert_eq!(session.state().channel_count, 0);

    let cancel = CancellationToken::new();
    let streamer = tokio::spawn(async move {
        let mut session = session;
        let result = session.run_stream(&cancel).await;
        (session, result)
    });

    let descriptor = stream.descriptor().await.expect("stream should be announced");
    assert_eq!(descriptor.channel_count, 32);

    // Format 1 carries physical units already; no scaling applied.
    let first = stream.next_sample().await.expect("first sample");
    assert_eq!(first.len(), 32);
    assert_eq!(first[0], 1.5);
    assert_eq!(first[1], -3.0);

    let second = stream.next_sample().await.expect("second sample");
    assert_eq!(second[0], 2.5);

    let (session, result) = streamer.await.unwrap();
    assert!(result.expect_err("server closed the data channel").is_stream_loss());
    session.disconnect().await;
}

#[tokio::test]
async fn cancelled_token_stops_streaming_cleanly() {
    let config = spawn_amp_server(NA300_FORMAT2, vec![], false).await.config;

    let (sink, _stream) = channel_sink(64);
    let mut session = Session::connect(config, sink).await.expect("session should connect");

    let cancel = CancellationToken::new();
    cancel.cancel();
    session.run_stream(&cancel).await.expect("cancelled stream ends without error");

    session.disconnect().await;
}

#[tokio::test]
async fn frame_length_mismatch_is_a_protocol_error() {
    // Header announces a length that is not a record-size multiple.
    let mut bad_frame = Vec::new();
    bad_frame.extend_from_slice(&0i64.to_be_bytes());
    bad_frame.extend_from_slice(&(FORMAT2_RECORD_SIZE as u64 + 1).to_be_bytes());
    let config = spawn_amp_server(NA300_FORMAT2, vec![bad_frame], false).await.config;

    let (sink, _stream) = channel_sink(64);
    let mut session = Session::connect(config, sink).await.expect("session should connect");

    let cancel = CancellationToken::new();
    let err = session.run_stream(&cancel).await.expect_err("mismatched frame must fail");
    assert!(matches!(err, AmpError::Protocol { .. }));
    assert!(err.is_fatal());

    session.disconnect().await;
}

#[tokio::test]
async fn unsupported_packet_format_fails_the_connect() {
    let config = spawn_amp_server(
        "(sendCommand_return (status complete) (packet_format 3) (amp_type NA300))",
        vec![],
        false,
    )
    .await
    .config;

    let (sink, _stream) = channel_sink(64);
    let Err(err) = Session::connect(config, sink).await else {
        panic!("discovery must reject an unknown packet format");
    };
    assert!(matches!(err, AmpError::Protocol { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn unreachable_server_fails_the_connect() {
    // Bind then drop to get ports nothing listens on.
    let reserved = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = reserved.local_addr().unwrap().port();
    drop(reserved);

    let config = Config {
        address: "127.0.0.1".to_string(),
        command_port: port,
        notification_port: port,
        data_port: port,
        ..Config::default()
    };

    let (sink, _stream) = channel_sink(64);
    let Err(err) = Session::connect(config, sink).await else {
        panic!("connect to a dead port must fail");
    };
    assert!(matches!(err, AmpError::Connection { .. }));
    assert!(err.is_fatal());
    assert!(!err.recovery_suggestions().is_empty());
}
