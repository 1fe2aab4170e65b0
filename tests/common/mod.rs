//! In-process AmpServer stand-in for integration tests.
//!
//! Serves all three channels on loopback ephemeral ports: the command
//! channel answers every command (with a canned details line for
//! `cmd_GetAmpDetails`), the notification channel pushes one line and idles,
//! and the data channel waits for the listen command before writing the
//! prepared frames.

#![allow(dead_code)]

use ampstream::Config;
use ampstream::packet::{FORMAT1_RECORD_SIZE, FORMAT2_RECORD_SIZE};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Handle to the spawned server tasks.
pub struct MockAmpServer {
    pub config: Config,
    /// Command names received on the command channel, in arrival order.
    pub commands: mpsc::UnboundedReceiver<String>,
}

/// Spawn the three server tasks and return a config pointing at them.
///
/// With `close_data_after_frames` the data socket closes once the frames
/// are written, simulating stream loss; otherwise it stays open until the
/// client hangs up.
pub async fn spawn_amp_server(
    details: &'static str,
    frames: Vec<Vec<u8>>,
    close_data_after_frames: bool,
) -> MockAmpServer {
    let command = TcpListener::bind("127.0.0.1:0").await.expect("bind command listener");
    let notification =
        TcpListener::bind("127.0.0.1:0").await.expect("bind notification listener");
    let data = TcpListener::bind("127.0.0.1:0").await.expect("bind data listener");

    let config = Config {
        address: "127.0.0.1".to_string(),
        command_port: command.local_addr().unwrap().port(),
        notification_port: notification.local_addr().unwrap().port(),
        data_port: data.local_addr().unwrap().port(),
        ..Config::default()
    };

    let (command_tx, commands) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let Ok((sock, _)) = command.accept().await else { return };
        let mut reader = BufReader::new(sock);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            if let Some(name) = line.split_whitespace().nth(1) {
                let _ = command_tx.send(name.to_string());
            }
            let response = if line.contains("cmd_GetAmpDetails") {
                format!("{details}\n")
            } else {
                "(sendCommand_return (status complete))\n".to_string()
            };
            if reader.get_mut().write_all(response.as_bytes()).await.is_err() {
                return;
            }
        }
    });

    tokio::spawn(async move {
        let Ok((mut sock, _)) = notification.accept().await else { return };
        let _ = sock.write_all(b"(notification session_started)\n").await;
        let mut buf = [0u8; 64];
        loop {
            match sock.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    });

    tokio::spawn(async move {
        let Ok((sock, _)) = data.accept().await else { return };
        let mut reader = BufReader::new(sock);
        let mut line = String::new();
        // cmd_ListenToAmp arrives before any frame goes out.
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        for frame in &frames {
            if reader.get_mut().write_all(frame).await.is_err() {
                return;
            }
        }
        if close_data_after_frames {
            return;
        }
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    });

    MockAmpServer { config, commands }
}

/// One data-channel frame: big-endian header followed by the records.
pub fn frame(amp_id: i64, records: &[Vec<u8>]) -> Vec<u8> {
    let length: u64 = records.iter().map(|r| r.len() as u64).sum();
    let mut buf = Vec::with_capacity(16 + length as usize);
    buf.extend_from_slice(&amp_id.to_be_bytes());
    buf.extend_from_slice(&length.to_be_bytes());
    for record in records {
        buf.extend_from_slice(record);
    }
    buf
}

/// A Format-2 record with the given sequencing fields and leading EEG
/// values. Integer payload is written native-order, as the amplifier does.
pub fn format2_record(counter: u64, timestamp: u64, net_code: u8, eeg: &[i32]) -> Vec<u8> {
    let mut buf = vec![0u8; FORMAT2_RECORD_SIZE];
    buf[25..33].copy_from_slice(&counter.to_ne_bytes());
    buf[33..41].copy_from_slice(&timestamp.to_ne_bytes());
    buf[41] = net_code;
    for (i, value) in eeg.iter().enumerate() {
        buf[80 + i * 4..84 + i * 4].copy_from_slice(&value.to_ne_bytes());
    }
    buf
}

/// A Format-1 record with the given header byte 26 (net code field) and
/// leading EEG values, written big-endian.
pub fn format1_record(net_code_byte: u8, eeg: &[f32]) -> Vec<u8> {
    let mut buf = vec![0u8; FORMAT1_RECORD_SIZE];
    buf[26] = net_code_byte;
    for (i, value) in eeg.iter().enumerate() {
        buf[32 + i * 4..36 + i * 4].copy_from_slice(&value.to_bits().to_be_bytes());
    }
    buf
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
}
