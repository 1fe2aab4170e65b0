//! Notification channel listener.
//!
//! AmpServer pushes free-form status lines on a dedicated port. They carry
//! no protocol state, so the listener is a fire-and-forget task: each line
//! is logged and discarded. Read failures on this channel never fail the
//! session; the task just winds down, and a quiet second ends it too.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::net::WireChannel;

const READ_DEADLINE: Duration = Duration::from_secs(1);

/// Handle to the background task draining the notification channel.
pub struct NotificationListener {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl NotificationListener {
    /// Spawn the listener on the given channel. The task exits when the
    /// token fires, the channel errors, or the server goes quiet.
    pub fn spawn(mut channel: WireChannel, cancel: CancellationToken) -> Self {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            channel.set_timeout(READ_DEADLINE);
            loop {
                let line = tokio::select! {
                    _ = token.cancelled() => {
                        debug!("notification listener cancelled");
                        return;
                    }
                    result = channel.read_line() => match result {
                        Ok(line) => line,
                        Err(e) => {
                            debug!("notification channel closed: {}", e);
                            return;
                        }
                    },
                };
                if !line.is_empty() {
                    info!("amplifier notification: {}", line);
                }
            }
        });
        Self { handle, cancel }
    }

    /// Cancel the listener and wait for it to finish.
    pub async fn join(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
