//! Sample delivery seam.
//!
//! A [`SampleSink`] receives one stream announcement followed by sample
//! vectors, one per delivered record. Delivery is infallible from the
//! session's point of view: a sink that cannot keep up decides for itself
//! whether to block, buffer, or shed, and the session keeps decoding either
//! way.
//!
//! [`channel_sink`] is the built-in implementation, bridging a session into
//! channel land: a watch channel for the announcement and a bounded mpsc
//! channel for samples, consumed as a [`SampleStream`].

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::types::StreamDescriptor;

/// Receiver of one announced stream and its samples.
#[async_trait]
pub trait SampleSink: Send {
    /// Called exactly once, before any sample, as soon as the channel
    /// count and amplifier identity are known.
    async fn announce(&mut self, descriptor: &StreamDescriptor);

    /// Deliver one sample vector (`channel_count` values, physical units).
    async fn push_sample(&mut self, sample: Vec<f32>);
}

/// Channel-backed sink half. Created by [`channel_sink`].
pub struct ChannelSink {
    descriptor_tx: watch::Sender<Option<StreamDescriptor>>,
    sample_tx: mpsc::Sender<Vec<f32>>,
}

/// Consumer half of [`channel_sink`].
pub struct SampleStream {
    descriptor_rx: watch::Receiver<Option<StreamDescriptor>>,
    samples: mpsc::Receiver<Vec<f32>>,
}

/// Build a connected sink/stream pair with the given sample buffer
/// capacity.
///
/// When the buffer is full, the newest sample is dropped rather than
/// stalling the network reader; a slow consumer loses data, not liveness.
pub fn channel_sink(capacity: usize) -> (ChannelSink, SampleStream) {
    let (descriptor_tx, descriptor_rx) = watch::channel(None);
    let (sample_tx, samples) = mpsc::channel(capacity);
    (ChannelSink { descriptor_tx, sample_tx }, SampleStream { descriptor_rx, samples })
}

#[async_trait]
impl SampleSink for ChannelSink {
    async fn announce(&mut self, descriptor: &StreamDescriptor) {
        let _ = self.descriptor_tx.send(Some(descriptor.clone()));
    }

    async fn push_sample(&mut self, sample: Vec<f32>) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.sample_tx.try_send(sample) {
            warn!("sample buffer full, dropping sample");
        }
    }
}

impl SampleStream {
    /// Wait for the stream announcement.
    ///
    /// Returns `None` when the session ends before announcing.
    pub async fn descriptor(&mut self) -> Option<StreamDescriptor> {
        let value = self.descriptor_rx.wait_for(|d| d.is_some()).await.ok()?;
        value.as_ref().cloned()
    }

    /// Receive the next sample, or `None` once the session is gone and the
    /// buffer is drained.
    pub async fn next_sample(&mut self) -> Option<Vec<f32>> {
        self.samples.recv().await
    }

    /// Turn the sample side into a `Stream` of sample vectors.
    pub fn into_samples(self) -> ReceiverStream<Vec<f32>> {
        ReceiverStream::new(self.samples)
    }
}
