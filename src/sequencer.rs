//! Packet-counter sequencing for Format-2 streams.
//!
//! Format-2 records carry a monotonically increasing packet counter and a
//! hardware timestamp. The sequencer classifies each record against the one
//! before it: a repeated counter is a duplicate (the record must be
//! suppressed so the same sample is never delivered twice), any other
//! non-successor is a gap (logged, but the record itself is still valid and
//! is delivered). Nothing here pauses or resynchronizes the stream.
//!
//! The checks are armed only once a nonzero counter has been seen, so the
//! first record of a session is always accepted. Counter comparison uses
//! wrapping arithmetic but no wraparound-aware ordering, matching the
//! amplifier's own bookkeeping.
//!
//! The sequencer also keeps a timestamp checkpoint, refreshed twice per
//! second of nominal acquisition, for drift diagnostics.

use tracing::{debug, warn};

/// What to do with a record, based on its packet counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceDecision {
    /// The expected successor (or the first record). Deliver it.
    Emit,
    /// Counter jumped; the wrapped difference to the previous counter is
    /// carried for logging. Deliver the record anyway.
    EmitAfterGap(u64),
    /// Same counter as the previous record. Drop it.
    Duplicate,
}

/// Per-stream sequencing state. One per session, reset by reconnecting.
#[derive(Debug)]
pub struct StreamSequencer {
    sampling_rate: u32,
    last_counter: u64,
    checkpoint: u64,
    checkpoint_counter: u64,
}

impl StreamSequencer {
    pub fn new(sampling_rate: u32) -> Self {
        Self { sampling_rate, last_counter: 0, checkpoint: 0, checkpoint_counter: 0 }
    }

    /// Classify one record and advance the state.
    ///
    /// Duplicates leave the state untouched so that a duplicate followed by
    /// the true successor still sequences cleanly.
    pub fn observe(&mut self, counter: u64, timestamp: u64) -> SequenceDecision {
        let mut decision = SequenceDecision::Emit;
        if self.last_counter != 0 {
            if counter == self.last_counter {
                warn!("duplicate record with counter {}, dropping", counter);
                return SequenceDecision::Duplicate;
            }
            if counter != self.last_counter.wrapping_add(1) {
                let gap = counter.wrapping_sub(self.last_counter);
                warn!(
                    "packet counter jumped from {} to {} (gap of {})",
                    self.last_counter, counter, gap
                );
                decision = SequenceDecision::EmitAfterGap(gap);
            }
        }

        self.last_counter = counter;

        // The first checkpoint is unconditional (sentinel 0); afterwards one
        // is taken every half second of nominal samples.
        let half_rate = (self.sampling_rate / 2) as u64;
        if self.checkpoint == 0 || (half_rate != 0 && counter % half_rate == 0) {
            self.checkpoint = timestamp;
            self.checkpoint_counter = counter;
            debug!("timestamp checkpoint {} at counter {}", timestamp, counter);
        }

        decision
    }

    /// The most recently checkpointed hardware timestamp.
    pub fn checkpoint(&self) -> u64 {
        self.checkpoint
    }

    /// The packet counter at which [`checkpoint`](Self::checkpoint) was
    /// taken, for clock correlation.
    pub fn checkpoint_counter(&self) -> u64 {
        self.checkpoint_counter
    }
}
