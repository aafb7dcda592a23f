//! Streaming stage port trait

use crate::domain::{OutputMode, Sample, StreamOutputs};

/// A one-in, one-out streaming stage driven synchronously by a host scheduler.
///
/// The host keeps `history() - 1` samples of context: each call's `input` holds
/// at least `noutput + history() - 1` samples. A return of 0 means the history
/// requirement may have changed; the host re-reads `history()` and calls again.
pub trait SyncStage {
    /// Input samples needed per output, counting the current one
    fn history(&self) -> usize;

    /// Output streams this stage writes
    fn output_mode(&self) -> OutputMode;

    /// Produce up to `noutput` samples, returning how many were produced
    fn work(&mut self, noutput: usize, input: &[Sample], outputs: StreamOutputs<'_>) -> usize;
}
