//! Reference host driver for a `SyncStage`
//!
//! Holds the stage's look-ahead, feeds pushed samples through it in bounded
//! blocks and honours the redesign handshake: when the stage produces nothing,
//! the runner re-reads `history()` and tries again. It starts with
//! `history() - 1` zeros of context, so output lags input by that many samples.

use crate::domain::{OutputMode, Sample, StreamOutputs};
use crate::ports::SyncStage;

/// Everything the stage produced for one `push`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub corrected: Vec<Sample>,
    /// Empty unless the stage writes diagnostics
    pub freq: Vec<f32>,
    pub phase: Vec<f32>,
    pub error: Vec<f32>,
}

impl RunOutput {
    /// Append another run's output
    pub fn append(&mut self, other: &mut RunOutput) {
        self.corrected.append(&mut other.corrected);
        self.freq.append(&mut other.freq);
        self.phase.append(&mut other.phase);
        self.error.append(&mut other.error);
    }
}

/// Drives a stage synchronously over pushed blocks of samples
pub struct StreamRunner<S: SyncStage> {
    stage: S,
    /// Samples not yet processed; the last `history - 1` are look-ahead
    buffer: Vec<Sample>,
    history: usize,
    max_block: usize,
    skipped_calls: usize,
}

impl<S: SyncStage> StreamRunner<S> {
    /// Wrap `stage`, asking it for at most `max_block` outputs per call
    pub fn new(stage: S, max_block: usize) -> Self {
        let history = stage.history().max(1);
        Self {
            stage,
            buffer: vec![Sample::new(0.0, 0.0); history - 1],
            history,
            max_block: max_block.max(1),
            skipped_calls: 0,
        }
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn into_stage(self) -> S {
        self.stage
    }

    /// Calls that produced nothing because the stage's history changed
    pub fn skipped_calls(&self) -> usize {
        self.skipped_calls
    }

    /// Samples buffered but not yet processed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed `samples` and process as much as the look-ahead allows
    pub fn push(&mut self, samples: &[Sample]) -> RunOutput {
        self.buffer.extend_from_slice(samples);
        let mut output = RunOutput::default();
        let mut idle_calls = 0;

        loop {
            let pending = self.buffer.len().saturating_sub(self.history - 1);
            if pending == 0 {
                break;
            }

            let produced = self.call(pending.min(self.max_block), &mut output);
            if produced > 0 {
                self.buffer.drain(..produced);
                idle_calls = 0;
                continue;
            }

            idle_calls += 1;
            if idle_calls > 1 {
                log::warn!("stream runner: stage produced nothing twice in a row, stopping");
                break;
            }
            self.skipped_calls += 1;
            let history = self.stage.history().max(1);
            if history != self.history {
                log::debug!("stream runner: history {} -> {history}", self.history);
                self.history = history;
            }
        }

        output
    }

    fn call(&mut self, n: usize, output: &mut RunOutput) -> usize {
        let start = output.corrected.len();
        let input = &self.buffer[..n + self.history - 1];
        output.corrected.resize(start + n, Sample::new(0.0, 0.0));

        let produced = match self.stage.output_mode() {
            OutputMode::CorrectedOnly => self.stage.work(
                n,
                input,
                StreamOutputs::corrected(&mut output.corrected[start..]),
            ),
            OutputMode::WithDiagnostics => {
                output.freq.resize(start + n, 0.0);
                output.phase.resize(start + n, 0.0);
                output.error.resize(start + n, 0.0);
                let produced = self.stage.work(
                    n,
                    input,
                    StreamOutputs::with_diagnostics(
                        &mut output.corrected[start..],
                        &mut output.freq[start..],
                        &mut output.phase[start..],
                        &mut output.error[start..],
                    ),
                );
                output.freq.truncate(start + produced);
                output.phase.truncate(start + produced);
                output.error.truncate(start + produced);
                produced
            }
        };

        output.corrected.truncate(start + produced);
        produced
    }
}
