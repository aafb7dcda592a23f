//! Serialized configuration changes
//!
//! The synchronizer is not reentrant: a setter running while `work` is in
//! progress would race on the loop state and the filter taps. Other threads
//! therefore configure a running stage through an `FllController`, which checks
//! each value on the caller's side and queues it. The processing thread applies
//! the queue at the start of every `work` call, so a command that redesigns the
//! filters makes that same call return 0.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::domain::{validate, FllError, FllResult, OutputMode, Sample, StreamOutputs};
use crate::dsp::BandEdgeFll;
use crate::ports::SyncStage;

/// One queued configuration change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FllCommand {
    LoopBandwidth(f32),
    DampingFactor(f32),
    Alpha(f32),
    Beta(f32),
    SamplesPerSymbol(f32),
    Rolloff(f32),
    FilterSize(i32),
}

impl FllCommand {
    /// Apply the change through the matching setter
    pub fn apply(self, fll: &mut BandEdgeFll) -> FllResult<()> {
        match self {
            FllCommand::LoopBandwidth(bw) => fll.set_loop_bandwidth(bw),
            FllCommand::DampingFactor(damping) => fll.set_damping_factor(damping),
            FllCommand::Alpha(alpha) => fll.set_alpha(alpha),
            FllCommand::Beta(beta) => fll.set_beta(beta),
            FllCommand::SamplesPerSymbol(sps) => fll.set_samples_per_symbol(sps),
            FllCommand::Rolloff(rolloff) => fll.set_rolloff(rolloff),
            FllCommand::FilterSize(size) => fll.set_filter_size(size),
        }
    }
}

/// Create a connected controller / queue pair
pub fn control_channel() -> (FllController, CommandQueue) {
    let (tx, rx) = unbounded();
    (FllController { tx }, CommandQueue { rx })
}

/// Sending half, held by whoever configures the stage
#[derive(Debug, Clone)]
pub struct FllController {
    tx: Sender<FllCommand>,
}

impl FllController {
    fn send(&self, command: FllCommand) -> FllResult<()> {
        self.tx.send(command).map_err(|_| FllError::ControlClosed)
    }

    pub fn set_loop_bandwidth(&self, bandwidth: f32) -> FllResult<()> {
        let bandwidth = validate::loop_bandwidth(bandwidth)?;
        self.send(FllCommand::LoopBandwidth(bandwidth))
    }

    pub fn set_damping_factor(&self, damping: f32) -> FllResult<()> {
        let damping = validate::damping(damping)?;
        self.send(FllCommand::DampingFactor(damping))
    }

    pub fn set_alpha(&self, alpha: f32) -> FllResult<()> {
        let alpha = validate::gain("alpha", alpha)?;
        self.send(FllCommand::Alpha(alpha))
    }

    pub fn set_beta(&self, beta: f32) -> FllResult<()> {
        let beta = validate::gain("beta", beta)?;
        self.send(FllCommand::Beta(beta))
    }

    pub fn set_samples_per_symbol(&self, sps: f32) -> FllResult<()> {
        let sps = validate::samples_per_symbol(sps)?;
        self.send(FllCommand::SamplesPerSymbol(sps))
    }

    pub fn set_rolloff(&self, rolloff: f32) -> FllResult<()> {
        let rolloff = validate::rolloff(rolloff)?;
        self.send(FllCommand::Rolloff(rolloff))
    }

    pub fn set_filter_size(&self, filter_size: i32) -> FllResult<()> {
        validate::filter_size(filter_size)?;
        self.send(FllCommand::FilterSize(filter_size))
    }
}

/// Receiving half, drained on the processing thread
#[derive(Debug)]
pub struct CommandQueue {
    rx: Receiver<FllCommand>,
}

impl CommandQueue {
    /// Apply every queued command in order, returning how many were applied
    pub fn apply_pending(&self, fll: &mut BandEdgeFll) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(command) => match command.apply(fll) {
                    Ok(()) => applied += 1,
                    Err(e) => log::warn!("band-edge FLL: dropped {command:?}: {e}"),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }
}

/// Synchronizer that picks up queued commands before each processing call
pub struct ControlledFll {
    fll: BandEdgeFll,
    queue: CommandQueue,
}

impl ControlledFll {
    /// Wrap `fll`, returning the stage and a controller for it
    pub fn new(fll: BandEdgeFll) -> (Self, FllController) {
        let (controller, queue) = control_channel();
        (Self { fll, queue }, controller)
    }

    /// The wrapped synchronizer, as of the last applied command
    pub fn inner(&self) -> &BandEdgeFll {
        &self.fll
    }

    pub fn into_inner(self) -> BandEdgeFll {
        self.fll
    }
}

impl SyncStage for ControlledFll {
    fn history(&self) -> usize {
        self.fll.history()
    }

    fn output_mode(&self) -> OutputMode {
        self.fll.output_mode()
    }

    fn work(&mut self, noutput: usize, input: &[Sample], outputs: StreamOutputs<'_>) -> usize {
        self.queue.apply_pending(&mut self.fll);
        self.fll.process(noutput, input, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fll() -> BandEdgeFll {
        BandEdgeFll::new(4.0, 0.35, 32, 0.05).unwrap()
    }

    #[test]
    fn controller_rejects_bad_values_immediately() {
        let (controller, queue) = control_channel();
        assert!(controller.set_rolloff(1.5).is_err());
        assert!(controller.set_filter_size(-1).is_err());
        assert!(controller.set_alpha(2.0).is_err());

        let mut fll = fll();
        assert_eq!(queue.apply_pending(&mut fll), 0);
        assert!(!fll.is_redesign_pending());
    }

    #[test]
    fn queued_commands_apply_in_order() {
        let (controller, queue) = control_channel();
        controller.set_loop_bandwidth(0.1).unwrap();
        controller.set_alpha(0.5).unwrap();
        controller.set_filter_size(16).unwrap();

        let mut fll = fll();
        assert_eq!(queue.apply_pending(&mut fll), 3);
        assert_eq!(fll.loop_bandwidth(), 0.1);
        assert_eq!(fll.alpha(), 0.5);
        assert_eq!(fll.filter_size(), 16);
        assert!(fll.is_redesign_pending());
    }

    #[test]
    fn dropped_stage_closes_the_controller() {
        let (controller, queue) = control_channel();
        drop(queue);
        assert_eq!(controller.set_damping_factor(0.5), Err(FllError::ControlClosed));
    }

    #[test]
    fn redesign_command_skips_the_call_that_applies_it() {
        let (mut stage, controller) = ControlledFll::new(fll());
        let mut out = vec![Sample::new(0.0, 0.0); 8];

        controller.set_samples_per_symbol(2.0).unwrap();
        let input = vec![Sample::new(1.0, 0.0); 8 + 32];
        assert_eq!(stage.work(8, &input, StreamOutputs::corrected(&mut out)), 0);
        assert_eq!(stage.inner().samples_per_symbol(), 2.0);
        assert_eq!(stage.work(8, &input, StreamOutputs::corrected(&mut out)), 8);
    }

    #[test]
    fn controller_works_across_threads() {
        let (mut stage, controller) = ControlledFll::new(fll());
        std::thread::spawn(move || {
            controller.set_loop_bandwidth(0.2).unwrap();
            controller.set_damping_factor(1.0).unwrap();
        })
        .join()
        .unwrap();

        let mut out = vec![Sample::new(0.0, 0.0); 4];
        let input = vec![Sample::new(0.0, 0.0); 4 + 32];
        assert_eq!(stage.work(4, &input, StreamOutputs::corrected(&mut out)), 4);
        assert_eq!(stage.inner().loop_bandwidth(), 0.2);
        assert_eq!(stage.into_inner().damping_factor(), 1.0);
    }
}
