//! Band-edge frequency-locked loop
//!
//! Tracks and removes residual carrier frequency offset from a pulse-shaped
//! complex baseband stream. Each input sample is derotated by the NCO, then the
//! lower and upper band-edge filters are run over the most recent derotated
//! samples. The difference of their output powers is the frequency error that
//! drives a second-order loop:
//!
//! ```text
//! freq  ← freq + β·e
//! phase ← phase + freq + α·e
//! ```
//!
//! Changing the pulse shape (sps, rolloff, filter size) redesigns the filters and
//! changes the stage's history requirement. The next processing call then
//! produces nothing, which tells the host to re-read `history()` before asking
//! for more output.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::domain::{
    validate, FllConfig, FllResult, FrequencyLimits, OutputMode, Sample, StreamOutputs,
};
use crate::ports::SyncStage;

use super::band_edge::BandEdgeFilters;
use super::loop_filter::LoopGains;
use super::nco::Nco;
use super::response::{FrequencyResponse, ResponseAnalyzer};

/// Band-edge FLL carrier synchronizer
#[derive(Debug, Clone)]
pub struct BandEdgeFll {
    sps: f32,
    rolloff: f32,
    filter_size: usize,
    loop_bandwidth: f32,
    damping: f32,
    gains: LoopGains,
    filters: BandEdgeFilters,
    limits: FrequencyLimits,
    nco: Nco,
    /// Frequency estimate, radians/sample
    freq: f32,
    /// Filters were redesigned since the last processing call
    updated: bool,
    output_mode: OutputMode,
    /// Derotated samples: the newest `filter_size - 1` from earlier calls, followed
    /// by this call's samples while processing
    rotated: Vec<Sample>,
}

impl BandEdgeFll {
    /// Create a synchronizer with a critically damped loop
    ///
    /// - `sps`: samples per symbol, > 0
    /// - `rolloff`: excess bandwidth of the pulse shape, [0,1]
    /// - `filter_size`: taps per band-edge filter, > 0
    /// - `bandwidth`: normalized loop bandwidth, >= 0
    pub fn new(sps: f32, rolloff: f32, filter_size: i32, bandwidth: f32) -> FllResult<Self> {
        let sps = validate::samples_per_symbol(sps)?;
        let rolloff = validate::rolloff(rolloff)?;
        let filter_size = validate::filter_size(filter_size)?;
        let bandwidth = validate::loop_bandwidth(bandwidth)?;

        Ok(Self::build(
            sps,
            rolloff,
            filter_size,
            bandwidth,
            FRAC_1_SQRT_2,
            OutputMode::CorrectedOnly,
        ))
    }

    /// Create a synchronizer from a validated configuration
    pub fn from_config(config: &FllConfig) -> FllResult<Self> {
        config.validate()?;
        let filter_size = validate::filter_size(config.filter_size)?;

        Ok(Self::build(
            config.samples_per_symbol,
            config.rolloff,
            filter_size,
            config.loop_bandwidth,
            config.damping,
            config.output_mode,
        ))
    }

    /// Choose which output streams are written
    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    fn build(
        sps: f32,
        rolloff: f32,
        filter_size: usize,
        loop_bandwidth: f32,
        damping: f32,
        output_mode: OutputMode,
    ) -> Self {
        let filters = BandEdgeFilters::design(sps, rolloff, filter_size);
        let gains = LoopGains::critically_damped(damping, loop_bandwidth);
        log::debug!(
            "band-edge FLL: sps={sps} rolloff={rolloff} taps={filter_size} \
             alpha={:.6} beta={:.6}",
            gains.alpha,
            gains.beta
        );

        Self {
            sps,
            rolloff,
            filter_size,
            loop_bandwidth,
            damping,
            gains,
            filters,
            limits: FrequencyLimits::for_samples_per_symbol(sps),
            nco: Nco::new(),
            freq: 0.0,
            updated: false,
            output_mode,
            rotated: vec![Sample::new(0.0, 0.0); filter_size - 1],
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Set the normalized loop bandwidth and recompute alpha/beta
    pub fn set_loop_bandwidth(&mut self, bandwidth: f32) -> FllResult<()> {
        self.loop_bandwidth = validate::loop_bandwidth(bandwidth)?;
        self.update_gains();
        Ok(())
    }

    /// Set the damping factor and recompute alpha/beta
    pub fn set_damping_factor(&mut self, damping: f32) -> FllResult<()> {
        self.damping = validate::damping(damping)?;
        self.update_gains();
        Ok(())
    }

    /// Override the phase gain directly
    pub fn set_alpha(&mut self, alpha: f32) -> FllResult<()> {
        self.gains.alpha = validate::gain("alpha", alpha)?;
        Ok(())
    }

    /// Override the frequency gain directly
    pub fn set_beta(&mut self, beta: f32) -> FllResult<()> {
        self.gains.beta = validate::gain("beta", beta)?;
        Ok(())
    }

    /// Set samples per symbol; redesigns the filters and the frequency limits
    pub fn set_samples_per_symbol(&mut self, sps: f32) -> FllResult<()> {
        self.sps = validate::samples_per_symbol(sps)?;
        self.limits = FrequencyLimits::for_samples_per_symbol(self.sps);
        self.freq = self.limits.clamp(self.freq);
        self.redesign();
        Ok(())
    }

    /// Set the rolloff factor; redesigns the filters
    pub fn set_rolloff(&mut self, rolloff: f32) -> FllResult<()> {
        self.rolloff = validate::rolloff(rolloff)?;
        self.redesign();
        Ok(())
    }

    /// Set the number of taps per filter; redesigns the filters
    pub fn set_filter_size(&mut self, filter_size: i32) -> FllResult<()> {
        self.filter_size = validate::filter_size(filter_size)?;
        self.redesign();
        Ok(())
    }

    fn update_gains(&mut self) {
        self.gains = LoopGains::critically_damped(self.damping, self.loop_bandwidth);
        log::debug!(
            "band-edge FLL: bandwidth={} damping={} -> alpha={:.6} beta={:.6}",
            self.loop_bandwidth,
            self.damping,
            self.gains.alpha,
            self.gains.beta
        );
    }

    fn redesign(&mut self) {
        self.filters = BandEdgeFilters::design(self.sps, self.rolloff, self.filter_size);

        // Keep the newest derotated samples across a change in filter length
        let delay = self.filter_size - 1;
        let current = self.rotated.len();
        if delay < current {
            self.rotated.drain(..current - delay);
        } else if delay > current {
            let zeros = std::iter::repeat(Sample::new(0.0, 0.0)).take(delay - current);
            self.rotated.splice(0..0, zeros);
        }

        self.updated = true;
        log::debug!(
            "band-edge FLL: redesigned sps={} rolloff={} taps={}, history now {}",
            self.sps,
            self.rolloff,
            self.filter_size,
            self.history()
        );
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn loop_bandwidth(&self) -> f32 {
        self.loop_bandwidth
    }

    pub fn damping_factor(&self) -> f32 {
        self.damping
    }

    pub fn alpha(&self) -> f32 {
        self.gains.alpha
    }

    pub fn beta(&self) -> f32 {
        self.gains.beta
    }

    pub fn samples_per_symbol(&self) -> f32 {
        self.sps
    }

    pub fn rolloff(&self) -> f32 {
        self.rolloff
    }

    pub fn filter_size(&self) -> usize {
        self.filter_size
    }

    /// Current frequency estimate in radians/sample
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Current NCO phase in radians, (−π, π]
    pub fn phase(&self) -> f32 {
        self.nco.phase()
    }

    /// Input samples needed per output, counting the current one (filter_size + 1)
    pub fn history(&self) -> usize {
        self.filters.history()
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn frequency_limits(&self) -> FrequencyLimits {
        self.limits
    }

    pub fn taps_lower(&self) -> &[Sample] {
        self.filters.lower()
    }

    pub fn taps_upper(&self) -> &[Sample] {
        self.filters.upper()
    }

    /// True until the next processing call after a filter redesign
    pub fn is_redesign_pending(&self) -> bool {
        self.updated
    }

    /// Snapshot of the current tuning as a named configuration
    ///
    /// Directly overridden alpha/beta are not part of a configuration; they are
    /// re-derived from bandwidth and damping when a stage is built from it.
    pub fn to_config(&self, name: &str) -> FllConfig {
        FllConfig {
            name: name.to_string(),
            samples_per_symbol: self.sps,
            rolloff: self.rolloff,
            filter_size: self.filter_size as i32,
            loop_bandwidth: self.loop_bandwidth,
            damping: self.damping,
            output_mode: self.output_mode,
        }
    }

    /// Both tap sets as text, upper filter first
    pub fn dump_taps(&self) -> String {
        self.filters.to_string()
    }

    /// Magnitude responses of the (lower, upper) filters over `fft_size` bins
    pub fn filter_responses(&self, fft_size: usize) -> (FrequencyResponse, FrequencyResponse) {
        let analyzer = ResponseAnalyzer::new(fft_size);
        (
            analyzer.analyze(self.filters.lower()),
            analyzer.analyze(self.filters.upper()),
        )
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Correct up to `noutput` samples.
    ///
    /// `input` holds `noutput + filter_size` samples; `input[0]` is the first one
    /// processed and the trailing `filter_size` are look-ahead consumed by later
    /// calls. Returns the number of samples produced: 0 right after a filter
    /// redesign, fewer than `noutput` only if the supplied buffers are short.
    pub fn process(&mut self, noutput: usize, input: &[Sample], outputs: StreamOutputs<'_>) -> usize {
        if self.updated {
            self.updated = false;
            log::trace!("band-edge FLL: history changed, producing nothing this call");
            return 0;
        }

        let outputs = match self.output_mode {
            OutputMode::WithDiagnostics => outputs,
            OutputMode::CorrectedOnly => StreamOutputs {
                diagnostics: None,
                ..outputs
            },
        };

        let n = noutput
            .min(input.len().saturating_sub(self.filter_size))
            .min(outputs.capacity());
        if n < noutput {
            log::warn!(
                "band-edge FLL: buffers hold {n} of {noutput} requested samples \
                 (input {}, history {})",
                input.len(),
                self.history()
            );
        }

        let StreamOutputs {
            corrected,
            mut diagnostics,
        } = outputs;

        let delay = self.filter_size - 1;
        self.rotated.resize(delay + n, Sample::new(0.0, 0.0));

        for i in 0..n {
            let rotated = self.nco.rotate(input[i]);
            self.rotated[delay + i] = rotated;
            corrected[i] = rotated;

            let window = &self.rotated[i..i + self.filter_size];
            let (out_lower, out_upper) = self.filters.correlate(window);
            let error = out_lower.norm_sqr() - out_upper.norm_sqr();

            // Inputs past ~1e19 overflow the band energies (inf - inf = NaN);
            // such a sample must not poison the loop, so it coasts on freq.
            if error.is_finite() {
                self.freq += self.gains.beta * error;
                self.nco.advance(self.freq + self.gains.alpha * error);
                self.freq = self.limits.clamp(self.freq);
            } else {
                self.nco.advance(self.freq);
            }

            if let Some(diag) = diagnostics.as_mut() {
                diag.freq[i] = self.freq;
                diag.phase[i] = self.nco.phase();
                diag.error[i] = error;
            }
        }

        // Keep the newest derotated samples for the next call
        self.rotated.copy_within(n.., 0);
        self.rotated.truncate(delay);

        n
    }
}

impl SyncStage for BandEdgeFll {
    fn history(&self) -> usize {
        BandEdgeFll::history(self)
    }

    fn output_mode(&self) -> OutputMode {
        BandEdgeFll::output_mode(self)
    }

    fn work(&mut self, noutput: usize, input: &[Sample], outputs: StreamOutputs<'_>) -> usize {
        self.process(noutput, input, outputs)
    }
}
