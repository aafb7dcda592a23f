//! Core domain types
//!
//! Pure types with no I/O dependencies: the sample type, the output port layout,
//! the frequency clamp and the per-call output buffers.

use std::f32::consts::PI;

use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Complex baseband sample
pub type Sample = Complex32;

/// Which output streams the stage writes, fixed when the stage is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Corrected samples only
    #[default]
    CorrectedOnly,
    /// Corrected samples plus frequency, phase and error streams
    WithDiagnostics,
}

impl OutputMode {
    /// Number of output ports the host has to provide
    pub fn port_count(&self) -> usize {
        match self {
            OutputMode::CorrectedOnly => 1,
            OutputMode::WithDiagnostics => 4,
        }
    }
}

/// Bounds of the loop's frequency estimate, in radians per sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyLimits {
    pub min: f32,
    pub max: f32,
}

impl FrequencyLimits {
    /// ±2π·(2/sps): the loop may not pull further than two symbol rates
    pub fn for_samples_per_symbol(sps: f32) -> Self {
        let max = 2.0 * PI * (2.0 / sps);
        Self { min: -max, max }
    }

    /// Saturate `freq` into the limits
    pub fn clamp(&self, freq: f32) -> f32 {
        if freq > self.max {
            self.max
        } else if freq < self.min {
            self.min
        } else {
            freq
        }
    }

    pub fn contains(&self, freq: f32) -> bool {
        (self.min..=self.max).contains(&freq)
    }
}

/// Diagnostic output buffers, one value per produced sample
pub struct Diagnostics<'a> {
    pub freq: &'a mut [f32],
    pub phase: &'a mut [f32],
    pub error: &'a mut [f32],
}

impl Diagnostics<'_> {
    /// Shortest of the three buffers
    pub fn len(&self) -> usize {
        self.freq.len().min(self.phase.len()).min(self.error.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output side of one processing call
pub struct StreamOutputs<'a> {
    pub corrected: &'a mut [Sample],
    pub diagnostics: Option<Diagnostics<'a>>,
}

impl<'a> StreamOutputs<'a> {
    /// Corrected stream only
    pub fn corrected(corrected: &'a mut [Sample]) -> Self {
        Self {
            corrected,
            diagnostics: None,
        }
    }

    /// Corrected stream plus the three diagnostic streams
    pub fn with_diagnostics(
        corrected: &'a mut [Sample],
        freq: &'a mut [f32],
        phase: &'a mut [f32],
        error: &'a mut [f32],
    ) -> Self {
        Self {
            corrected,
            diagnostics: Some(Diagnostics { freq, phase, error }),
        }
    }

    /// Number of samples every supplied buffer can hold
    pub fn capacity(&self) -> usize {
        match &self.diagnostics {
            Some(diag) => self.corrected.len().min(diag.len()),
            None => self.corrected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_samples_per_symbol() {
        let limits = FrequencyLimits::for_samples_per_symbol(4.0);
        assert!((limits.max - PI).abs() < 1e-6);
        assert_eq!(limits.min, -limits.max);
    }

    #[test]
    fn clamp_saturates_instead_of_wrapping() {
        let limits = FrequencyLimits::for_samples_per_symbol(8.0);
        assert_eq!(limits.clamp(10.0), limits.max);
        assert_eq!(limits.clamp(-10.0), limits.min);
        assert_eq!(limits.clamp(0.25), 0.25);
        assert!(limits.contains(limits.max));
        assert!(!limits.contains(limits.max + 0.1));
    }

    #[test]
    fn output_mode_port_counts() {
        assert_eq!(OutputMode::CorrectedOnly.port_count(), 1);
        assert_eq!(OutputMode::WithDiagnostics.port_count(), 4);
        assert_eq!(OutputMode::default(), OutputMode::CorrectedOnly);
    }

    #[test]
    fn capacity_is_the_shortest_buffer() {
        let mut out = vec![Sample::new(0.0, 0.0); 10];
        let mut freq = vec![0.0; 8];
        let mut phase = vec![0.0; 10];
        let mut error = vec![0.0; 9];
        let outputs = StreamOutputs::with_diagnostics(&mut out, &mut freq, &mut phase, &mut error);
        assert_eq!(outputs.capacity(), 8);
    }
}
