//! Frequency response of correlator taps
//!
//! Used to inspect designed band-edge filters: where each one peaks and how much
//! it passes at a given normalized frequency.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Magnitude response sampled on `fft_size` bins, ordered from −0.5 to just
/// below +0.5 cycles per sample
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    magnitudes: Vec<f32>,
}

impl FrequencyResponse {
    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Normalized frequency (cycles/sample) of bin `index`
    pub fn frequency(&self, index: usize) -> f32 {
        let n = self.magnitudes.len();
        (index as f32 - (n / 2) as f32) / n as f32
    }

    /// Linear magnitudes, lowest frequency first
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// (frequency, magnitude) of the strongest bin
    pub fn peak(&self) -> Option<(f32, f32)> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(*b))
            .map(|(i, &mag)| (self.frequency(i), mag))
    }

    /// Magnitude at the bin nearest to `freq` (cycles/sample, wrapped into [−0.5, 0.5))
    pub fn magnitude_at(&self, freq: f32) -> f32 {
        let n = self.magnitudes.len();
        if n == 0 {
            return 0.0;
        }
        let wrapped = (freq + 0.5).rem_euclid(1.0) - 0.5;
        let index = (wrapped * n as f32).round() as isize + (n / 2) as isize;
        self.magnitudes[index.rem_euclid(n as isize) as usize]
    }
}

/// Computes correlator responses with a cached FFT plan
pub struct ResponseAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
}

impl ResponseAnalyzer {
    /// Create an analyzer with `fft_size` frequency bins
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        // Correlation y[n] = Σ h[k]·x[n+k] responds to exp(j2πfn) with Σ h[k]·exp(+j2πfk),
        // which is the (unnormalized) inverse DFT of the taps
        let fft = planner.plan_fft_inverse(fft_size);
        Self { fft, fft_size }
    }

    /// Magnitude response of taps used as a correlator
    pub fn analyze(&self, taps: &[Complex<f32>]) -> FrequencyResponse {
        let n = self.fft_size;
        if n == 0 {
            return FrequencyResponse {
                magnitudes: Vec::new(),
            };
        }

        // Taps longer than the transform alias onto k mod n, which samples the
        // response exactly
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n];
        for (k, tap) in taps.iter().enumerate() {
            buffer[k % n] += *tap;
        }

        self.fft.process(&mut buffer);

        let magnitudes = (0..n)
            .map(|j| buffer[(j + n - n / 2) % n].norm())
            .collect();
        FrequencyResponse { magnitudes }
    }

    /// Get the FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}
