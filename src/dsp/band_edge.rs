//! Band-edge filter design
//!
//! A band-edge filter pair is a short lowpass prototype (two half-symbol-shifted
//! sincs added together) spun up and down to the upper and lower spectral edges of
//! a pulse-shaped signal at ±(1+rolloff)/(2·sps) cycles per sample. When the
//! signal is centered, both edges carry the same energy; a frequency offset moves
//! energy from one edge to the other.

use std::f32::consts::PI;
use std::fmt;

use num_complex::Complex32;

use super::nco::expj;

/// Normalized sinc: sin(πx)/(πx), with sinc(0) = 1
pub fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Matched pair of band-edge filters
///
/// Taps are stored time-reversed, so correlating them directly against an
/// ascending window of samples performs the filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct BandEdgeFilters {
    lower: Vec<Complex32>,
    upper: Vec<Complex32>,
}

impl BandEdgeFilters {
    /// Design both filters for the given pulse shape
    ///
    /// - `sps`: samples per symbol, > 0
    /// - `rolloff`: excess bandwidth, [0,1]
    /// - `filter_size`: taps per filter, > 0
    ///
    /// Parameters are validated by the caller.
    pub fn design(sps: f32, rolloff: f32, filter_size: usize) -> Self {
        let m = (filter_size as f32 / sps).round_ties_even();

        // Baseband prototype. The normalizer is the signed tap sum, not the energy.
        let mut power = 0.0f32;
        let prototype: Vec<f32> = (0..filter_size)
            .map(|i| {
                let k = -m + i as f32 * 2.0 / sps;
                let tap = sinc(rolloff * k - 0.5) + sinc(rolloff * k + 0.5);
                power += tap;
                tap
            })
            .collect();

        let mut lower = vec![Complex32::new(0.0, 0.0); filter_size];
        let mut upper = vec![Complex32::new(0.0, 0.0); filter_size];

        // Spin the prototype out to the band edges
        let n = ((filter_size - 1) / 2) as f32;
        for (i, &tap) in prototype.iter().enumerate() {
            let tap = tap / power;
            let k = (i as f32 - n) / (2.0 * sps);
            let edge = 2.0 * PI * (1.0 + rolloff) * k;

            lower[filter_size - i - 1] = expj(-edge) * tap;
            upper[filter_size - i - 1] = expj(edge) * tap;
        }

        Self { lower, upper }
    }

    /// Lower band-edge taps
    pub fn lower(&self) -> &[Complex32] {
        &self.lower
    }

    /// Upper band-edge taps
    pub fn upper(&self) -> &[Complex32] {
        &self.upper
    }

    /// Taps per filter
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Input samples the stage needs for each output, counting the current one
    pub fn history(&self) -> usize {
        self.len() + 1
    }

    /// Correlate both filters against `window[..len()]`, returning (lower, upper)
    pub fn correlate(&self, window: &[Complex32]) -> (Complex32, Complex32) {
        let mut out_lower = Complex32::new(0.0, 0.0);
        let mut out_upper = Complex32::new(0.0, 0.0);
        for ((lo, up), x) in self.lower.iter().zip(&self.upper).zip(window) {
            out_lower += lo * x;
            out_upper += up * x;
        }
        (out_lower, out_upper)
    }
}

/// Four-digit scientific notation with a signed, two-digit exponent (`2.4080e-01`)
struct Sci(f32);

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format!("{:.4e}", self.0);
        match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
                let sign = if exponent < 0 { '-' } else { '+' };
                write!(f, "{mantissa}e{sign}{:02}", exponent.abs())
            }
            // inf / NaN
            None => f.write_str(&rendered),
        }
    }
}

fn write_taps(f: &mut fmt::Formatter<'_>, label: &str, taps: &[Complex32]) -> fmt::Result {
    write!(f, "{label} Band-edge: [")?;
    for tap in taps {
        write!(f, " {} + {}j,", Sci(tap.re), Sci(tap.im))?;
    }
    write!(f, "]\n\n")
}

/// Tap dump: upper filter first, then lower
impl fmt::Display for BandEdgeFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_taps(f, "Upper", &self.upper)?;
        write_taps(f, "Lower", &self.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinc_has_unit_peak_and_integer_zeros() {
        assert_eq!(sinc(0.0), 1.0);
        for x in [1.0f32, 2.0, -3.0] {
            assert!(sinc(x).abs() < 1e-6, "sinc({x}) = {}", sinc(x));
        }
        assert!((sinc(0.5) - 2.0 / PI).abs() < 1e-6);
    }

    #[test]
    fn design_produces_filter_size_taps() {
        for &sps in &[1.0f32, 2.0, 3.3, 4.0, 8.0] {
            for &rolloff in &[0.0f32, 0.22, 0.35, 1.0] {
                for &size in &[1usize, 2, 7, 32, 45, 64] {
                    let filters = BandEdgeFilters::design(sps, rolloff, size);
                    assert_eq!(filters.lower().len(), size);
                    assert_eq!(filters.upper().len(), size);
                    assert_eq!(filters.history(), size + 1);
                }
            }
        }
    }

    #[test]
    fn design_is_reproducible() {
        let a = BandEdgeFilters::design(4.0, 0.35, 32);
        let b = BandEdgeFilters::design(4.0, 0.35, 32);
        assert_eq!(a, b);
    }

    #[test]
    fn upper_and_lower_are_mirror_images() {
        let filters = BandEdgeFilters::design(4.0, 0.35, 32);
        for (lo, up) in filters.lower().iter().zip(filters.upper()) {
            assert!((lo.conj() - up).norm() < 1e-6, "{lo} vs {up}");
        }
    }

    #[test]
    fn demodulated_prototype_sums_to_one() {
        // Undo the edge modulation; the normalized prototype sums to unity
        let (sps, rolloff, size) = (4.0f32, 0.35f32, 32usize);
        let filters = BandEdgeFilters::design(sps, rolloff, size);
        let n = ((size - 1) / 2) as f32;

        let sum: f32 = (0..size)
            .map(|i| {
                let k = (i as f32 - n) / (2.0 * sps);
                let edge = 2.0 * PI * (1.0 + rolloff) * k;
                (filters.upper()[size - i - 1] * expj(-edge)).re
            })
            .sum();

        assert!((sum - 1.0).abs() < 1e-4, "prototype sum was {sum}");
    }

    #[test]
    fn correlate_matches_direct_dot_product() {
        let filters = BandEdgeFilters::design(2.0, 0.5, 5);
        let window: Vec<Complex32> = (0..5)
            .map(|i| Complex32::new(i as f32, 1.0 - i as f32))
            .collect();

        let (lower, upper) = filters.correlate(&window);

        let mut expect_lower = Complex32::new(0.0, 0.0);
        let mut expect_upper = Complex32::new(0.0, 0.0);
        for k in 0..5 {
            expect_lower += filters.lower()[k] * window[k];
            expect_upper += filters.upper()[k] * window[k];
        }
        assert!((lower - expect_lower).norm() < 1e-5);
        assert!((upper - expect_upper).norm() < 1e-5);
    }

    #[test]
    fn coefficients_use_two_digit_signed_exponents() {
        assert_eq!(Sci(0.240_80).to_string(), "2.4080e-01");
        assert_eq!(Sci(0.0).to_string(), "0.0000e+00");
        assert_eq!(Sci(-1234.5).to_string(), "-1.2345e+03");
        assert_eq!(Sci(1.5e-12).to_string(), "1.5000e-12");
        assert_eq!(Sci(3.0e38).to_string(), "3.0000e+38");
    }

    #[test]
    fn dump_lists_upper_then_lower() {
        let filters = BandEdgeFilters::design(4.0, 0.35, 3);
        let dump = filters.to_string();

        let upper_at = dump.find("Upper Band-edge: [").expect("upper block");
        let lower_at = dump.find("Lower Band-edge: [").expect("lower block");
        assert!(upper_at < lower_at);
        // Three coefficients per block
        assert_eq!(dump.matches("j,").count(), 6);
        assert!(dump.ends_with("]\n\n"));
    }
}
