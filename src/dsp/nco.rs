//! Numerically Controlled Oscillator
//!
//! Phase accumulator used to derotate the input stream. Phase is kept in (−π, π].

use std::f32::consts::{PI, TAU};

use num_complex::Complex32;

/// exp(j·phase)
pub fn expj(phase: f32) -> Complex32 {
    Complex32::new(phase.cos(), phase.sin())
}

/// Bring `phase` back into (−π, π] after a bounded step.
///
/// One ±2π correction covers any step of less than a full turn. Larger steps
/// fall back to a Euclidean remainder.
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = if phase > PI {
        phase - TAU
    } else if phase <= -PI {
        phase + TAU
    } else {
        phase
    };

    if wrapped > PI || wrapped <= -PI {
        let reduced = (wrapped + PI).rem_euclid(TAU) - PI;
        if reduced <= -PI {
            reduced + TAU
        } else {
            reduced
        }
    } else {
        wrapped
    }
}

/// Derotating oscillator driven by the loop
#[derive(Debug, Clone, Default)]
pub struct Nco {
    phase: f32,
}

impl Nco {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current phase in radians
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Multiply `sample` by exp(j·phase)
    pub fn rotate(&self, sample: Complex32) -> Complex32 {
        sample * expj(self.phase)
    }

    /// Step the phase by `delta` radians and wrap
    pub fn advance(&mut self, delta: f32) {
        self.phase = wrap_phase(self.phase + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nco_frequency() {
        let mut nco = Nco::new();

        // 48 samples per cycle, two cycles
        let step = TAU / 48.0;
        let mut samples = Vec::new();
        for _ in 0..96 {
            samples.push(nco.rotate(Complex32::new(1.0, 0.0)).re);
            nco.advance(step);
        }

        let zero_crossings: usize = samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0 && w[1] < 0.0) || (w[0] < 0.0 && w[1] >= 0.0))
            .count();

        // 2 cycles = 4 zero crossings
        assert_eq!(zero_crossings, 4);
    }

    #[test]
    fn phase_stays_in_half_open_interval() {
        let mut nco = Nco::new();
        for _ in 0..10_000 {
            nco.advance(-0.731);
            assert!(nco.phase() > -PI && nco.phase() <= PI, "phase {}", nco.phase());
        }
    }

    #[test]
    fn wrap_applies_a_single_turn_correction() {
        assert!((wrap_phase(PI + 0.5) - (0.5 - PI)).abs() < 1e-6);
        assert!((wrap_phase(-PI - 0.5) - (PI - 0.5)).abs() < 1e-6);
        assert_eq!(wrap_phase(-PI), PI);
        assert_eq!(wrap_phase(1.0), 1.0);
    }

    #[test]
    fn wrap_handles_steps_beyond_one_turn() {
        let wrapped = wrap_phase(7.0 * TAU + 0.25);
        assert!((wrapped - 0.25).abs() < 1e-3, "got {wrapped}");
        let wrapped = wrap_phase(-5.0 * TAU - 0.25);
        assert!((wrapped + 0.25).abs() < 1e-3, "got {wrapped}");
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let mut nco = Nco::new();
        nco.advance(1.234);
        let sample = Complex32::new(0.6, -0.8);
        let rotated = nco.rotate(sample);
        assert!((rotated.norm() - 1.0).abs() < 1e-6);
        assert!((rotated.arg() - (sample.arg() + 1.234)).abs() < 1e-5);
    }
}
