//! Synchronizer configuration
//!
//! A configuration is a named, serializable snapshot of every tunable of the
//! band-edge FLL, handed over by whatever hosts the stage. It is validated as a
//! whole before a stage is built from it.

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use serde::{Deserialize, Serialize};

use super::error::{validate, FllResult};
use super::types::OutputMode;

fn default_damping() -> f32 {
    // Critically damped
    FRAC_1_SQRT_2
}

/// Named set of synchronizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FllConfig {
    /// Profile name (e.g., "QPSK 4sps", "Satellite downlink")
    pub name: String,
    /// Samples per symbol of the incoming pulse-shaped signal
    pub samples_per_symbol: f32,
    /// Excess bandwidth of the pulse shape, [0,1]
    pub rolloff: f32,
    /// Number of taps in each band-edge filter
    pub filter_size: i32,
    /// Normalized loop bandwidth (radians/sample)
    pub loop_bandwidth: f32,
    /// Loop damping factor, [0,1]
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Output streams the stage writes
    #[serde(default)]
    pub output_mode: OutputMode,
}

impl Default for FllConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            samples_per_symbol: 4.0,
            rolloff: 0.35,
            filter_size: 32,
            loop_bandwidth: 2.0 * PI / 100.0,
            damping: default_damping(),
            output_mode: OutputMode::CorrectedOnly,
        }
    }
}

impl FllConfig {
    /// Check every parameter, reporting the first one out of range
    pub fn validate(&self) -> FllResult<()> {
        validate::samples_per_symbol(self.samples_per_symbol)?;
        validate::rolloff(self.rolloff)?;
        validate::filter_size(self.filter_size)?;
        validate::loop_bandwidth(self.loop_bandwidth)?;
        validate::damping(self.damping)?;
        Ok(())
    }
}
