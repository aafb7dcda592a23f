//! Band-edge FLL carrier synchronizer
//!
//! Estimates and removes residual carrier frequency/phase offset from a complex
//! baseband sample stream, as one stage of a larger real-time pipeline.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Configuration, errors and stream types, no I/O dependencies
//! - `dsp/` - Filter design, loop gains, NCO and the FLL itself (pure, no I/O)
//! - `ports/` - Trait definition for the host scheduler
//! - `adapters/` - Reference stream runner driving a stage
//! - `control` - Thread-safe configuration of a running stage

// Core domain (pure, no I/O)
pub mod domain;
pub mod dsp;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

pub mod control;

pub use domain::{FllConfig, FllError, FllResult, OutputMode, Sample, StreamOutputs};
pub use dsp::BandEdgeFll;
