//! Adapters
//!
//! A minimal synchronous driver for streaming stages.

pub mod stream_runner;

pub use stream_runner::{RunOutput, StreamRunner};
