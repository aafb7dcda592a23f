//! Port traits (interfaces)
//!
//! The boundary between the synchronizer core and the host scheduler that
//! drives processing.

pub mod stage;

pub use stage::*;
