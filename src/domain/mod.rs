//! Core domain types
//!
//! Pure types with no I/O dependencies: configuration, errors, and the shapes of
//! the sample streams the synchronizer consumes and produces.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
