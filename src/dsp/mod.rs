//! Digital Signal Processing
//!
//! Pure signal processing for the band-edge FLL. No I/O dependencies.

pub mod band_edge;
pub mod fll;
pub mod loop_filter;
pub mod nco;
pub mod response;

// Re-export commonly used items
pub use band_edge::BandEdgeFilters;
pub use fll::BandEdgeFll;
pub use loop_filter::LoopGains;
pub use nco::Nco;
pub use response::{FrequencyResponse, ResponseAnalyzer};
