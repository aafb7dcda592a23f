//! Domain error types

use thiserror::Error;

/// Errors that can occur while configuring or controlling the synchronizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FllError {
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Control channel closed")]
    ControlClosed,
}

/// Result type alias for synchronizer operations
pub type FllResult<T> = Result<T, FllError>;

/// Parameter checks shared by the constructor, the setters and the control channel.
///
/// Each check returns the accepted value so callers can validate and bind in one step
/// before touching any state.
pub mod validate {
    use super::{FllError, FllResult};

    fn invalid(name: &'static str, value: f64, reason: &'static str) -> FllError {
        FllError::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    fn in_unit_range(name: &'static str, value: f32) -> FllResult<f32> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(invalid(name, value as f64, "must be in [0,1]"))
        }
    }

    pub fn samples_per_symbol(sps: f32) -> FllResult<f32> {
        if sps.is_finite() && sps > 0.0 {
            Ok(sps)
        } else {
            Err(invalid("samples_per_symbol", sps as f64, "must be finite and > 0"))
        }
    }

    pub fn rolloff(rolloff: f32) -> FllResult<f32> {
        in_unit_range("rolloff", rolloff)
    }

    pub fn filter_size(filter_size: i32) -> FllResult<usize> {
        if filter_size > 0 {
            Ok(filter_size as usize)
        } else {
            Err(invalid("filter_size", filter_size as f64, "must be > 0"))
        }
    }

    pub fn loop_bandwidth(bandwidth: f32) -> FllResult<f32> {
        if bandwidth.is_finite() && bandwidth >= 0.0 {
            Ok(bandwidth)
        } else {
            Err(invalid("loop_bandwidth", bandwidth as f64, "must be finite and >= 0"))
        }
    }

    pub fn damping(damping: f32) -> FllResult<f32> {
        in_unit_range("damping", damping)
    }

    /// Direct loop gain (alpha or beta)
    pub fn gain(name: &'static str, gain: f32) -> FllResult<f32> {
        in_unit_range(name, gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_samples_per_symbol() {
        assert!(validate::samples_per_symbol(0.0).is_err());
        assert!(validate::samples_per_symbol(-2.0).is_err());
        assert!(validate::samples_per_symbol(f32::NAN).is_err());
        assert_eq!(validate::samples_per_symbol(1.5), Ok(1.5));
    }

    #[test]
    fn rejects_non_finite_samples_per_symbol_and_bandwidth() {
        assert!(validate::samples_per_symbol(f32::INFINITY).is_err());
        assert!(validate::loop_bandwidth(f32::INFINITY).is_err());
        assert!(validate::loop_bandwidth(f32::NAN).is_err());
        assert_eq!(validate::loop_bandwidth(f32::MAX), Ok(f32::MAX));
    }

    #[test]
    fn unit_range_checks_include_both_ends() {
        assert_eq!(validate::rolloff(0.0), Ok(0.0));
        assert_eq!(validate::rolloff(1.0), Ok(1.0));
        assert!(validate::rolloff(1.5).is_err());
        assert!(validate::damping(-0.01).is_err());
        assert!(validate::gain("alpha", 1.01).is_err());
    }

    #[test]
    fn filter_size_must_be_positive() {
        assert!(validate::filter_size(0).is_err());
        assert!(validate::filter_size(-1).is_err());
        assert_eq!(validate::filter_size(45), Ok(45));
    }

    #[test]
    fn error_names_the_offending_parameter() {
        let err = validate::loop_bandwidth(-0.1).unwrap_err();
        match &err {
            FllError::InvalidParameter { name, .. } => assert_eq!(*name, "loop_bandwidth"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("must be finite and >= 0"));
    }
}
