//! Second-order loop filter gains
//!
//! Maps the control-loop tuning (damping, normalized bandwidth) onto the
//! proportional (alpha) and integral (beta) gains of a discrete second-order loop.

/// Proportional and integral gains of the frequency-locked loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGains {
    /// Phase (proportional) gain
    pub alpha: f32,
    /// Frequency (integral) gain
    pub beta: f32,
}

impl LoopGains {
    /// Gains for a critically damped loop
    ///
    /// A bandwidth of zero freezes the loop (both gains zero).
    pub fn critically_damped(damping: f32, bandwidth: f32) -> Self {
        // bandwidth² overflows f32 long before any finite f32 bandwidth overflows f64
        let (damping, bandwidth) = (f64::from(damping), f64::from(bandwidth));
        let denom = 1.0 + 2.0 * damping * bandwidth + bandwidth * bandwidth;
        Self {
            alpha: ((4.0 * damping * bandwidth) / denom) as f32,
            beta: ((4.0 * bandwidth * bandwidth) / denom) as f32,
        }
    }
}
