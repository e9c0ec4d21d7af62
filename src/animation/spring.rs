use serde::{Deserialize, Serialize};

use crate::foundation::error::{TradeAnimError, TradeAnimResult};

/// Damped harmonic oscillator driven from 0 to a rest value of 1 with zero initial velocity.
///
/// [`Spring::value`] is evaluated in closed form, so the same `t` always produces the same
/// output regardless of how the timeline was sampled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub stiffness: f64,
    pub damping: f64,
    #[serde(default = "unit_mass")]
    pub mass: f64,
}

/// Distance from rest below which the spring reports exactly 1.
const REST_DELTA: f64 = 1e-4;

fn unit_mass() -> f64 {
    1.0
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(100.0, 10.0)
    }
}

impl Spring {
    pub const fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass: 1.0,
        }
    }

    pub fn validate(&self) -> TradeAnimResult<()> {
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return Err(TradeAnimError::validation("spring stiffness must be > 0"));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(TradeAnimError::validation("spring damping must be >= 0"));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(TradeAnimError::validation("spring mass must be > 0"));
        }
        Ok(())
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Displacement at `t` seconds after release. `t <= 0` is 0; may overshoot 1 when
    /// underdamped. Once the motion is within [`REST_DELTA`] of rest for good, the value is
    /// exactly 1, so settled frames compare equal.
    pub fn value(&self, t: f64) -> f64 {
        if !(t > 0.0) {
            return 0.0;
        }
        if self.validate().is_err() {
            return 1.0;
        }

        let w0 = (self.stiffness / self.mass).sqrt();
        let zeta = self.damping_ratio();

        // `envelope` bounds |value - 1| from now on and only decreases.
        let (value, envelope) = if (zeta - 1.0).abs() < 1e-9 {
            let dev = (-w0 * t).exp() * (1.0 + w0 * t);
            (1.0 - dev, dev)
        } else if zeta < 1.0 {
            let wd = w0 * (1.0 - zeta * zeta).sqrt();
            let decay = (-zeta * w0 * t).exp();
            (
                1.0 - decay * ((wd * t).cos() + (zeta * w0 / wd) * (wd * t).sin()),
                decay / (1.0 - zeta * zeta).sqrt(),
            )
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -w0 * (zeta - root);
            let r2 = -w0 * (zeta + root);
            let dev = (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r1 - r2);
            (1.0 + dev, dev.abs())
        };

        if envelope < REST_DELTA { 1.0 } else { value }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
