use serde::{Deserialize, Serialize};

use crate::animation::clock::Clock;
use crate::animation::ease::Ease;
use crate::animation::spring::Spring;

/// Progress curve of an entrance once its delay has passed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    Spring(Spring),
    Tween { duration_secs: f64, ease: Ease },
}

/// A delayed entrance animation mapping scene time to a progress value.
///
/// Progress is exactly 0 before the delay and 1 when the clock is [`Clock::Settled`]. Springs
/// may overshoot 1 in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrance {
    pub delay_secs: f64,
    pub curve: Curve,
}

impl Entrance {
    pub fn spring(delay_secs: f64, spring: Spring) -> Self {
        Self {
            delay_secs,
            curve: Curve::Spring(spring),
        }
    }

    pub fn tween(delay_secs: f64, duration_secs: f64, ease: Ease) -> Self {
        Self {
            delay_secs,
            curve: Curve::Tween {
                duration_secs,
                ease,
            },
        }
    }

    pub fn progress(&self, clock: Clock) -> f64 {
        let t = match clock {
            Clock::Settled => return 1.0,
            Clock::At(t) => t.secs() - self.delay_secs,
        };
        if t <= 0.0 {
            return 0.0;
        }
        match self.curve {
            Curve::Spring(spring) => spring.value(t),
            Curve::Tween {
                duration_secs,
                ease,
            } => {
                if duration_secs <= 0.0 {
                    1.0
                } else {
                    ease.apply(t / duration_secs)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/entrance.rs"]
mod tests;
