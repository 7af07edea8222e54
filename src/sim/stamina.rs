//! Sprint stamina
//!
//! Drain speeds up as the pool empties, regeneration speeds up as it fills.
//! Both rates are re-evaluated every tick from the current ratio.

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::Tuning;

/// Rate pairs for the stamina curves (units per second)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaRates {
    pub drain_at_full: f32,
    pub drain_at_empty: f32,
    pub regen_at_empty: f32,
    pub regen_at_full: f32,
    /// Seconds of uninterrupted non-sprint before regeneration starts
    pub regen_hold_delay: f32,
}

impl From<&Tuning> for StaminaRates {
    fn from(tuning: &Tuning) -> Self {
        Self {
            drain_at_full: tuning.drain_at_full,
            drain_at_empty: tuning.drain_at_empty,
            regen_at_empty: tuning.regen_at_empty,
            regen_at_full: tuning.regen_at_full,
            regen_hold_delay: tuning.regen_hold_delay,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stamina {
    current: f32,
    max: f32,
    /// Remaining hold time before regeneration may start
    regen_hold_timer: f32,
    sprinting: bool,
    rates: StaminaRates,
}

impl Stamina {
    /// Full pool
    pub fn new(max: f32, rates: StaminaRates) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            regen_hold_timer: 0.0,
            sprinting: false,
            rates,
        }
    }

    /// Advance one tick
    ///
    /// `sprint_intent` is the raw input; `moving` is whether the player
    /// actually displaced this tick.
    pub fn update(&mut self, sprint_intent: bool, moving: bool, dt: f32) {
        if sprint_intent {
            self.regen_hold_timer = self.rates.regen_hold_delay;
        }

        if sprint_intent && moving && self.current > 0.0 {
            let rate = lerp(
                self.rates.drain_at_full,
                self.rates.drain_at_empty,
                1.0 - self.ratio(),
            );
            self.current = (self.current - rate * dt).clamp(0.0, self.max);
            self.sprinting = self.current > 0.0;
            return;
        }

        self.sprinting = false;
        if sprint_intent {
            return;
        }

        if self.regen_hold_timer > 0.0 {
            self.regen_hold_timer = (self.regen_hold_timer - dt).max(0.0);
            return;
        }

        let rate = lerp(self.rates.regen_at_empty, self.rates.regen_at_full, self.ratio());
        self.current = (self.current + rate * dt).clamp(0.0, self.max);
    }

    /// Fill fraction in [0, 1]
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// True while regeneration is being held back
    pub fn is_regen_held(&self) -> bool {
        self.regen_hold_timer > 0.0
    }
}
