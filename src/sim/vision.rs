//! Player perception radius
//!
//! The radius compounds with every pickup and is always recomputed from the
//! absolute collected count, so replaying a count is harmless.

use serde::{Deserialize, Serialize};

/// Radius after `collected` pickups: `start * growth^collected`
pub fn radius_for(start_radius: f32, growth_factor: f32, collected: u32) -> f32 {
    let exponent = collected.min(i32::MAX as u32) as i32;
    let radius = start_radius * growth_factor.powi(exponent);
    if radius.is_finite() {
        radius.max(0.0)
    } else {
        f32::MAX
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionModel {
    start_radius: f32,
    growth_factor: f32,
    collected: u32,
    radius: f32,
}

impl VisionModel {
    pub fn new(start_radius: f32, growth_factor: f32) -> Self {
        Self {
            start_radius,
            growth_factor,
            collected: 0,
            radius: radius_for(start_radius, growth_factor, 0),
        }
    }

    /// Recompute the radius for the given total number of pickups
    pub fn grow_on_pickup(&mut self, collected: u32) {
        self.collected = collected;
        self.radius = radius_for(self.start_radius, self.growth_factor, collected);
    }

    #[inline]
    pub fn current_radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn collected(&self) -> u32 {
        self.collected
    }
}
