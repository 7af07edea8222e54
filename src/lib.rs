//! Peripheral - simulation core for a short survival-avoidance game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vision, stamina, threats, exposure)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Candidate positions tried before falling back to clamping
    pub const SPAWN_ATTEMPTS: u32 = 20;

    /// Player displacement below this is treated as standing still
    pub const MOVE_NOISE_THRESHOLD: f32 = 0.001;

    /// Threats fainter than this cannot be seen
    pub const VISIBLE_ALPHA_EPSILON: f32 = 0.01;

    /// Floor for the buffered detection radius
    pub const MIN_DETECTION_RADIUS: f32 = 0.01;

    /// Assumed heading before the player has moved
    pub const DEFAULT_MOVE_DIRECTION: Vec2 = Vec2::Y;
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
