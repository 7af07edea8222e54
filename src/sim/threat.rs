//! A single spawned threat: fade-in, hold, fade-out, removal
//!
//! Threats never move. Opacity is a pure function of age; the only latched
//! state is the removal flag and the sticky `seen` flag.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::{Aabb, Silhouette};
use crate::consts::VISIBLE_ALPHA_EPSILON;

/// Stable handle into the scheduler's threat set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreatId(pub u32);

impl std::fmt::Display for ThreatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "threat#{}", self.0)
    }
}

/// Lifecycle phase (derived from age)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatPhase {
    FadingIn,
    Active,
    FadingOut,
    Removed,
}

/// How the spawn position was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Biased toward the player's heading
    Tailored,
    /// Anywhere around the player
    Random,
}

/// Fade durations shared by every threat in a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTimings {
    pub fade_in: f32,
    pub fade_out: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: ThreatId,
    pub position: Vec2,
    pub placement: Placement,
    /// Seconds since spawn
    age: f32,
    /// Seconds before fade-out begins, fixed at spawn
    lifetime: f32,
    fade: FadeTimings,
    silhouette: Silhouette,
    seen: bool,
    active: bool,
}

impl Threat {
    pub fn new(
        id: ThreatId,
        position: Vec2,
        placement: Placement,
        lifetime: f32,
        fade: FadeTimings,
        silhouette: Silhouette,
    ) -> Self {
        Self {
            id,
            position,
            placement,
            age: 0.0,
            lifetime: lifetime.max(0.0),
            fade: FadeTimings {
                fade_in: fade.fade_in.max(0.0),
                fade_out: fade.fade_out.max(0.0),
            },
            silhouette,
            seen: false,
            active: true,
        }
    }

    /// Age the threat. Returns true on the one call that removes it.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.age += dt.max(0.0);
        if self.age >= self.lifetime && self.alpha() <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        self.alpha_at(self.age)
    }

    /// Piecewise-linear opacity curve
    pub fn alpha_at(&self, age: f32) -> f32 {
        let alpha = if age < self.lifetime {
            self.fade_in_alpha(age)
        } else if self.fade.fade_out <= 0.0 {
            0.0
        } else {
            // Fade from whatever opacity was reached when the lifetime ran out
            self.fade_in_alpha(self.lifetime) - (age - self.lifetime) / self.fade.fade_out
        };
        alpha.clamp(0.0, 1.0)
    }

    fn fade_in_alpha(&self, age: f32) -> f32 {
        if self.fade.fade_in <= 0.0 {
            1.0
        } else {
            (age / self.fade.fade_in).min(1.0)
        }
    }

    pub fn phase(&self) -> ThreatPhase {
        if !self.active {
            ThreatPhase::Removed
        } else if self.age < self.lifetime {
            if self.age < self.fade.fade_in {
                ThreatPhase::FadingIn
            } else {
                ThreatPhase::Active
            }
        } else {
            ThreatPhase::FadingOut
        }
    }

    /// Age at which opacity returns to zero
    pub fn end_of_life(&self) -> f32 {
        self.lifetime + self.fade_in_alpha(self.lifetime) * self.fade.fade_out
    }

    /// Distance from `point` to the silhouette (0 when inside)
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.silhouette.distance_to(point - self.position)
    }

    /// Geometric perception test against a radius
    pub fn is_visible_to(&self, player: Vec2, radius: f32) -> bool {
        if !self.active || self.alpha() < VISIBLE_ALPHA_EPSILON {
            return false;
        }
        self.distance_to(player) <= radius
    }

    /// World-space bounding rectangle
    pub fn bounds(&self) -> Aabb {
        self.silhouette.local_bounds().translate(self.position)
    }

    pub fn is_on_screen(&self, viewport: &Aabb) -> bool {
        self.bounds().intersects(viewport)
    }

    /// Set the sticky seen flag. Returns true only the first time.
    pub fn mark_seen(&mut self) -> bool {
        !std::mem::replace(&mut self.seen, true)
    }

    #[inline]
    pub fn seen(&self) -> bool {
        self.seen
    }

    #[inline]
    pub fn age(&self) -> f32 {
        self.age
    }

    #[inline]
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Take the threat out of play immediately
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
