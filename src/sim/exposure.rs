//! Exposure: sustained sight of a threat fills a meter that ends the run
//!
//! The accumulator only reads the threat set. Marking threats as seen is
//! left to the caller, using the ids in the returned report.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Aabb;
use super::threat::{Threat, ThreatId};
use crate::consts::MIN_DETECTION_RADIUS;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureRules {
    /// Gain per second with one visible threat and nothing collected
    pub base_gain: f32,
    pub per_pickup_gain_increase: f32,
    /// Drain per second while nothing is visible
    pub decay_rate: f32,
    pub visibility_buffer: f32,
    pub stack_multiplier: f32,
}

impl From<&Tuning> for ExposureRules {
    fn from(tuning: &Tuning) -> Self {
        Self {
            base_gain: tuning.base_gain,
            per_pickup_gain_increase: tuning.per_pickup_gain_increase,
            decay_rate: tuning.decay_rate,
            visibility_buffer: tuning.visibility_buffer,
            stack_multiplier: tuning.stack_multiplier,
        }
    }
}

/// Vision radius with the soft fringe removed
pub fn detection_radius(vision_radius: f32, visibility_buffer: f32) -> f32 {
    (vision_radius * (1.0 - visibility_buffer)).max(MIN_DETECTION_RADIUS)
}

/// Gain multiplier for `visible` simultaneously visible threats
pub fn stack_factor(visible: usize, stack_multiplier: f32) -> f32 {
    if visible == 0 {
        return 0.0;
    }
    1.0 + (visible - 1) as f32 * (stack_multiplier - 1.0)
}

/// Outcome of one exposure update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureReport {
    /// Threats that counted as seen this tick
    pub visible: Vec<ThreatId>,
    /// Signed change applied (after clamping)
    pub delta: f32,
    /// True only on the tick exposure first saturated
    pub saturated_now: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureAccumulator {
    rules: ExposureRules,
    exposure: f32,
    saturated: bool,
}

impl ExposureAccumulator {
    pub fn new(rules: ExposureRules) -> Self {
        Self {
            rules,
            exposure: 0.0,
            saturated: false,
        }
    }

    /// Gain per second for a single visible threat
    pub fn gain_rate(&self, glasses_collected: u32) -> f32 {
        self.rules.base_gain + self.rules.per_pickup_gain_increase * glasses_collected as f32
    }

    /// Integrate one tick. A missing player makes this a no-op.
    pub fn update(
        &mut self,
        threats: &[Threat],
        player: Option<Vec2>,
        viewport: &Aabb,
        vision_radius: f32,
        glasses_collected: u32,
        dt: f32,
    ) -> ExposureReport {
        let Some(player) = player else {
            return ExposureReport::default();
        };

        let radius = detection_radius(vision_radius, self.rules.visibility_buffer);
        let visible: Vec<ThreatId> = threats
            .iter()
            .filter(|t| t.is_visible_to(player, radius) && t.is_on_screen(viewport))
            .map(|t| t.id)
            .collect();

        let rate = if visible.is_empty() {
            -self.rules.decay_rate
        } else {
            self.gain_rate(glasses_collected)
                * stack_factor(visible.len(), self.rules.stack_multiplier)
        };

        let before = self.exposure;
        self.exposure = (self.exposure + rate * dt).clamp(0.0, 1.0);

        let saturated_now = !self.saturated && self.exposure >= 1.0;
        if saturated_now {
            self.saturated = true;
            log::info!("Exposure saturated with {} threat(s) in view", visible.len());
        }

        ExposureReport {
            visible,
            delta: self.exposure - before,
            saturated_now,
        }
    }

    /// Current level in [0, 1]
    #[inline]
    pub fn level(&self) -> f32 {
        self.exposure
    }

    /// True once exposure has reached 1
    #[inline]
    pub fn has_saturated(&self) -> bool {
        self.saturated
    }

    pub fn rules(&self) -> &ExposureRules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::Silhouette;
    use crate::sim::threat::{FadeTimings, Placement};

    fn rules() -> ExposureRules {
        ExposureRules {
            base_gain: 0.15,
            per_pickup_gain_increase: 0.03,
            decay_rate: 0.08,
            visibility_buffer: 0.3,
            stack_multiplier: 1.5,
        }
    }

    fn threat(id: u32, position: Vec2) -> Threat {
        let mut threat = Threat::new(
            ThreatId(id),
            position,
            Placement::Random,
            100.0,
            FadeTimings {
                fade_in: 0.5,
                fade_out: 1.0,
            },
            Silhouette::Box {
                half_extents: Vec2::splat(0.5),
            },
        );
        threat.advance(1.0);
        threat
    }

    fn viewport() -> Aabb {
        Aabb::from_center(Vec2::ZERO, Vec2::new(16.0, 9.0))
    }

    #[test]
    fn test_gain_scenario() {
        // 0.15 + 0.03 * 3 = 0.24 per second
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(2.0, 0.0))];
        let report = acc.update(&threats, Some(Vec2::ZERO), &viewport(), 10.0, 3, 1.0);
        assert_eq!(report.visible, vec![ThreatId(1)]);
        assert!((acc.level() - 0.24).abs() < 1e-6);
    }

    #[test]
    fn test_stack_factor() {
        assert_eq!(stack_factor(0, 1.5), 0.0);
        assert_eq!(stack_factor(1, 1.5), 1.0);
        assert_eq!(stack_factor(2, 1.5), 1.5);
        assert_eq!(stack_factor(3, 1.5), 2.0);
    }

    #[test]
    fn test_two_visible_threats_stack() {
        let mut single = ExposureAccumulator::new(rules());
        let mut double = ExposureAccumulator::new(rules());
        let one = [threat(1, Vec2::new(2.0, 0.0))];
        let two = [threat(1, Vec2::new(2.0, 0.0)), threat(2, Vec2::new(-2.0, 0.0))];
        single.update(&one, Some(Vec2::ZERO), &viewport(), 10.0, 0, 0.5);
        double.update(&two, Some(Vec2::ZERO), &viewport(), 10.0, 0, 0.5);
        assert!((double.level() - single.level() * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_buffer_shrinks_radius() {
        // Near edge 4.5 away: inside vision 6 but outside 6 * 0.7 = 4.2
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(5.0, 0.0))];
        let report = acc.update(&threats, Some(Vec2::ZERO), &viewport(), 6.0, 0, 1.0);
        assert!(report.visible.is_empty());
        assert_eq!(acc.level(), 0.0);
    }

    #[test]
    fn test_detection_radius_floor() {
        assert_eq!(detection_radius(0.0, 0.3), MIN_DETECTION_RADIUS);
        assert!((detection_radius(10.0, 0.3) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_off_screen_threat_does_not_count() {
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(2.0, 0.0))];
        let offscreen = Aabb::from_center(Vec2::new(100.0, 0.0), Vec2::ONE);
        let report = acc.update(&threats, Some(Vec2::ZERO), &offscreen, 10.0, 0, 1.0);
        assert!(report.visible.is_empty());
    }

    #[test]
    fn test_decay_and_floor() {
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(2.0, 0.0))];
        acc.update(&threats, Some(Vec2::ZERO), &viewport(), 10.0, 0, 1.0);
        assert!((acc.level() - 0.15).abs() < 1e-6);

        let report = acc.update(&[], Some(Vec2::ZERO), &viewport(), 10.0, 0, 1.0);
        assert!((acc.level() - 0.07).abs() < 1e-6);
        assert!(report.delta < 0.0);

        acc.update(&[], Some(Vec2::ZERO), &viewport(), 10.0, 0, 5.0);
        assert_eq!(acc.level(), 0.0);
    }

    #[test]
    fn test_saturation_signals_once() {
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(2.0, 0.0))];
        let mut signals = 0;
        for _ in 0..20 {
            let report = acc.update(&threats, Some(Vec2::ZERO), &viewport(), 10.0, 0, 1.0);
            if report.saturated_now {
                signals += 1;
            }
        }
        assert_eq!(signals, 1);
        assert_eq!(acc.level(), 1.0);
        assert!(acc.has_saturated());
    }

    #[test]
    fn test_missing_player_is_noop() {
        let mut acc = ExposureAccumulator::new(rules());
        let threats = [threat(1, Vec2::new(2.0, 0.0))];
        acc.update(&threats, Some(Vec2::ZERO), &viewport(), 10.0, 0, 1.0);
        let level = acc.level();
        let report = acc.update(&threats, None, &viewport(), 10.0, 0, 1.0);
        assert_eq!(report, ExposureReport::default());
        assert_eq!(acc.level(), level);
    }
}
