//! Data-driven game balance
//!
//! All values are constant for a session. Any subset of fields can be
//! supplied as JSON; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::shape::{Aabb, Silhouette};

/// Problems found while loading or validating a [`Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("`{field}` must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f32 },
    #[error("`{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("decay_rate ({decay}) must be below base_gain ({gain})")]
    DecayNotBelowGain { decay: f32, gain: f32 },
    #[error("min_lifetime ({min}) exceeds base_lifetime ({base})")]
    LifetimeRange { min: f32, base: f32 },
    #[error("min_spawn_distance ({min}) exceeds max_spawn_distance ({max})")]
    SpawnDistanceRange { min: f32, max: f32 },
    #[error("map bounds have no area")]
    EmptyMapBounds,
    #[error("visibility_buffer must be in [0, 1) (got {0})")]
    VisibilityBuffer(f32),
    #[error("stack_multiplier must be at least 1 (got {0})")]
    StackMultiplier(f32),
    #[error("threat outline needs at least 3 points (got {0})")]
    DegenerateOutline(usize),
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vision ===
    /// Perception radius before any pickup (world units)
    pub start_vision_radius: f32,
    /// Multiplicative growth per collected pair of glasses
    pub vision_growth_factor: f32,

    // === Threat schedule ===
    /// Lifetime with nothing collected; also the delay before the first spawn
    pub base_lifetime: f32,
    /// Lifetime once the collection goal is reached
    pub min_lifetime: f32,
    /// Delay between the last threat disappearing and the next spawn
    pub respawn_gap: f32,
    pub fade_in_duration: f32,
    pub fade_out_duration: f32,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    /// Half-width of the cone around the player's heading for tailored spawns
    pub tailored_half_angle_deg: f32,
    /// Keep tailored spawns outside the current vision radius
    pub tailored_clear_of_vision: bool,
    pub map_bounds: Aabb,
    /// Box silhouette used when no outline is given
    pub threat_half_extents: Vec2,
    /// Optional polygon silhouette (local space)
    pub threat_outline: Option<Vec<Vec2>>,
    /// Player-centred viewport used when the caller supplies none
    pub viewport_half_extents: Vec2,

    // === Exposure ===
    pub base_gain: f32,
    pub per_pickup_gain_increase: f32,
    pub decay_rate: f32,
    /// Fraction of the vision radius treated as soft fringe
    pub visibility_buffer: f32,
    pub stack_multiplier: f32,

    // === Stamina ===
    pub stamina_max: f32,
    pub drain_at_full: f32,
    pub drain_at_empty: f32,
    pub regen_at_empty: f32,
    pub regen_at_full: f32,
    pub regen_hold_delay: f32,
    pub walk_speed: f32,
    pub sprint_speed: f32,

    // === Goal ===
    pub total_required: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_vision_radius: 4.0,
            vision_growth_factor: 1.15,

            base_lifetime: 10.0,
            min_lifetime: 3.0,
            respawn_gap: 1.5,
            fade_in_duration: 1.0,
            fade_out_duration: 1.0,
            min_spawn_distance: 6.0,
            max_spawn_distance: 12.0,
            tailored_half_angle_deg: 35.0,
            tailored_clear_of_vision: false,
            map_bounds: Aabb::new(Vec2::new(-40.0, -40.0), Vec2::new(40.0, 40.0)),
            threat_half_extents: Vec2::new(0.5, 1.0),
            threat_outline: None,
            viewport_half_extents: Vec2::new(16.0, 9.0),

            base_gain: 0.15,
            per_pickup_gain_increase: 0.03,
            decay_rate: 0.08,
            visibility_buffer: 0.3,
            stack_multiplier: 1.5,

            stamina_max: 100.0,
            drain_at_full: 15.0,
            drain_at_empty: 30.0,
            regen_at_empty: 8.0,
            regen_at_full: 25.0,
            regen_hold_delay: 1.0,
            walk_speed: 3.0,
            sprint_speed: 5.5,

            total_required: 5,
        }
    }
}

impl Tuning {
    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check the relationships the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        self.validate_finite()?;
        for (field, value) in [
            ("start_vision_radius", self.start_vision_radius),
            ("vision_growth_factor", self.vision_growth_factor),
            ("base_lifetime", self.base_lifetime),
            ("fade_out_duration", self.fade_out_duration),
            ("base_gain", self.base_gain),
            ("decay_rate", self.decay_rate),
            ("stamina_max", self.stamina_max),
        ] {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("min_lifetime", self.min_lifetime),
            ("respawn_gap", self.respawn_gap),
            ("fade_in_duration", self.fade_in_duration),
            ("min_spawn_distance", self.min_spawn_distance),
            ("per_pickup_gain_increase", self.per_pickup_gain_increase),
            ("drain_at_full", self.drain_at_full),
            ("drain_at_empty", self.drain_at_empty),
            ("regen_at_empty", self.regen_at_empty),
            ("regen_at_full", self.regen_at_full),
            ("regen_hold_delay", self.regen_hold_delay),
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
        ] {
            if value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.min_lifetime > self.base_lifetime {
            return Err(TuningError::LifetimeRange {
                min: self.min_lifetime,
                base: self.base_lifetime,
            });
        }
        if self.min_spawn_distance > self.max_spawn_distance {
            return Err(TuningError::SpawnDistanceRange {
                min: self.min_spawn_distance,
                max: self.max_spawn_distance,
            });
        }
        if self.map_bounds.is_empty() {
            return Err(TuningError::EmptyMapBounds);
        }
        if !(0.0..1.0).contains(&self.visibility_buffer) {
            return Err(TuningError::VisibilityBuffer(self.visibility_buffer));
        }
        if self.stack_multiplier < 1.0 {
            return Err(TuningError::StackMultiplier(self.stack_multiplier));
        }
        if self.decay_rate >= self.base_gain {
            return Err(TuningError::DecayNotBelowGain {
                decay: self.decay_rate,
                gain: self.base_gain,
            });
        }
        if let Some(outline) = &self.threat_outline {
            if outline.len() < 3 {
                return Err(TuningError::DegenerateOutline(outline.len()));
            }
        }
        Ok(())
    }

    /// Reject NaN and infinities (serde_json maps out-of-range numbers to inf)
    fn validate_finite(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("start_vision_radius", self.start_vision_radius),
            ("vision_growth_factor", self.vision_growth_factor),
            ("base_lifetime", self.base_lifetime),
            ("min_lifetime", self.min_lifetime),
            ("respawn_gap", self.respawn_gap),
            ("fade_in_duration", self.fade_in_duration),
            ("fade_out_duration", self.fade_out_duration),
            ("min_spawn_distance", self.min_spawn_distance),
            ("max_spawn_distance", self.max_spawn_distance),
            ("tailored_half_angle_deg", self.tailored_half_angle_deg),
            ("base_gain", self.base_gain),
            ("per_pickup_gain_increase", self.per_pickup_gain_increase),
            ("decay_rate", self.decay_rate),
            ("visibility_buffer", self.visibility_buffer),
            ("stack_multiplier", self.stack_multiplier),
            ("stamina_max", self.stamina_max),
            ("drain_at_full", self.drain_at_full),
            ("drain_at_empty", self.drain_at_empty),
            ("regen_at_empty", self.regen_at_empty),
            ("regen_at_full", self.regen_at_full),
            ("regen_hold_delay", self.regen_hold_delay),
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
        ] {
            if !value.is_finite() {
                return Err(TuningError::NonFinite { field, value });
            }
        }

        let outline = self.threat_outline.as_deref().unwrap_or_default();
        let vectors = [
            ("map_bounds", self.map_bounds.min),
            ("map_bounds", self.map_bounds.max),
            ("threat_half_extents", self.threat_half_extents),
            ("viewport_half_extents", self.viewport_half_extents),
        ]
        .into_iter()
        .chain(outline.iter().map(|p| ("threat_outline", *p)));
        for (field, v) in vectors {
            if !v.is_finite() {
                let value = if v.x.is_finite() { v.y } else { v.x };
                return Err(TuningError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Silhouette given to every spawned threat
    pub fn threat_silhouette(&self) -> Silhouette {
        Silhouette::from_outline(self.threat_outline.as_deref(), self.threat_half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_lifetime": 12.0, "total_required": 8 }"#)
            .expect("valid json");
        assert_eq!(tuning.base_lifetime, 12.0);
        assert_eq!(tuning.total_required, 8);
        assert_eq!(tuning.min_lifetime, Tuning::default().min_lifetime);
    }

    #[test]
    fn test_decay_must_stay_below_gain() {
        let err = Tuning::from_json(r#"{ "base_gain": 0.1, "decay_rate": 0.1 }"#).unwrap_err();
        assert!(matches!(err, TuningError::DecayNotBelowGain { .. }));
    }

    #[test]
    fn test_spawn_distance_range() {
        let tuning = Tuning {
            min_spawn_distance: 20.0,
            max_spawn_distance: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::SpawnDistanceRange { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_buffer_and_outline() {
        let tuning = Tuning {
            visibility_buffer: 1.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::VisibilityBuffer(_))));

        let tuning = Tuning {
            threat_outline: Some(vec![Vec2::ZERO, Vec2::X]),
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::DegenerateOutline(2))));
    }

    #[test]
    fn test_out_of_range_numbers_rejected() {
        // 1e39 overflows f32 and parses as infinity
        let err = Tuning::from_json(r#"{ "max_spawn_distance": 1e39 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::NonFinite {
                field: "max_spawn_distance",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "tailored_half_angle_deg": 1e39 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::NonFinite {
                field: "tailored_half_angle_deg",
                ..
            }
        ));

        let tuning = Tuning {
            map_bounds: Aabb::new(Vec2::ZERO, Vec2::new(f32::INFINITY, 10.0)),
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NonFinite {
                field: "map_bounds",
                ..
            })
        ));

        let tuning = Tuning {
            decay_rate: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::NonFinite { .. })));
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = Tuning::from_json(
            r#"{ "min_spawn_distance": -12.0, "respawn_gap": -3.0, "fade_in_duration": -1.0 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::Negative { .. }));

        for json in [
            r#"{ "min_spawn_distance": -12.0 }"#,
            r#"{ "respawn_gap": -3.0 }"#,
            r#"{ "fade_in_duration": -1.0 }"#,
            r#"{ "min_lifetime": -1.0 }"#,
            r#"{ "per_pickup_gain_increase": -0.05 }"#,
            r#"{ "drain_at_empty": -5.0 }"#,
            r#"{ "regen_at_full": -5.0 }"#,
        ] {
            assert!(
                matches!(Tuning::from_json(json), Err(TuningError::Negative { .. })),
                "{json} should be rejected"
            );
        }

        // Zero is allowed where only negatives are rejected
        assert!(Tuning::from_json(r#"{ "respawn_gap": 0.0, "fade_in_duration": 0.0 }"#).is_ok());
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io { .. }));
    }

    #[test]
    fn test_outline_parsed_from_json() {
        let tuning = Tuning::from_json(
            r#"{ "threat_outline": [[0.0, 1.0], [1.0, -1.0], [-1.0, -1.0]] }"#,
        )
        .expect("valid json");
        assert!(matches!(tuning.threat_silhouette(), Silhouette::Outline(ref p) if p.len() == 3));
    }
}
