//! Threat spawning
//!
//! Owns the set of live threats. Spawns one threat at a time: the first
//! after `base_lifetime` seconds, then one `respawn_gap` after the previous
//! threat has gone. Spawn positions alternate between a cone ahead of the
//! player and the full circle, and are rejection-sampled against the map.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shape::{Aabb, Silhouette};
use super::threat::{FadeTimings, Placement, Threat, ThreatId};
use crate::consts::{DEFAULT_MOVE_DIRECTION, MOVE_NOISE_THRESHOLD, SPAWN_ATTEMPTS};
use crate::tuning::Tuning;
use crate::{lerp, polar_to_cartesian};

/// Scheduler cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePhase {
    /// Counting down to the very first spawn
    WaitingForFirstSpawn,
    /// At least one threat is live
    Populated,
    /// Last threat gone, counting down to the next
    RespawnGap,
}

/// Spawn configuration, fixed for the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRules {
    pub base_lifetime: f32,
    pub min_lifetime: f32,
    pub respawn_gap: f32,
    pub fade: FadeTimings,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians
    pub tailored_half_angle: f32,
    pub tailored_clear_of_vision: bool,
    pub map_bounds: Aabb,
    pub silhouette: Silhouette,
}

impl From<&Tuning> for SpawnRules {
    fn from(tuning: &Tuning) -> Self {
        Self {
            base_lifetime: tuning.base_lifetime,
            min_lifetime: tuning.min_lifetime,
            respawn_gap: tuning.respawn_gap,
            fade: FadeTimings {
                fade_in: tuning.fade_in_duration,
                fade_out: tuning.fade_out_duration,
            },
            min_distance: tuning.min_spawn_distance,
            max_distance: tuning.max_spawn_distance,
            tailored_half_angle: tuning.tailored_half_angle_deg.abs().to_radians(),
            tailored_clear_of_vision: tuning.tailored_clear_of_vision,
            map_bounds: tuning.map_bounds,
            silhouette: tuning.threat_silhouette(),
        }
    }
}

/// Where the player is and how far they moved since last tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub displacement: Vec2,
}

impl PlayerView {
    pub fn is_moving(&self) -> bool {
        self.displacement.length() > MOVE_NOISE_THRESHOLD
    }
}

/// Per-tick inputs the scheduler reads from its collaborators
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext {
    pub player: Option<PlayerView>,
    pub glasses_collected: u32,
    pub total_required: u32,
    pub vision_radius: f32,
}

/// Result of placing one spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSample {
    pub position: Vec2,
    /// Candidates drawn (1..=SPAWN_ATTEMPTS)
    pub attempts: u32,
    /// True if every candidate fell outside the map and the last was clamped
    pub clamped: bool,
}

/// Something the scheduler did this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleEvent {
    Spawned {
        id: ThreatId,
        position: Vec2,
        placement: Placement,
        lifetime: f32,
    },
    Despawned(ThreatId),
}

/// Lifetime of a threat spawned after `collected` of `total` pickups
pub fn lifetime_curve(base: f32, min: f32, collected: u32, total: u32) -> f32 {
    let progress = (collected as f32 / total.max(1) as f32).clamp(0.0, 1.0);
    lerp(base, min, progress)
}

/// Even spawns are tailored, odd ones random
pub fn placement_for(spawn_index: u32) -> Placement {
    if spawn_index % 2 == 0 {
        Placement::Tailored
    } else {
        Placement::Random
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatScheduler {
    rules: SpawnRules,
    phase: SchedulePhase,
    /// Countdown for the current phase (unused while populated)
    timer: f32,
    spawn_count: u32,
    last_move_direction: Vec2,
    /// Live threats, sorted by id
    threats: Vec<Threat>,
    next_id: u32,
}

impl ThreatScheduler {
    pub fn new(rules: SpawnRules) -> Self {
        let timer = rules.base_lifetime;
        Self {
            rules,
            phase: SchedulePhase::WaitingForFirstSpawn,
            timer,
            spawn_count: 0,
            last_move_direction: DEFAULT_MOVE_DIRECTION,
            threats: Vec::new(),
            next_id: 1,
        }
    }

    /// Advance one tick
    pub fn update<R: Rng>(
        &mut self,
        ctx: &ScheduleContext,
        rng: &mut R,
        dt: f32,
    ) -> Vec<ScheduleEvent> {
        let mut events = Vec::new();

        if let Some(player) = &ctx.player {
            self.track_player(player.displacement);
        }

        // Age live threats and drop the ones that have faded out
        for threat in &mut self.threats {
            if threat.advance(dt) {
                log::debug!("{} despawned after {:.2}s", threat.id, threat.age());
                events.push(ScheduleEvent::Despawned(threat.id));
            }
        }
        self.threats.retain(Threat::is_active);

        if self.phase == SchedulePhase::Populated {
            if self.threats.is_empty() {
                self.phase = SchedulePhase::RespawnGap;
                self.timer = self.rules.respawn_gap;
            }
            return events;
        }

        self.timer -= dt;
        if self.timer > 0.0 {
            return events;
        }

        let Some(player) = ctx.player else {
            log::trace!("Spawn due but no player yet; retrying next tick");
            return events;
        };

        let lifetime = self.lifetime_for(ctx.glasses_collected, ctx.total_required);
        let id = self.spawn(player.position, ctx.vision_radius, lifetime, rng);
        if let Some(threat) = self.get(id) {
            events.push(ScheduleEvent::Spawned {
                id,
                position: threat.position,
                placement: threat.placement,
                lifetime,
            });
        }
        events
    }

    /// Place and register one threat, entering the populated phase
    pub fn spawn<R: Rng>(
        &mut self,
        player_pos: Vec2,
        vision_radius: f32,
        lifetime: f32,
        rng: &mut R,
    ) -> ThreatId {
        let placement = placement_for(self.spawn_count);
        let sample = self.sample_spawn_position(player_pos, placement, vision_radius, rng);
        if sample.clamped {
            log::debug!(
                "No in-bounds spawn after {} attempts; clamped to {:?}",
                sample.attempts,
                sample.position
            );
        }

        let id = ThreatId(self.next_id);
        self.next_id += 1;
        self.spawn_count += 1;

        let threat = Threat::new(
            id,
            sample.position,
            placement,
            lifetime,
            self.rules.fade,
            self.rules.silhouette.clone(),
        );
        log::debug!(
            "{} spawned ({:?}) at {:?}, lifetime {:.2}s",
            id,
            placement,
            sample.position,
            lifetime
        );
        self.threats.push(threat);
        self.phase = SchedulePhase::Populated;
        self.timer = 0.0;
        id
    }

    /// Rejection-sample a spawn point inside the map bounds
    pub fn sample_spawn_position<R: Rng>(
        &self,
        player_pos: Vec2,
        placement: Placement,
        vision_radius: f32,
        rng: &mut R,
    ) -> SpawnSample {
        // Sampling ranges must be finite and non-empty for `random_range`
        let min_dist = finite_or(self.rules.min_distance, 0.0).max(0.0);
        let max_dist = finite_or(self.rules.max_distance, min_dist).max(0.0);
        let (mut min_dist, max_dist) = ordered(min_dist, max_dist);
        if placement == Placement::Tailored && self.rules.tailored_clear_of_vision {
            min_dist = min_dist.max(finite_or(vision_radius, 0.0)).min(max_dist);
        }
        let heading = self.last_move_direction.y.atan2(self.last_move_direction.x);
        let half_cone = finite_or(self.rules.tailored_half_angle.abs(), 0.0).min(PI);

        let mut candidate = player_pos;
        for attempt in 1..=SPAWN_ATTEMPTS {
            let angle = match placement {
                Placement::Tailored => heading + rng.random_range(-half_cone..=half_cone),
                Placement::Random => rng.random_range(0.0..TAU),
            };
            let distance = rng.random_range(min_dist..=max_dist);
            candidate = player_pos + polar_to_cartesian(distance, angle);
            if self.rules.map_bounds.contains(candidate) {
                return SpawnSample {
                    position: candidate,
                    attempts: attempt,
                    clamped: false,
                };
            }
        }

        SpawnSample {
            position: self.rules.map_bounds.clamp_point(candidate),
            attempts: SPAWN_ATTEMPTS,
            clamped: true,
        }
    }

    /// Record the player's heading if they moved noticeably
    pub fn track_player(&mut self, displacement: Vec2) {
        if displacement.length() > MOVE_NOISE_THRESHOLD {
            self.last_move_direction = displacement.normalize();
        }
    }

    /// Lifetime for a spawn made now
    pub fn lifetime_for(&self, collected: u32, total: u32) -> f32 {
        lifetime_curve(self.rules.base_lifetime, self.rules.min_lifetime, collected, total)
    }

    /// Set the sticky seen flag on a threat. True the first time only.
    pub fn mark_seen(&mut self, id: ThreatId) -> bool {
        self.threats
            .iter_mut()
            .find(|t| t.id == id)
            .is_some_and(Threat::mark_seen)
    }

    /// Read-only view of live threats
    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    pub fn get(&self, id: ThreatId) -> Option<&Threat> {
        self.threats.iter().find(|t| t.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.threats.len()
    }

    pub fn phase(&self) -> SchedulePhase {
        self.phase
    }

    /// Seconds until the next spawn (None while populated)
    pub fn time_to_spawn(&self) -> Option<f32> {
        match self.phase {
            SchedulePhase::Populated => None,
            _ => Some(self.timer.max(0.0)),
        }
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn last_move_direction(&self) -> Vec2 {
        self.last_move_direction
    }

    pub fn rules(&self) -> &SpawnRules {
        &self.rules
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    (a.min(b), a.max(b))
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
