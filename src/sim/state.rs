//! Simulation root
//!
//! Owns every component, the seeded RNG and the event queue. Collaborators
//! drive it through [`super::tick`] and the pickup notifications, and read
//! published values through the query methods or a [`Snapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::exposure::{ExposureAccumulator, ExposureRules};
use super::scheduler::{PlayerView, SpawnRules, ThreatScheduler};
use super::shape::Aabb;
use super::stamina::{Stamina, StaminaRates};
use super::threat::{Placement, ThreatId};
use super::vision::VisionModel;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Collection goal reached
    Won,
    /// Exposure saturated
    Lost,
}

impl GamePhase {
    /// Both terminal phases stop the simulation
    pub fn is_over(self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

/// Notifications for presentation collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ThreatSpawned {
        id: ThreatId,
        position: Vec2,
        placement: Placement,
    },
    ThreatDespawned(ThreatId),
    /// First tick a threat counted as seen
    ThreatFirstSeen(ThreatId),
    GlassesCollected { count: u32, vision_radius: f32 },
    Lost,
    Won,
}

/// Published state, cheap to copy and serialize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub elapsed: f32,
    pub vision_radius: f32,
    pub exposure: f32,
    pub stamina_ratio: f32,
    pub sprinting: bool,
    pub active_threats: usize,
    pub glasses_collected: u32,
    pub total_required: u32,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) tuning: Tuning,
    pub(super) seed: u64,
    pub(super) rng: Pcg32,
    pub(super) phase: GamePhase,
    pub(super) time_ticks: u64,
    pub(super) elapsed: f32,
    pub(super) glasses_collected: u32,
    pub(super) vision: VisionModel,
    pub(super) stamina: Stamina,
    pub(super) scheduler: ThreatScheduler,
    pub(super) exposure: ExposureAccumulator,
    /// None until the player has been placed
    pub(super) player: Option<PlayerView>,
    pub(super) events: Vec<GameEvent>,
}

impl Simulation {
    /// Create a session with the given tuning and seed
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            phase: GamePhase::Playing,
            time_ticks: 0,
            elapsed: 0.0,
            glasses_collected: 0,
            vision: VisionModel::new(tuning.start_vision_radius, tuning.vision_growth_factor),
            stamina: Stamina::new(tuning.stamina_max, StaminaRates::from(&tuning)),
            scheduler: ThreatScheduler::new(SpawnRules::from(&tuning)),
            exposure: ExposureAccumulator::new(ExposureRules::from(&tuning)),
            player: None,
            events: Vec::new(),
            tuning,
        }
    }

    /// One more pair of glasses picked up
    pub fn collect_glasses(&mut self) {
        self.set_glasses_collected(self.glasses_collected.saturating_add(1));
    }

    /// Absolute pickup count from the game flow. Lower or repeated counts are ignored.
    pub fn set_glasses_collected(&mut self, count: u32) {
        if self.phase.is_over() || count <= self.glasses_collected {
            return;
        }
        self.glasses_collected = count;
        self.vision.grow_on_pickup(count);
        self.events.push(GameEvent::GlassesCollected {
            count,
            vision_radius: self.vision.current_radius(),
        });

        if count >= self.tuning.total_required {
            self.phase = GamePhase::Won;
            self.events.push(GameEvent::Won);
            log::info!("Collection goal reached ({count}/{})", self.tuning.total_required);
        }
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current_vision_radius(&self) -> f32 {
        self.vision.current_radius()
    }

    pub fn exposure_level(&self) -> f32 {
        self.exposure.level()
    }

    pub fn stamina_ratio(&self) -> f32 {
        self.stamina.ratio()
    }

    pub fn is_sprinting(&self) -> bool {
        self.stamina.is_sprinting()
    }

    pub fn active_threat_count(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Player speed for the current sprint state
    pub fn movement_speed(&self) -> f32 {
        if self.stamina.is_sprinting() {
            self.tuning.sprint_speed
        } else {
            self.tuning.walk_speed
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_over()
    }

    pub fn glasses_collected(&self) -> u32 {
        self.glasses_collected
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> Option<&PlayerView> {
        self.player.as_ref()
    }

    pub fn scheduler(&self) -> &ThreatScheduler {
        &self.scheduler
    }

    pub fn stamina(&self) -> &Stamina {
        &self.stamina
    }

    pub fn exposure(&self) -> &ExposureAccumulator {
        &self.exposure
    }

    /// Viewport centred on the player using the configured half extents
    pub fn default_viewport(&self) -> Option<Aabb> {
        self.player
            .map(|p| Aabb::from_center(p.position, self.tuning.viewport_half_extents))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            elapsed: self.elapsed,
            vision_radius: self.current_vision_radius(),
            exposure: self.exposure_level(),
            stamina_ratio: self.stamina_ratio(),
            sprinting: self.is_sprinting(),
            active_threats: self.active_threat_count(),
            glasses_collected: self.glasses_collected,
            total_required: self.tuning.total_required,
        }
    }
}
