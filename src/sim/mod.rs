//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by threat ID)
//! - No rendering, audio or input dependencies

pub mod exposure;
pub mod scheduler;
pub mod shape;
pub mod stamina;
pub mod state;
pub mod threat;
pub mod tick;
pub mod vision;

pub use exposure::{ExposureAccumulator, ExposureReport, ExposureRules};
pub use scheduler::{
    PlayerView, ScheduleContext, ScheduleEvent, SchedulePhase, SpawnRules, SpawnSample,
    ThreatScheduler, lifetime_curve, placement_for,
};
pub use shape::{Aabb, Silhouette};
pub use stamina::{Stamina, StaminaRates};
pub use state::{GameEvent, GamePhase, Simulation, Snapshot};
pub use threat::{FadeTimings, Placement, Threat, ThreatId, ThreatPhase};
pub use tick::{TickInput, tick};
pub use vision::VisionModel;
