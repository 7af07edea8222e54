//! Per-tick simulation step
//!
//! Order: stamina, scheduler (spawn/despawn and threat aging), exposure,
//! then terminal checks.

use glam::Vec2;

use super::scheduler::{PlayerView, ScheduleContext, ScheduleEvent};
use super::shape::Aabb;
use super::state::{GameEvent, GamePhase, Simulation};

/// Inputs for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player position this tick (None while the player is not placed)
    pub player_position: Option<Vec2>,
    /// Sprint key held
    pub sprint: bool,
    /// Camera rectangle; defaults to a player-centred viewport
    pub viewport: Option<Aabb>,
}

/// Advance the simulation by `dt` seconds
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) {
    if sim.phase.is_over() {
        return;
    }

    sim.time_ticks += 1;
    sim.elapsed += dt;

    // Resolve the player and its displacement since last tick
    sim.player = input.player_position.map(|position| {
        let displacement = sim
            .player
            .map_or(Vec2::ZERO, |previous| position - previous.position);
        PlayerView {
            position,
            displacement,
        }
    });
    let moving = sim.player.is_some_and(|p| p.is_moving());

    sim.stamina.update(input.sprint, moving, dt);

    let ctx = ScheduleContext {
        player: sim.player,
        glasses_collected: sim.glasses_collected,
        total_required: sim.tuning.total_required,
        vision_radius: sim.vision.current_radius(),
    };
    for event in sim.scheduler.update(&ctx, &mut sim.rng, dt) {
        sim.events.push(match event {
            ScheduleEvent::Spawned {
                id,
                position,
                placement,
                ..
            } => GameEvent::ThreatSpawned {
                id,
                position,
                placement,
            },
            ScheduleEvent::Despawned(id) => GameEvent::ThreatDespawned(id),
        });
    }

    let Some(viewport) = input.viewport.or_else(|| sim.default_viewport()) else {
        return;
    };
    let report = sim.exposure.update(
        sim.scheduler.threats(),
        sim.player.map(|p| p.position),
        &viewport,
        sim.vision.current_radius(),
        sim.glasses_collected,
        dt,
    );

    for id in report.visible {
        if sim.scheduler.mark_seen(id) {
            log::debug!("{id} seen for the first time");
            sim.events.push(GameEvent::ThreatFirstSeen(id));
        }
    }

    if report.saturated_now {
        sim.phase = GamePhase::Lost;
        sim.events.push(GameEvent::Lost);
        log::info!("Run lost after {:.1}s", sim.elapsed);
    }
}
