//! Drives one episode of the agent against a simulated world.
use anyhow::Result;
use scout_content::Scenario;
use scout_core::{PcgRng, StepRequest};
use scout_runtime::Runtime;

use crate::sim::{EpisodeOutcome, EpisodeSummary, SimWorld, UnitState};

/// Runs `scenario` to completion and persists the learned board.
///
/// Each tick: the agent ingests unit reports, every active unit moves one
/// step in scenario order, then towers fire. Damage taken during a tick is
/// observed at the start of the next one.
pub fn run_episode(runtime: &Runtime, scenario: &Scenario) -> Result<EpisodeSummary> {
    let rng = PcgRng;
    let weapon = runtime.config().scout.weapon();
    let starts: Vec<_> = scenario.starting_positions().collect();

    let mut world = SimWorld::new(scenario);
    let mut episode = runtime.start_episode(scenario.dimensions, &starts)?;
    let seed = episode.seed();
    let resumed = episode.resumed();

    tracing::info!(
        "Episode start: scenario={} board={} seed={} resumed={}",
        scenario.name,
        episode.key(),
        seed,
        resumed
    );

    while !world.is_settled() && episode.tick().0 < scenario.max_ticks {
        let outcome = episode.observe(&world.reports(), &world)?;

        let active: Vec<_> = world
            .units()
            .iter()
            .filter(|u| u.is_active())
            .copied()
            .collect();
        for unit in active {
            let request = StepRequest {
                unit: unit.id,
                origin: unit.position,
                goal: world.goal(),
                was_hit: outcome.was_hit(unit.id),
            };
            let decision = episode.plan(&request, world.occupancy(unit.id), &rng);
            if let Some(direction) = decision.direction_from(unit.position)
                && !world.move_unit(unit.id, direction)
            {
                tracing::debug!("Unit {} could not move {}", unit.id, direction);
            }
        }

        let damaged = world.fire_towers(&rng, weapon, seed, episode.tick());
        for unit in world.units().iter().filter(|u| !u.is_active()) {
            if unit.state == UnitState::Dead && damaged.contains(&unit.id) {
                tracing::info!("Unit {} was destroyed at {}", unit.id, unit.position);
            }
            episode.retire(unit.id);
        }

        episode.advance();
    }

    let ticks = episode.tick().0;
    let hits = episode.hits();
    let board = episode.key().to_string();
    let grid = runtime.finish_episode(episode)?;
    let towers_found = world
        .towers()
        .iter()
        .filter(|t| grid.cell(**t).is_ok_and(|c| c.is_certain_tower()))
        .count();

    let arrived = world.count(UnitState::Arrived);
    let died = world.count(UnitState::Dead);
    let outcome = if !world.is_settled() {
        EpisodeOutcome::TimedOut
    } else if arrived == 0 {
        EpisodeOutcome::WipedOut
    } else {
        EpisodeOutcome::Completed
    };

    tracing::info!(
        "Episode end: outcome={:?} ticks={} arrived={} died={}",
        outcome,
        ticks,
        arrived,
        died
    );

    Ok(EpisodeSummary {
        scenario: scenario.name.clone(),
        board,
        seed,
        resumed,
        outcome,
        ticks,
        arrived,
        died,
        hits,
        towers_found,
        towers_total: world.towers().len(),
    })
}
