use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::grid::{line_steps, TileCoord, Tilemap};

use super::actor::{Actor, ActorId, ActorSeed, BehaviorKind, Intent};
use super::events::{EventBus, EventCounts, SimEvent};
use super::{SimError, MELEE_RANGE};

/// Owns the population and advances it one fixed step at a time.
#[derive(Debug)]
pub struct ActorWorld {
    pub(crate) config: SimConfig,
    pub(crate) tilemap: Tilemap,
    pub(crate) actors: Vec<Actor>,
    next_actor_id: u64,
    pub(crate) protagonist: Option<ActorId>,
    pub(crate) events: EventBus,
    tick_count: u64,
    elapsed_seconds: f64,
}

impl ActorWorld {
    pub fn new(tilemap: Tilemap, config: SimConfig) -> Self {
        Self {
            config,
            tilemap,
            actors: Vec::new(),
            next_actor_id: 0,
            protagonist: None,
            events: EventBus::default(),
            tick_count: 0,
            elapsed_seconds: 0.0,
        }
    }

    pub fn spawn(&mut self, seed: ActorSeed) -> Result<ActorId, SimError> {
        validate_seed(&seed)?;
        if self.actors.iter().any(|actor| actor.name == seed.name) {
            return Err(SimError::DuplicateName(seed.name));
        }
        if !self.tilemap.contains(seed.position) {
            return Err(self.out_of_bounds(seed.position));
        }
        if matches!(seed.behavior, BehaviorKind::Player) {
            if let Some(existing) = self.protagonist {
                return Err(SimError::ProtagonistAlreadySet(existing));
            }
        }

        let id = ActorId(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        let move_interval = seed
            .move_interval_seconds
            .unwrap_or(self.config.default_move_interval_seconds);
        let actor = Actor::from_seed(id, seed, move_interval);
        if actor.is_player() {
            self.protagonist = Some(id);
        }
        info!(
            actor = %id,
            name = %actor.name,
            tile = %actor.position,
            health = actor.health,
            "actor_spawned"
        );
        self.actors.push(actor);
        Ok(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn actor_by_name(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.name == name)
    }

    /// Population in insertion order, dead actors included.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn protagonist(&self) -> Option<ActorId> {
        self.protagonist
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn last_tick_counts(&self) -> EventCounts {
        self.events.last_tick_counts()
    }

    /// Living actor standing on `tile`, ignoring `excluding`.
    pub fn occupant_at(&self, tile: TileCoord, excluding: Option<ActorId>) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|actor| actor.alive && actor.position == tile && Some(actor.id) != excluding)
            .map(|actor| actor.id)
    }

    pub fn is_tile_occupied(&self, tile: TileCoord, excluding: Option<ActorId>) -> bool {
        self.occupant_at(tile, excluding).is_some()
    }

    /// Replaces the actor's path with straight-line steps toward `tile`.
    ///
    /// A manual command first ends any combat relationship and drops the
    /// deferred action. Returns the number of queued steps. A tile outside
    /// the grid leaves the actor with an empty path and no deferred action.
    pub fn issue_path(
        &mut self,
        id: ActorId,
        tile: TileCoord,
        is_manual: bool,
    ) -> Result<usize, SimError> {
        let index = self.living_index(id)?;
        if !self.tilemap.contains(tile) {
            warn!(actor = %id, tile = %tile, "path_target_out_of_bounds");
            let actor = &mut self.actors[index];
            actor.clear_path();
            if actor.intent == Intent::Walking {
                actor.settle_intent();
            }
            self.drop_deferred_action(id);
            return Err(self.out_of_bounds(tile));
        }
        if is_manual {
            self.leave_combat(id);
            self.drop_deferred_action(id);
        }
        let steps = self.assign_path(index, tile);
        debug!(actor = %id, tile = %tile, steps, manual = is_manual, "path_issued");
        Ok(steps)
    }

    /// Advances every living actor once, in insertion order.
    pub fn tick(&mut self, dt_seconds: f32) {
        let dt_seconds = if dt_seconds.is_finite() && dt_seconds > 0.0 {
            dt_seconds
        } else {
            0.0
        };

        let ids: Vec<ActorId> = self.actors.iter().map(|actor| actor.id).collect();
        for id in ids {
            if !self.is_alive(id) {
                continue;
            }
            self.run_behavior(id);
            self.run_movement(id, dt_seconds);
            if self.is_alive(id) {
                self.run_combat_tick(id, dt_seconds);
            }
        }

        self.sweep_stale_targets();
        self.tick_count = self.tick_count.saturating_add(1);
        self.elapsed_seconds += f64::from(dt_seconds);
        self.events.finish_tick();
    }

    pub(crate) fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.iter().position(|actor| actor.id == id)
    }

    pub(crate) fn living_index(&self, id: ActorId) -> Result<usize, SimError> {
        let index = self.index_of(id).ok_or(SimError::UnknownActor(id))?;
        if !self.actors[index].alive {
            return Err(SimError::ActorDead(id));
        }
        Ok(index)
    }

    pub(crate) fn is_alive(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|actor| actor.alive)
    }

    pub(crate) fn out_of_bounds(&self, tile: TileCoord) -> SimError {
        SimError::OutOfBounds {
            tile,
            width: self.tilemap.width(),
            height: self.tilemap.height(),
        }
    }

    /// Whether the actor at `index` stands within melee range of a living
    /// combat target.
    pub(crate) fn in_melee_with_target(&self, index: usize) -> bool {
        let actor = &self.actors[index];
        actor
            .combat_target
            .and_then(|target| self.actor(target))
            .is_some_and(|target| {
                target.alive && actor.position.chebyshev_distance(target.position) <= MELEE_RANGE
            })
    }

    pub(crate) fn assign_path(&mut self, index: usize, tile: TileCoord) -> usize {
        let fighting_in_melee =
            self.actors[index].intent == Intent::Fighting && self.in_melee_with_target(index);
        let actor = &mut self.actors[index];
        if fighting_in_melee {
            actor.clear_path();
            return 0;
        }

        actor.path = line_steps(actor.position, tile).into_iter().collect();
        if actor.path.is_empty() {
            actor.destination = None;
        } else {
            actor.destination = Some(tile);
            actor.intent = Intent::Walking;
        }
        actor.path.len()
    }

    pub(crate) fn drop_deferred_action(&mut self, id: ActorId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        if let Some(action) = self.actors[index].deferred_action.take() {
            debug!(actor = %id, kind = ?action.kind, "deferred_action_dropped");
            self.events.emit(SimEvent::ActionDropped {
                actor: id,
                kind: action.kind,
            });
        }
    }

    pub(crate) fn sweep_stale_targets(&mut self) {
        let stale: Vec<(ActorId, ActorId)> = self
            .actors
            .iter()
            .filter(|actor| actor.alive)
            .filter_map(|actor| {
                let target = actor.combat_target?;
                (!self.is_alive(target)).then_some((actor.id, target))
            })
            .collect();

        for (id, former_target) in stale {
            warn!(actor = %id, former_target = %former_target, "stale_combat_target_cleared");
            if let Some(index) = self.index_of(id) {
                let actor = &mut self.actors[index];
                actor.combat_target = None;
                actor.settle_intent();
            }
            self.events.emit(SimEvent::StaleTargetCleared {
                actor: id,
                former_target,
            });
            self.refresh_engaged(id);
        }

        let orphaned: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|actor| actor.alive)
            .filter(|actor| {
                actor
                    .deferred_action
                    .and_then(|action| action.target)
                    .is_some_and(|target| !self.is_alive(target))
            })
            .map(|actor| actor.id)
            .collect();
        for id in orphaned {
            self.drop_deferred_action(id);
        }
    }
}

fn validate_seed(seed: &ActorSeed) -> Result<(), SimError> {
    let invalid = |reason| SimError::InvalidVitals {
        name: seed.name.clone(),
        reason,
    };
    if seed.name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if seed.vitals.level == 0 {
        return Err(invalid("level must be at least 1"));
    }
    if seed.vitals.max_health == 0 {
        return Err(invalid("max health must be positive"));
    }
    if !(seed.vitals.attack_interval_seconds.is_finite()
        && seed.vitals.attack_interval_seconds > 0.0)
    {
        return Err(invalid("attack interval must be a positive number"));
    }
    if let Some(interval) = seed.move_interval_seconds {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(invalid("move interval must be a positive number"));
        }
    }
    Ok(())
}
