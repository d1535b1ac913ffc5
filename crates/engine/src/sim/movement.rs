use tracing::{debug, warn};

use super::actor::{ActorId, Intent};
use super::events::{PathCancelReason, SimEvent};
use super::world::ActorWorld;

impl ActorWorld {
    /// Consumes at most one step of the actor's path.
    pub(crate) fn run_movement(&mut self, id: ActorId, dt_seconds: f32) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.actors[index].tick_cooldowns(dt_seconds);

        if self.actors[index].intent == Intent::Fighting && self.in_melee_with_target(index) {
            self.actors[index].clear_path();
            return;
        }

        let actor = &self.actors[index];
        if actor.move_cooldown_seconds > 0.0 {
            return;
        }
        let Some(&next) = actor.path.front() else {
            return;
        };

        if !self.tilemap.contains(next) {
            warn!(actor = %id, tile = %next, "path_step_out_of_bounds");
            self.abort_path(id, PathCancelReason::OutOfBounds { tile: next });
            return;
        }

        if let Some(occupant) = self.occupant_at(next, Some(id)) {
            let actor = &self.actors[index];
            let deferred_target = actor.deferred_action.and_then(|action| action.target);
            if actor.combat_target == Some(occupant) || deferred_target == Some(occupant) {
                debug!(actor = %id, target = %occupant, "arrived_next_to_target");
                self.actors[index].path.clear();
            } else {
                debug!(actor = %id, tile = %next, occupant = %occupant, "path_blocked");
                self.abort_path(
                    id,
                    PathCancelReason::Blocked {
                        tile: next,
                        occupant,
                    },
                );
                return;
            }
        } else {
            let actor = &mut self.actors[index];
            actor.path.pop_front();
            actor.position = next;
            actor.move_cooldown_seconds = actor.move_interval_seconds;
        }

        if self.actors[index].path.is_empty() {
            self.finish_path(id);
        }
    }

    fn abort_path(&mut self, id: ActorId, reason: PathCancelReason) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let actor = &mut self.actors[index];
        actor.clear_path();
        actor.set_chasing(false);
        self.events
            .emit(SimEvent::PathCancelled { actor: id, reason });
        self.drop_deferred_action(id);
        if self.actors[index].engaged {
            self.leave_combat(id);
        }

        let actor = &mut self.actors[index];
        if actor.intent == Intent::Walking {
            actor.settle_intent();
        }
    }

    fn finish_path(&mut self, id: ActorId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let actor = &mut self.actors[index];
        if actor.destination.take().is_some() {
            let tile = actor.position;
            self.events
                .emit(SimEvent::DestinationReached { actor: id, tile });
        }

        if let Some(action) = self.actors[index].deferred_action.take() {
            self.execute_action(id, action);
        }

        let actor = &mut self.actors[index];
        if actor.alive && actor.intent == Intent::Walking && actor.path.is_empty() {
            actor.intent = if actor.combat_target.is_some() {
                Intent::Fighting
            } else {
                Intent::Idle
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::grid::{TileCoord, Tilemap};
    use crate::sim::{
        ActionKind, ActorSeed, ActorWorld, BehaviorKind, Intent, PathCancelReason, SimError,
        SimEvent, Vitals,
    };

    const MOVE_INTERVAL: f32 = 0.15;

    fn world() -> ActorWorld {
        ActorWorld::new(
            Tilemap::filled(10, 10, 0).expect("tilemap"),
            SimConfig::default(),
        )
    }

    fn walker(name: &str, x: i32, y: i32) -> ActorSeed {
        ActorSeed {
            name: name.to_string(),
            position: TileCoord::new(x, y),
            vitals: Vitals {
                level: 1,
                max_health: 10,
                attack_power: 1,
                defense: 0,
                attack_interval_seconds: 1.0,
            },
            behavior: BehaviorKind::Friendly {
                dialogue: Vec::new(),
            },
            move_interval_seconds: Some(MOVE_INTERVAL),
            starting_health: None,
        }
    }

    #[test]
    fn steps_one_tile_per_elapsed_move_interval() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 0, 0)).expect("spawn");
        assert_eq!(world.issue_path(id, TileCoord::new(3, 0), false), Ok(3));
        assert_eq!(world.actor(id).expect("actor").intent(), Intent::Walking);

        world.tick(0.05);
        assert_eq!(world.actor(id).expect("actor").position(), TileCoord::new(1, 0));
        world.tick(0.05);
        world.tick(0.05);
        assert_eq!(world.actor(id).expect("actor").position(), TileCoord::new(1, 0));
        world.tick(0.1);
        assert_eq!(world.actor(id).expect("actor").position(), TileCoord::new(2, 0));
        world.tick(MOVE_INTERVAL);
        world.tick(MOVE_INTERVAL);

        let actor = world.actor(id).expect("actor");
        assert_eq!(actor.position(), TileCoord::new(3, 0));
        assert!(actor.path().is_empty());
        assert_eq!(actor.destination(), None);
        assert_eq!(actor.intent(), Intent::Idle);
        assert!(world
            .events()
            .iter()
            .any(|event| *event
                == SimEvent::DestinationReached {
                    actor: id,
                    tile: TileCoord::new(3, 0)
                }));
    }

    #[test]
    fn move_cooldown_never_goes_negative() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 0, 0)).expect("spawn");
        world.issue_path(id, TileCoord::new(1, 0), false).expect("path");
        world.tick(0.01);
        for _ in 0..40 {
            world.tick(0.01);
            assert!(world.actor(id).expect("actor").move_cooldown_seconds() >= 0.0);
        }
        assert_eq!(world.actor(id).expect("actor").move_cooldown_seconds(), 0.0);
    }

    #[test]
    fn blocked_step_cancels_path_without_moving() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 0, 0)).expect("spawn");
        let blocker = world.spawn(walker("Blocker", 2, 0)).expect("spawn");
        world.issue_path(id, TileCoord::new(4, 0), false).expect("path");

        world.tick(MOVE_INTERVAL);
        world.tick(MOVE_INTERVAL);

        let actor = world.actor(id).expect("actor");
        assert_eq!(actor.position(), TileCoord::new(1, 0));
        assert!(actor.path().is_empty());
        assert_eq!(actor.destination(), None);
        assert_eq!(actor.intent(), Intent::Idle);
        assert!(world.events().iter().any(|event| *event
            == SimEvent::PathCancelled {
                actor: id,
                reason: PathCancelReason::Blocked {
                    tile: TileCoord::new(2, 0),
                    occupant: blocker,
                },
            }));
    }

    #[test]
    fn dead_actors_do_not_block() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 0, 0)).expect("spawn");
        let corpse = world.spawn(walker("Corpse", 1, 0)).expect("spawn");
        world.apply_damage(corpse, 100, None).expect("damage");
        assert!(!world.is_tile_occupied(TileCoord::new(1, 0), None));

        world.issue_path(id, TileCoord::new(2, 0), false).expect("path");
        world.tick(MOVE_INTERVAL);
        world.tick(MOVE_INTERVAL);
        assert_eq!(world.actor(id).expect("actor").position(), TileCoord::new(2, 0));
    }

    #[test]
    fn out_of_bounds_step_cancels_path() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 9, 9)).expect("spawn");
        let index = world.index_of(id).expect("index");
        world.actors[index].path.push_back(TileCoord::new(10, 9));
        world.actors[index].destination = Some(TileCoord::new(10, 9));
        world.actors[index].intent = Intent::Walking;

        world.tick(MOVE_INTERVAL);

        let actor = world.actor(id).expect("actor");
        assert_eq!(actor.position(), TileCoord::new(9, 9));
        assert!(actor.path().is_empty());
        assert_eq!(actor.destination(), None);
        assert_eq!(actor.intent(), Intent::Idle);
        assert!(world.events().iter().any(|event| matches!(
            event,
            SimEvent::PathCancelled {
                reason: PathCancelReason::OutOfBounds { .. },
                ..
            }
        )));
    }

    #[test]
    fn issuing_out_of_bounds_path_yields_an_empty_path() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 2, 2)).expect("spawn");
        let friend = world.spawn(walker("Friend", 6, 2)).expect("spawn");
        world
            .walk_to_and_act(id, TileCoord::new(6, 2), ActionKind::Talk, Some(friend))
            .expect("walk and talk");
        assert_eq!(world.actor(id).expect("actor").path().len(), 4);

        let error = world
            .issue_path(id, TileCoord::new(40, 2), false)
            .expect_err("out of bounds");
        assert!(matches!(error, SimError::OutOfBounds { .. }));

        let actor = world.actor(id).expect("actor");
        assert!(actor.path().is_empty());
        assert_eq!(actor.destination(), None);
        assert_eq!(actor.deferred_action(), None);
        assert_eq!(actor.intent(), Intent::Idle);
        assert_eq!(actor.position(), TileCoord::new(2, 2));
        assert!(world.events().iter().any(|event| *event
            == SimEvent::ActionDropped {
                actor: id,
                kind: ActionKind::Talk
            }));
    }

    #[test]
    fn issuing_path_to_own_tile_queues_nothing() {
        let mut world = world();
        let id = world.spawn(walker("Walker", 2, 2)).expect("spawn");
        assert_eq!(world.issue_path(id, TileCoord::new(2, 2), false), Ok(0));
        let actor = world.actor(id).expect("actor");
        assert_eq!(actor.intent(), Intent::Idle);
        assert_eq!(actor.destination(), None);
    }
}
