use tracing::{debug, info, warn};

use crate::grid::TileCoord;

use super::actor::{ActionKind, ActorId, DeferredAction};
use super::events::SimEvent;
use super::world::ActorWorld;
use super::SimError;

impl ActorWorld {
    /// Walks toward `tile` and runs `kind` once the path empties. Replaces any
    /// action already queued for the actor. A fight with anyone other than
    /// `target` is left before the path is issued.
    pub fn walk_to_and_act(
        &mut self,
        id: ActorId,
        tile: TileCoord,
        kind: ActionKind,
        target: Option<ActorId>,
    ) -> Result<(), SimError> {
        let index = self.living_index(id)?;
        if self.actors[index]
            .combat_target
            .is_some_and(|current| Some(current) != target)
        {
            self.leave_combat(id);
        }
        self.issue_path(id, tile, false)?;

        let action = DeferredAction { kind, target };
        if let Some(previous) = self.actors[index].deferred_action.replace(action) {
            debug!(actor = %id, previous = ?previous.kind, next = ?kind, "deferred_action_replaced");
        }

        if self.actors[index].path.is_empty() {
            if let Some(action) = self.actors[index].deferred_action.take() {
                self.execute_action(id, action);
            }
        }
        Ok(())
    }

    pub(crate) fn execute_action(&mut self, id: ActorId, action: DeferredAction) {
        if let Some(target) = action.target {
            if !self.is_alive(target) {
                debug!(actor = %id, target = %target, kind = ?action.kind, "action_target_gone");
                self.events.emit(SimEvent::ActionDropped {
                    actor: id,
                    kind: action.kind,
                });
                return;
            }
        }

        self.events.emit(SimEvent::ActionExecuted {
            actor: id,
            kind: action.kind,
            target: action.target,
        });
        let Some(target) = action.target else {
            return;
        };

        match action.kind {
            ActionKind::Attack => {
                if let Err(err) = self.enter_combat(id, target) {
                    warn!(actor = %id, target = %target, error = %err, "attack_action_failed");
                }
            }
            ActionKind::Talk => self.open_dialogue(id, target),
            ActionKind::Examine => self.examine(id, target),
        }
    }

    fn open_dialogue(&mut self, listener: ActorId, speaker: ActorId) {
        let Some(lines) = self
            .actor(speaker)
            .map(|actor| actor.dialogue())
            .filter(|lines| !lines.is_empty())
        else {
            debug!(actor = %listener, target = %speaker, "nothing_to_say");
            return;
        };
        info!(speaker = %speaker, listener = %listener, lines = ?lines, "dialogue_opened");
        self.events
            .emit(SimEvent::DialogueOpened { speaker, listener });
    }

    pub(crate) fn examine(&mut self, id: ActorId, target: ActorId) {
        let Some(description) = self.describe(target) else {
            return;
        };
        info!(actor = %id, target = %target, %description, "examined");
        self.events.emit(SimEvent::Examined { actor: id, target });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::grid::{TileCoord, Tilemap};
    use crate::sim::{
        ActionKind, ActorId, ActorSeed, ActorWorld, BehaviorKind, DeferredAction, Intent,
        SimEvent, Vitals,
    };

    fn world() -> ActorWorld {
        ActorWorld::new(
            Tilemap::filled(12, 12, 0).expect("tilemap"),
            SimConfig::default(),
        )
    }

    fn seed(name: &str, x: i32, y: i32, behavior: BehaviorKind) -> ActorSeed {
        ActorSeed {
            name: name.to_string(),
            position: TileCoord::new(x, y),
            vitals: Vitals {
                level: 1,
                max_health: 30,
                attack_power: 5,
                defense: 1,
                attack_interval_seconds: 1.0,
            },
            behavior,
            move_interval_seconds: None,
            starting_health: None,
        }
    }

    fn elder() -> BehaviorKind {
        BehaviorKind::Friendly {
            dialogue: vec!["Welcome.".to_string(), "Enjoy your stay.".to_string()],
        }
    }

    fn count(world: &ActorWorld, predicate: impl Fn(&SimEvent) -> bool) -> usize {
        world.events().iter().filter(|event| predicate(event)).count()
    }

    #[test]
    fn action_on_own_tile_runs_immediately() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let elder = world.spawn(seed("Elder", 2, 1, elder())).expect("elder");

        world
            .walk_to_and_act(hero, TileCoord::new(1, 1), ActionKind::Talk, Some(elder))
            .expect("act");

        assert_eq!(world.actor(hero).expect("hero").deferred_action(), None);
        assert_eq!(
            count(&world, |event| matches!(event, SimEvent::DialogueOpened { .. })),
            1
        );
    }

    #[test]
    fn replacing_the_queued_action_keeps_only_the_latest() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let elder = world.spawn(seed("Elder", 6, 1, elder())).expect("elder");

        world
            .walk_to_and_act(hero, TileCoord::new(6, 1), ActionKind::Talk, Some(elder))
            .expect("talk");
        world
            .walk_to_and_act(hero, TileCoord::new(6, 1), ActionKind::Examine, Some(elder))
            .expect("examine");

        assert_eq!(
            world.actor(hero).expect("hero").deferred_action(),
            Some(DeferredAction {
                kind: ActionKind::Examine,
                target: Some(elder)
            })
        );
    }

    #[test]
    fn attack_action_enters_combat_on_arrival() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let dummy = world
            .spawn(seed(
                "Dummy",
                3,
                1,
                BehaviorKind::Friendly {
                    dialogue: Vec::new(),
                },
            ))
            .expect("dummy");

        world
            .walk_to_and_act(hero, TileCoord::new(3, 1), ActionKind::Attack, Some(dummy))
            .expect("attack");
        for _ in 0..20 {
            world.tick(0.05);
        }

        let actor = world.actor(hero).expect("hero");
        assert_eq!(actor.position(), TileCoord::new(2, 1));
        assert_eq!(actor.combat_target(), Some(dummy));
        assert_eq!(actor.intent(), Intent::Fighting);
        assert!(world.actor(dummy).expect("dummy").health() < 30);
    }

    #[test]
    fn action_against_dead_target_is_dropped() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let elder = world.spawn(seed("Elder", 4, 1, elder())).expect("elder");

        world
            .walk_to_and_act(hero, TileCoord::new(4, 1), ActionKind::Talk, Some(elder))
            .expect("talk");
        world.apply_damage(elder, 100, None).expect("kill");
        for _ in 0..20 {
            world.tick(0.05);
        }

        assert_eq!(
            count(&world, |event| matches!(event, SimEvent::DialogueOpened { .. })),
            0
        );
        assert_eq!(
            count(&world, |event| *event
                == SimEvent::ActionDropped {
                    actor: hero,
                    kind: ActionKind::Talk
                }),
            1
        );
        assert_eq!(world.actor(hero).expect("hero").deferred_action(), None);
    }

    #[test]
    fn talking_to_someone_without_lines_opens_nothing() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let mute = world
            .spawn(seed(
                "Mute",
                2,
                2,
                BehaviorKind::Friendly {
                    dialogue: Vec::new(),
                },
            ))
            .expect("mute");

        world
            .walk_to_and_act(hero, TileCoord::new(1, 1), ActionKind::Talk, Some(mute))
            .expect("talk");

        assert_eq!(
            count(&world, |event| matches!(event, SimEvent::DialogueOpened { .. })),
            0
        );
        assert_eq!(
            count(&world, |event| matches!(
                event,
                SimEvent::ActionExecuted {
                    kind: ActionKind::Talk,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn acting_on_someone_else_mid_fight_leaves_the_fight_and_walks() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let dummy = world
            .spawn(seed(
                "Dummy",
                2,
                1,
                BehaviorKind::Friendly {
                    dialogue: Vec::new(),
                },
            ))
            .expect("dummy");
        let elder = world.spawn(seed("Elder", 6, 1, elder())).expect("elder");
        world.enter_combat(hero, dummy).expect("enter");

        world
            .walk_to_and_act(hero, TileCoord::new(6, 1), ActionKind::Talk, Some(elder))
            .expect("talk");

        let actor = world.actor(hero).expect("hero");
        assert_eq!(actor.combat_target(), None);
        assert_eq!(actor.intent(), Intent::Walking);
        assert_eq!(actor.destination(), Some(TileCoord::new(6, 1)));
        assert_eq!(
            actor.deferred_action(),
            Some(DeferredAction {
                kind: ActionKind::Talk,
                target: Some(elder)
            })
        );
        assert_eq!(world.actor(dummy).expect("dummy").combat_target(), None);
        assert_eq!(
            count(&world, |event| matches!(event, SimEvent::DialogueOpened { .. })),
            0
        );
    }

    #[test]
    fn acting_on_the_current_opponent_keeps_the_fight() {
        let mut world = world();
        let hero = world
            .spawn(seed("Hero", 1, 1, BehaviorKind::Player))
            .expect("hero");
        let dummy = world
            .spawn(seed(
                "Dummy",
                2,
                1,
                BehaviorKind::Friendly {
                    dialogue: Vec::new(),
                },
            ))
            .expect("dummy");
        world.enter_combat(hero, dummy).expect("enter");

        world
            .walk_to_and_act(hero, TileCoord::new(2, 1), ActionKind::Attack, Some(dummy))
            .expect("attack");

        assert_eq!(world.actor(hero).expect("hero").combat_target(), Some(dummy));
        assert_eq!(world.actor(dummy).expect("dummy").combat_target(), Some(hero));
    }

    #[test]
    fn unknown_actor_cannot_queue_actions() {
        let mut world = world();
        let error = world
            .walk_to_and_act(ActorId(7), TileCoord::new(1, 1), ActionKind::Examine, None)
            .expect_err("unknown actor");
        assert_eq!(error, crate::sim::SimError::UnknownActor(ActorId(7)));
    }
}
