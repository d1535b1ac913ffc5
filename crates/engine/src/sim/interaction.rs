use crate::grid::TileCoord;

use super::actor::{ActionKind, ActorId, BehaviorKind};
use super::world::ActorWorld;
use super::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionCommand {
    WalkHere(TileCoord),
    Act { kind: ActionKind, target: ActorId },
}

/// One entry of a context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOption {
    pub label: String,
    pub command: InteractionCommand,
}

impl InteractionOption {
    pub fn walk_here(tile: TileCoord) -> Self {
        Self {
            label: "Walk here".to_string(),
            command: InteractionCommand::WalkHere(tile),
        }
    }
}

impl ActorWorld {
    /// Options `interactor` gets when opening a menu on `target`.
    pub fn interaction_options(
        &self,
        target: ActorId,
        interactor: ActorId,
    ) -> Result<Vec<InteractionOption>, SimError> {
        let subject = self.actor(target).ok_or(SimError::UnknownActor(target))?;
        if self.actor(interactor).is_none() {
            return Err(SimError::UnknownActor(interactor));
        }

        let mut options = Vec::new();
        if subject.alive && target != interactor {
            match subject.behavior {
                BehaviorKind::Hostile(_) => options.push(InteractionOption {
                    label: format!(
                        "{} {} (level {})",
                        ActionKind::Attack.verb(),
                        subject.name,
                        subject.vitals.level
                    ),
                    command: InteractionCommand::Act {
                        kind: ActionKind::Attack,
                        target,
                    },
                }),
                BehaviorKind::Friendly { .. } => options.push(InteractionOption {
                    label: format!("{} {}", ActionKind::Talk.verb(), subject.name),
                    command: InteractionCommand::Act {
                        kind: ActionKind::Talk,
                        target,
                    },
                }),
                BehaviorKind::Player => {}
            }
        }
        options.push(InteractionOption {
            label: format!("{} {}", ActionKind::Examine.verb(), subject.name),
            command: InteractionCommand::Act {
                kind: ActionKind::Examine,
                target,
            },
        });
        Ok(options)
    }

    pub fn walk_here_option(&self, tile: TileCoord) -> InteractionOption {
        InteractionOption::walk_here(tile)
    }

    pub fn invoke_option(
        &mut self,
        interactor: ActorId,
        option: &InteractionOption,
    ) -> Result<(), SimError> {
        match option.command {
            InteractionCommand::WalkHere(tile) => {
                self.issue_path(interactor, tile, true)?;
                Ok(())
            }
            InteractionCommand::Act {
                kind: ActionKind::Examine,
                target,
            } => {
                self.living_index(interactor)?;
                if self.actor(target).is_none() {
                    return Err(SimError::UnknownActor(target));
                }
                self.examine(interactor, target);
                Ok(())
            }
            InteractionCommand::Act { kind, target } => {
                self.living_index(interactor)?;
                if target == interactor {
                    return Err(SimError::SelfTarget(interactor));
                }
                let target_tile = self.actors[self.living_index(target)?].position;
                self.walk_to_and_act(interactor, target_tile, kind, Some(target))
            }
        }
    }

    /// One-line examine text.
    pub fn describe(&self, id: ActorId) -> Option<String> {
        let actor = self.actor(id)?;
        if !actor.alive {
            return Some(format!("The corpse of {}.", actor.name));
        }
        Some(format!(
            "{}, level {} ({}/{} hp)",
            actor.name, actor.vitals.level, actor.health, actor.vitals.max_health
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimConfig;
    use crate::grid::{TileCoord, Tilemap};
    use crate::sim::{
        ActionKind, ActorId, ActorSeed, ActorWorld, BehaviorKind, HostileController,
        InteractionCommand, SimError, SimEvent, Vitals,
    };

    fn seed(name: &str, x: i32, y: i32, level: u32, behavior: BehaviorKind) -> ActorSeed {
        ActorSeed {
            name: name.to_string(),
            position: TileCoord::new(x, y),
            vitals: Vitals {
                level,
                max_health: 30,
                attack_power: 5,
                defense: 1,
                attack_interval_seconds: 1.8,
            },
            behavior,
            move_interval_seconds: None,
            starting_health: None,
        }
    }

    fn populated() -> (ActorWorld, ActorId, ActorId, ActorId) {
        let mut world = ActorWorld::new(
            Tilemap::filled(20, 20, 0).expect("tilemap"),
            SimConfig::default(),
        );
        let hero = world
            .spawn(seed("Hero", 5, 5, 3, BehaviorKind::Player))
            .expect("hero");
        let elder = world
            .spawn(seed(
                "Old Man",
                8,
                8,
                1,
                BehaviorKind::Friendly {
                    dialogue: vec!["Welcome.".to_string()],
                },
            ))
            .expect("elder");
        let goblin = world
            .spawn(seed(
                "Goblin Fighter",
                17,
                17,
                2,
                BehaviorKind::Hostile(HostileController::new(TileCoord::new(17, 17), 2)),
            ))
            .expect("goblin");
        (world, hero, elder, goblin)
    }

    fn labels(world: &ActorWorld, target: ActorId, interactor: ActorId) -> Vec<String> {
        world
            .interaction_options(target, interactor)
            .expect("options")
            .into_iter()
            .map(|option| option.label)
            .collect()
    }

    #[test]
    fn options_depend_on_the_target_kind() {
        let (world, hero, elder, goblin) = populated();
        assert_eq!(
            labels(&world, goblin, hero),
            vec!["Attack Goblin Fighter (level 2)", "Examine Goblin Fighter"]
        );
        assert_eq!(
            labels(&world, elder, hero),
            vec!["Talk to Old Man", "Examine Old Man"]
        );
        assert_eq!(labels(&world, hero, hero), vec!["Examine Hero"]);
        assert_eq!(world.walk_here_option(TileCoord::new(3, 4)).label, "Walk here");
    }

    #[test]
    fn dead_targets_only_offer_examine() {
        let (mut world, hero, _elder, goblin) = populated();
        world.apply_damage(goblin, 30, Some(hero)).expect("kill");
        assert_eq!(labels(&world, goblin, hero), vec!["Examine Goblin Fighter"]);
        assert_eq!(
            world.describe(goblin).as_deref(),
            Some("The corpse of Goblin Fighter.")
        );
    }

    #[test]
    fn describe_reports_level_and_health() {
        let (world, _hero, elder, _goblin) = populated();
        assert_eq!(
            world.describe(elder).as_deref(),
            Some("Old Man, level 1 (30/30 hp)")
        );
        assert_eq!(world.describe(ActorId(42)), None);
    }

    #[test]
    fn examine_option_runs_without_walking() {
        let (mut world, hero, _elder, goblin) = populated();
        let options = world.interaction_options(goblin, hero).expect("options");
        let examine = options
            .iter()
            .find(|option| {
                matches!(
                    option.command,
                    InteractionCommand::Act {
                        kind: ActionKind::Examine,
                        ..
                    }
                )
            })
            .expect("examine option");

        world.invoke_option(hero, examine).expect("examine");

        let actor = world.actor(hero).expect("hero");
        assert!(actor.path().is_empty());
        assert!(world.events().iter().any(|event| *event
            == SimEvent::Examined {
                actor: hero,
                target: goblin
            }));
    }

    #[test]
    fn walk_here_issues_a_manual_path() {
        let (mut world, hero, _elder, _goblin) = populated();
        let option = world.walk_here_option(TileCoord::new(5, 9));
        world.invoke_option(hero, &option).expect("walk");
        let actor = world.actor(hero).expect("hero");
        assert_eq!(actor.path().len(), 4);
        assert_eq!(actor.destination(), Some(TileCoord::new(5, 9)));
    }

    #[test]
    fn acting_on_a_dead_target_is_rejected() {
        let (mut world, hero, elder, _goblin) = populated();
        let talk = world.interaction_options(elder, hero).expect("options")[0].clone();
        world.apply_damage(elder, 30, None).expect("kill");
        assert_eq!(
            world.invoke_option(hero, &talk),
            Err(SimError::ActorDead(elder))
        );
        assert_eq!(world.actor(hero).expect("hero").deferred_action(), None);
    }

    #[test]
    fn talking_to_someone_else_ends_the_current_fight() {
        let (mut world, hero, elder, goblin) = populated();
        world.enter_combat(hero, goblin).expect("enter");
        let talk = world.interaction_options(elder, hero).expect("options")[0].clone();

        world.invoke_option(hero, &talk).expect("talk");

        assert_eq!(world.actor(hero).expect("hero").combat_target(), None);
        assert_eq!(world.actor(goblin).expect("goblin").combat_target(), None);
        assert_eq!(
            world
                .actor(hero)
                .expect("hero")
                .deferred_action()
                .map(|action| action.kind),
            Some(ActionKind::Talk)
        );
    }
}
