use tracing::{debug, info};

use crate::grid::TileCoord;

use super::actor::{ActorId, Intent};
use super::world::ActorWorld;
use super::MELEE_RANGE;

impl ActorWorld {
    /// Per-actor behavior step, run before movement.
    pub(crate) fn run_behavior(&mut self, id: ActorId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let actor = &self.actors[index];
        if actor.hostile().is_some() {
            let protagonist = self.protagonist;
            self.run_hostile_controller(index, protagonist);
        } else if actor.is_player() {
            self.run_protagonist_follow(index);
        }
    }

    /// Chebyshev distance past which a hostile abandons its pursuit.
    pub fn give_up_distance(&self, detection_radius: u32) -> u32 {
        let radius = detection_radius as f32;
        let scaled = (radius * self.config.give_up_radius_multiplier).ceil();
        if scaled.is_finite() && scaled >= radius {
            scaled as u32
        } else {
            detection_radius
        }
    }

    fn run_hostile_controller(&mut self, index: usize, protagonist: Option<ActorId>) {
        let id = self.actors[index].id;
        let Some((home, detection_radius)) = self.actors[index]
            .hostile()
            .map(|controller| (controller.home, controller.detection_radius))
        else {
            return;
        };

        let living_protagonist = protagonist
            .and_then(|protagonist| self.actor(protagonist))
            .filter(|protagonist| protagonist.alive)
            .map(|protagonist| (protagonist.id, protagonist.position));
        let Some((protagonist, target_tile)) = living_protagonist else {
            let actor = &mut self.actors[index];
            let was_chasing = actor.is_chasing();
            if was_chasing {
                actor.set_chasing(false);
                actor.clear_path();
            }
            if was_chasing || (protagonist.is_some() && actor.combat_target == protagonist) {
                self.leave_combat(id);
                self.actors[index].settle_intent();
            }
            self.return_home_if_idle(index, home);
            return;
        };

        let distance = self.actors[index].position.chebyshev_distance(target_tile);

        if self.actors[index].combat_target == Some(protagonist) {
            if distance > self.give_up_distance(detection_radius) {
                info!(actor = %id, distance, "hostile_gave_up_chase");
                let actor = &mut self.actors[index];
                actor.set_chasing(false);
                actor.clear_path();
                self.leave_combat(id);
                if self.actors[index].position != home {
                    self.assign_path(index, home);
                }
            } else if distance <= MELEE_RANGE {
                let actor = &mut self.actors[index];
                actor.clear_path();
                actor.intent = Intent::Fighting;
                actor.set_chasing(false);
            } else {
                self.actors[index].set_chasing(true);
                if self.actors[index].path.back() != Some(&target_tile) {
                    self.assign_path(index, target_tile);
                }
                let actor = &mut self.actors[index];
                actor.intent = if actor.path.is_empty() {
                    Intent::Fighting
                } else {
                    Intent::Walking
                };
            }
            return;
        }

        // Already fighting someone else: the combat tick owns that fight.
        if self.actors[index].combat_target.is_some() {
            return;
        }
        self.actors[index].set_chasing(false);

        if distance <= detection_radius {
            debug!(actor = %id, protagonist = %protagonist, distance, "hostile_aggro");
            if self.enter_combat(id, protagonist).is_ok() && distance > MELEE_RANGE {
                self.actors[index].set_chasing(true);
                self.assign_path(index, target_tile);
            }
            return;
        }

        self.return_home_if_idle(index, home);
    }

    fn return_home_if_idle(&mut self, index: usize, home: TileCoord) {
        let actor = &self.actors[index];
        if actor.intent != Intent::Idle
            || actor.is_chasing()
            || actor.combat_target.is_some()
            || !actor.path.is_empty()
            || actor.position == home
        {
            return;
        }
        debug!(actor = %actor.id, home = %home, "hostile_returning_home");
        self.assign_path(index, home);
    }

    /// Keeps the protagonist closing in on a target that stepped away.
    fn run_protagonist_follow(&mut self, index: usize) {
        let actor = &self.actors[index];
        let Some(target_tile) = actor
            .combat_target
            .and_then(|target| self.actor(target))
            .filter(|target| target.alive)
            .map(|target| target.position)
        else {
            return;
        };
        if actor.position.chebyshev_distance(target_tile) <= MELEE_RANGE
            || actor.path.back() == Some(&target_tile)
        {
            return;
        }
        self.assign_path(index, target_tile);
    }
}
