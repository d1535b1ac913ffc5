use tracing::{debug, info, warn};

use super::actor::{count_down, ActorId, Intent};
use super::events::SimEvent;
use super::world::ActorWorld;
use super::{SimError, MELEE_RANGE};

impl ActorWorld {
    /// Makes `attacker` target `target`. Repeating an existing pairing only
    /// re-marks both sides as engaged.
    pub fn enter_combat(&mut self, attacker: ActorId, target: ActorId) -> Result<(), SimError> {
        if attacker == target {
            return Err(SimError::SelfTarget(attacker));
        }
        let attacker_index = self.living_index(attacker)?;
        let target_index = self.living_index(target)?;

        if self.actors[attacker_index].combat_target == Some(target) {
            self.actors[attacker_index].engaged = true;
            self.actors[target_index].engaged = true;
            return Ok(());
        }

        if self.actors[attacker_index].combat_target.is_some() {
            self.leave_combat(attacker);
        }
        self.drop_deferred_action(attacker);

        let actor = &mut self.actors[attacker_index];
        actor.clear_path();
        actor.intent = Intent::Fighting;
        actor.combat_target = Some(target);
        actor.attack_cooldown_seconds = 0.0;
        actor.engaged = true;
        self.actors[target_index].engaged = true;
        debug!(actor = %attacker, target = %target, "combat_entered");
        self.events.emit(SimEvent::CombatEntered {
            actor: attacker,
            target,
        });

        let defender = &self.actors[target_index];
        if defender.combat_target != Some(attacker) && !defender.is_player() {
            self.enter_combat(target, attacker)?;
        }
        Ok(())
    }

    /// Ends the actor's combat relationship, and the mirrored one if the
    /// former target still points back.
    pub fn leave_combat(&mut self, id: ActorId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let Some(former_target) = self.actors[index].combat_target.take() else {
            return;
        };

        let actor = &mut self.actors[index];
        if actor.alive && !actor.is_chasing() {
            actor.settle_intent();
        }
        debug!(actor = %id, former_target = %former_target, "combat_left");
        self.events.emit(SimEvent::CombatLeft {
            actor: id,
            former_target,
        });

        if self
            .actor(former_target)
            .is_some_and(|former| former.combat_target == Some(id))
        {
            self.leave_combat(former_target);
        }
        self.refresh_engaged(id);
        self.refresh_engaged(former_target);
    }

    pub(crate) fn refresh_engaged(&mut self, id: ActorId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let targeted = self
            .actors
            .iter()
            .any(|other| other.alive && other.combat_target == Some(id));
        let actor = &mut self.actors[index];
        actor.engaged = actor.alive && (actor.combat_target.is_some() || targeted);
    }

    pub(crate) fn run_combat_tick(&mut self, id: ActorId, dt_seconds: f32) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let Some(target) = self.actors[index].combat_target else {
            return;
        };
        let Some(target_index) = self
            .index_of(target)
            .filter(|&target_index| self.actors[target_index].alive)
        else {
            debug!(actor = %id, target = %target, "combat_target_invalid");
            self.leave_combat(id);
            return;
        };

        let target_position = self.actors[target_index].position;
        let target_defense = self.actors[target_index].vitals.defense;
        let actor = &mut self.actors[index];
        actor.attack_cooldown_seconds = count_down(actor.attack_cooldown_seconds, dt_seconds);

        if actor.position.chebyshev_distance(target_position) > MELEE_RANGE {
            if actor.intent == Intent::Fighting {
                actor.settle_intent();
            }
            return;
        }

        actor.clear_path();
        actor.intent = Intent::Fighting;
        if actor.attack_cooldown_seconds > 0.0 {
            return;
        }
        actor.attack_cooldown_seconds = actor.vitals.attack_interval_seconds;
        let damage = actor.vitals.attack_power.saturating_sub(target_defense);
        if let Err(err) = self.apply_damage(target, damage, Some(id)) {
            warn!(actor = %id, target = %target, error = %err, "attack_not_applied");
        }
    }

    /// Subtracts `amount` from the target's health, running the death cascade
    /// at zero. Returns the remaining health.
    pub fn apply_damage(
        &mut self,
        target: ActorId,
        amount: u32,
        attacker: Option<ActorId>,
    ) -> Result<u32, SimError> {
        let index = self.living_index(target)?;
        let victim = &mut self.actors[index];
        victim.health = victim.health.saturating_sub(amount);
        let remaining = victim.health;
        debug!(
            attacker = ?attacker,
            target = %target,
            amount,
            remaining,
            "actor_damaged"
        );
        self.events.emit(SimEvent::ActorDamaged {
            attacker,
            target,
            amount,
        });
        if remaining == 0 {
            self.kill(target, attacker);
        }
        Ok(remaining)
    }

    fn kill(&mut self, victim: ActorId, killer: Option<ActorId>) {
        let Some(index) = self.index_of(victim) else {
            return;
        };
        let actor = &mut self.actors[index];
        actor.alive = false;
        actor.health = 0;
        actor.intent = Intent::Dead;
        actor.clear_path();
        actor.deferred_action = None;
        actor.engaged = false;
        actor.set_chasing(false);
        let former_target = actor.combat_target.take();
        info!(actor = %victim, name = %actor.name, killer = ?killer, "actor_died");
        self.events.emit(SimEvent::ActorDied {
            actor: victim,
            killer,
        });

        if let Some(former_target) = former_target {
            self.events.emit(SimEvent::CombatLeft {
                actor: victim,
                former_target,
            });
            if self
                .actor(former_target)
                .is_some_and(|former| former.combat_target == Some(victim))
            {
                self.leave_combat(former_target);
            }
            self.refresh_engaged(former_target);
        }

        let attackers: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|other| other.combat_target == Some(victim))
            .map(|other| other.id)
            .collect();
        for attacker in attackers {
            self.leave_combat(attacker);
        }
    }
}
