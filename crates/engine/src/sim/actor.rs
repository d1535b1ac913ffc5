use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the actor is doing right now. Exactly one holds at any instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[default]
    Idle,
    Walking,
    Fighting,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    pub level: u32,
    pub max_health: u32,
    pub attack_power: u32,
    pub defense: u32,
    pub attack_interval_seconds: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostileController {
    pub home: TileCoord,
    pub detection_radius: u32,
    pub chasing: bool,
}

impl HostileController {
    pub fn new(home: TileCoord, detection_radius: u32) -> Self {
        Self {
            home,
            detection_radius,
            chasing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorKind {
    Player,
    Friendly { dialogue: Vec<String> },
    Hostile(HostileController),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Talk,
    Examine,
}

impl ActionKind {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Attack => "Attack",
            Self::Talk => "Talk to",
            Self::Examine => "Examine",
        }
    }
}

/// Action queued to run once the actor's current path empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredAction {
    pub kind: ActionKind,
    pub target: Option<ActorId>,
}

/// Everything needed to place a new actor into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSeed {
    pub name: String,
    pub position: TileCoord,
    pub vitals: Vitals,
    pub behavior: BehaviorKind,
    pub move_interval_seconds: Option<f32>,
    pub starting_health: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) behavior: BehaviorKind,
    pub(crate) position: TileCoord,
    pub(crate) vitals: Vitals,
    pub(crate) health: u32,
    pub(crate) intent: Intent,
    pub(crate) alive: bool,
    pub(crate) path: VecDeque<TileCoord>,
    pub(crate) destination: Option<TileCoord>,
    pub(crate) move_interval_seconds: f32,
    pub(crate) move_cooldown_seconds: f32,
    pub(crate) combat_target: Option<ActorId>,
    pub(crate) attack_cooldown_seconds: f32,
    pub(crate) deferred_action: Option<DeferredAction>,
    pub(crate) engaged: bool,
}

impl Actor {
    pub(crate) fn from_seed(id: ActorId, seed: ActorSeed, move_interval_seconds: f32) -> Self {
        let health = seed
            .starting_health
            .unwrap_or(seed.vitals.max_health)
            .min(seed.vitals.max_health);
        let mut actor = Self {
            id,
            name: seed.name,
            behavior: seed.behavior,
            position: seed.position,
            vitals: seed.vitals,
            health,
            intent: Intent::Idle,
            alive: true,
            path: VecDeque::new(),
            destination: None,
            move_interval_seconds,
            move_cooldown_seconds: 0.0,
            combat_target: None,
            attack_cooldown_seconds: 0.0,
            deferred_action: None,
            engaged: false,
        };
        if actor.health == 0 {
            actor.alive = false;
            actor.intent = Intent::Dead;
        }
        actor
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> &BehaviorKind {
        &self.behavior
    }

    pub fn position(&self) -> TileCoord {
        self.position
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn path(&self) -> &VecDeque<TileCoord> {
        &self.path
    }

    /// Tile the current path was issued toward, if the path is still live.
    pub fn destination(&self) -> Option<TileCoord> {
        self.destination
    }

    pub fn move_cooldown_seconds(&self) -> f32 {
        self.move_cooldown_seconds
    }

    pub fn combat_target(&self) -> Option<ActorId> {
        self.combat_target
    }

    pub fn attack_cooldown_seconds(&self) -> f32 {
        self.attack_cooldown_seconds
    }

    pub fn deferred_action(&self) -> Option<DeferredAction> {
        self.deferred_action
    }

    /// Presentation hint: true while in combat or targeted by someone.
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    pub fn is_player(&self) -> bool {
        matches!(self.behavior, BehaviorKind::Player)
    }

    pub fn hostile(&self) -> Option<&HostileController> {
        match &self.behavior {
            BehaviorKind::Hostile(controller) => Some(controller),
            _ => None,
        }
    }

    pub(crate) fn hostile_mut(&mut self) -> Option<&mut HostileController> {
        match &mut self.behavior {
            BehaviorKind::Hostile(controller) => Some(controller),
            _ => None,
        }
    }

    pub fn dialogue(&self) -> &[String] {
        match &self.behavior {
            BehaviorKind::Friendly { dialogue } => dialogue,
            _ => &[],
        }
    }

    pub(crate) fn is_chasing(&self) -> bool {
        self.hostile().is_some_and(|controller| controller.chasing)
    }

    pub(crate) fn set_chasing(&mut self, chasing: bool) {
        if let Some(controller) = self.hostile_mut() {
            controller.chasing = chasing;
        }
    }

    pub(crate) fn clear_path(&mut self) {
        self.path.clear();
        self.destination = None;
    }

    /// Intent for an actor that is not actively swinging at anyone.
    pub(crate) fn settle_intent(&mut self) {
        self.intent = if !self.alive {
            Intent::Dead
        } else if !self.path.is_empty() {
            Intent::Walking
        } else {
            Intent::Idle
        };
    }

    pub(crate) fn tick_cooldowns(&mut self, dt_seconds: f32) {
        self.move_cooldown_seconds = count_down(self.move_cooldown_seconds, dt_seconds);
    }
}

pub(crate) fn count_down(remaining: f32, dt_seconds: f32) -> f32 {
    (remaining - dt_seconds).max(0.0)
}
