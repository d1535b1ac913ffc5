mod actions;
mod actor;
mod ai;
mod combat;
mod events;
mod interaction;
mod movement;
mod world;

use thiserror::Error;

use crate::grid::TileCoord;

pub use actor::{
    ActionKind, Actor, ActorId, ActorSeed, BehaviorKind, DeferredAction, HostileController,
    Intent, Vitals,
};
pub use events::{EventBus, EventCounts, PathCancelReason, SimEvent};
pub use interaction::{InteractionCommand, InteractionOption};
pub use world::ActorWorld;

/// Chebyshev distance at which two actors can trade blows.
pub const MELEE_RANGE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),
    #[error("actor {0} is dead")]
    ActorDead(ActorId),
    #[error("tile {tile} is outside the {width}x{height} grid")]
    OutOfBounds {
        tile: TileCoord,
        width: u32,
        height: u32,
    },
    #[error("an actor named '{0}' already exists")]
    DuplicateName(String),
    #[error("actor {0} cannot target itself")]
    SelfTarget(ActorId),
    #[error("protagonist already set to actor {0}")]
    ProtagonistAlreadySet(ActorId),
    #[error("invalid vitals for '{name}': {reason}")]
    InvalidVitals { name: String, reason: &'static str },
}
