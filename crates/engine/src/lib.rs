pub mod config;
pub mod grid;
pub mod sim;

pub use config::{ActorSpec, BehaviorSpec, ConfigError, MapSpec, ScenarioSpec, SimConfig};
pub use grid::{line_steps, TileCoord, Tilemap, TilemapError};
pub use sim::{
    ActionKind, Actor, ActorId, ActorSeed, ActorWorld, BehaviorKind, DeferredAction, EventBus,
    EventCounts, HostileController, Intent, InteractionCommand, InteractionOption,
    PathCancelReason, SimError, SimEvent, Vitals, MELEE_RANGE,
};
