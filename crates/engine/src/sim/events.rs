use serde::Serialize;

use crate::grid::TileCoord;

use super::actor::{ActionKind, ActorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PathCancelReason {
    OutOfBounds { tile: TileCoord },
    Blocked { tile: TileCoord, occupant: ActorId },
}

/// Fire-and-forget notification produced during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    CombatEntered {
        actor: ActorId,
        target: ActorId,
    },
    CombatLeft {
        actor: ActorId,
        former_target: ActorId,
    },
    ActorDamaged {
        attacker: Option<ActorId>,
        target: ActorId,
        amount: u32,
    },
    ActorDied {
        actor: ActorId,
        killer: Option<ActorId>,
    },
    PathCancelled {
        actor: ActorId,
        reason: PathCancelReason,
    },
    DestinationReached {
        actor: ActorId,
        tile: TileCoord,
    },
    ActionExecuted {
        actor: ActorId,
        kind: ActionKind,
        target: Option<ActorId>,
    },
    ActionDropped {
        actor: ActorId,
        kind: ActionKind,
    },
    DialogueOpened {
        speaker: ActorId,
        listener: ActorId,
    },
    Examined {
        actor: ActorId,
        target: ActorId,
    },
    StaleTargetCleared {
        actor: ActorId,
        former_target: ActorId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimEventKind {
    Combat,
    Damage,
    Death,
    Movement,
    Action,
}

impl SimEvent {
    fn kind(self) -> SimEventKind {
        match self {
            Self::CombatEntered { .. }
            | Self::CombatLeft { .. }
            | Self::StaleTargetCleared { .. } => SimEventKind::Combat,
            Self::ActorDamaged { .. } => SimEventKind::Damage,
            Self::ActorDied { .. } => SimEventKind::Death,
            Self::PathCancelled { .. } | Self::DestinationReached { .. } => {
                SimEventKind::Movement
            }
            Self::ActionExecuted { .. }
            | Self::ActionDropped { .. }
            | Self::DialogueOpened { .. }
            | Self::Examined { .. } => SimEventKind::Action,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub total: u32,
    pub combat: u32,
    pub damage: u32,
    pub deaths: u32,
    pub movement: u32,
    pub actions: u32,
}

impl EventCounts {
    fn record(&mut self, kind: SimEventKind) {
        self.total = self.total.saturating_add(1);
        match kind {
            SimEventKind::Combat => self.combat = self.combat.saturating_add(1),
            SimEventKind::Damage => self.damage = self.damage.saturating_add(1),
            SimEventKind::Death => self.deaths = self.deaths.saturating_add(1),
            SimEventKind::Movement => self.movement = self.movement.saturating_add(1),
            SimEventKind::Action => self.actions = self.actions.saturating_add(1),
        }
    }
}

/// Buffers events until the caller drains them. Counts roll over per tick.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<SimEvent>,
    current_tick_counts: EventCounts,
    last_tick_counts: EventCounts,
}

impl EventBus {
    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.current_tick_counts.record(event.kind());
        self.pending.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn finish_tick(&mut self) {
        self.last_tick_counts = std::mem::take(&mut self.current_tick_counts);
    }

    pub fn last_tick_counts(&self) -> EventCounts {
        self.last_tick_counts
    }
}
