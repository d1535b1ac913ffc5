use std::process::ExitCode;

use isoworld::{ActorId, ActorWorld, InteractionCommand, Intent, SimEvent, TileCoord};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::bootstrap::AppWiring;
use super::run_spec::{ScriptCommand, ScriptStep, StartupError};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_headless(&app) {
        Ok(summary) => {
            match serde_json::to_string(&summary) {
                Ok(json) => info!(summary = %json, "run_finished"),
                Err(err) => warn!(error = %err, "run_summary_not_serializable"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_headless(app: &AppWiring) -> Result<RunSummary, StartupError> {
    let spec = app.source.load()?;
    let mut world = spec.scenario.build_world()?;
    Ok(drive(&mut world, &spec.script, app.tick_count))
}

/// Replays `script` against the world for `tick_count` fixed steps.
pub(crate) fn drive(world: &mut ActorWorld, script: &[ScriptStep], tick_count: u64) -> RunSummary {
    let dt_seconds = world.config().fixed_dt_seconds;
    let mut pending = script.iter().peekable();

    for tick in 0..tick_count {
        while let Some(step) = pending.next_if(|step| step.at_tick <= tick) {
            apply_script_command(world, tick, &step.command);
        }
        world.tick(dt_seconds);
        for event in world.drain_events() {
            log_event(world, &event);
        }
    }

    RunSummary::capture(world)
}

fn apply_script_command(world: &mut ActorWorld, tick: u64, command: &ScriptCommand) {
    let Some(protagonist) = world.protagonist() else {
        warn!(tick, "script_without_protagonist");
        return;
    };

    let option = match command {
        ScriptCommand::WalkTo { x, y } => world.walk_here_option(TileCoord::new(*x, *y)),
        ScriptCommand::Interact { target, action } => {
            let Some(target_id) = world.actor_by_name(target).map(|actor| actor.id()) else {
                warn!(tick, target = %target, "script_target_unknown");
                return;
            };
            let options = match world.interaction_options(target_id, protagonist) {
                Ok(options) => options,
                Err(err) => {
                    warn!(tick, target = %target, error = %err, "script_options_unavailable");
                    return;
                }
            };
            let Some(option) = options.into_iter().find(|option| {
                matches!(option.command, InteractionCommand::Act { kind, .. } if kind == *action)
            }) else {
                warn!(tick, target = %target, action = ?action, "script_option_not_offered");
                return;
            };
            option
        }
    };

    info!(tick, option = %option.label, "script_option_invoked");
    if let Err(err) = world.invoke_option(protagonist, &option) {
        warn!(tick, option = %option.label, error = %err, "script_option_rejected");
    }
}

fn log_event(world: &ActorWorld, event: &SimEvent) {
    let name = |id: ActorId| {
        world
            .actor(id)
            .map(|actor| actor.name().to_string())
            .unwrap_or_else(|| id.to_string())
    };

    match *event {
        SimEvent::ActorDamaged {
            attacker,
            target,
            amount,
        } => info!(
            attacker = %attacker.map(name).unwrap_or_default(),
            target = %name(target),
            amount,
            "damage_splat"
        ),
        SimEvent::ActorDied { actor, killer } => info!(
            actor = %name(actor),
            killer = %killer.map(name).unwrap_or_default(),
            "actor_died"
        ),
        SimEvent::DialogueOpened { speaker, listener } => {
            let lines = world
                .actor(speaker)
                .map(|actor| actor.dialogue().join(" / "))
                .unwrap_or_default();
            info!(speaker = %name(speaker), listener = %name(listener), lines = %lines, "dialogue");
        }
        SimEvent::Examined { actor, target } => info!(
            actor = %name(actor),
            text = %world.describe(target).unwrap_or_default(),
            "examine"
        ),
        other => match serde_json::to_string(&other) {
            Ok(json) => debug!(event = %json, "sim_event"),
            Err(err) => warn!(error = %err, "sim_event_not_serializable"),
        },
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) elapsed_seconds: f64,
    pub(crate) actors: Vec<ActorSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActorSummary {
    pub(crate) name: String,
    pub(crate) tile: TileCoord,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) alive: bool,
    pub(crate) intent: Intent,
}

impl RunSummary {
    fn capture(world: &ActorWorld) -> Self {
        Self {
            ticks: world.tick_count(),
            elapsed_seconds: world.elapsed_seconds(),
            actors: world
                .actors()
                .map(|actor| ActorSummary {
                    name: actor.name().to_string(),
                    tile: actor.position(),
                    health: actor.health(),
                    max_health: actor.vitals().max_health,
                    alive: actor.is_alive(),
                    intent: actor.intent(),
                })
                .collect(),
        }
    }
}
