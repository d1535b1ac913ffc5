use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{TileCoord, Tilemap, TilemapError};
use crate::sim::{ActorSeed, ActorWorld, BehaviorKind, HostileController, SimError, Vitals};

const DEFAULT_FIXED_DT_SECONDS: f32 = 1.0 / 144.0;
const DEFAULT_MOVE_INTERVAL_SECONDS: f32 = 0.15;
const DEFAULT_GIVE_UP_RADIUS_MULTIPLIER: f32 = 2.0;

/// Tuning constants shared by every actor in a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub fixed_dt_seconds: f32,
    pub default_move_interval_seconds: f32,
    pub give_up_radius_multiplier: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt_seconds: DEFAULT_FIXED_DT_SECONDS,
            default_move_interval_seconds: DEFAULT_MOVE_INTERVAL_SECONDS,
            give_up_radius_multiplier: DEFAULT_GIVE_UP_RADIUS_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum MapSpec {
    Size { width: u32, height: u32 },
    Csv(String),
}

impl MapSpec {
    pub fn build_tilemap(&self) -> Result<Tilemap, TilemapError> {
        match self {
            Self::Size { width, height } => Tilemap::filled(*width, *height, 0),
            Self::Csv(layout) => Tilemap::from_csv_str(layout),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorSpec {
    Player,
    Friendly {
        #[serde(default)]
        dialogue: Vec<String>,
    },
    Hostile {
        detection_radius: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorSpec {
    pub name: String,
    pub position: TileCoord,
    #[serde(default = "default_level")]
    pub level: u32,
    pub max_health: u32,
    #[serde(default)]
    pub current_health: Option<u32>,
    pub attack_power: u32,
    pub defense: u32,
    pub attack_interval_seconds: f32,
    #[serde(default)]
    pub move_interval_seconds: Option<f32>,
    pub behavior: BehaviorSpec,
}

fn default_level() -> u32 {
    1
}

impl ActorSpec {
    pub fn to_seed(&self) -> ActorSeed {
        let behavior = match &self.behavior {
            BehaviorSpec::Player => BehaviorKind::Player,
            BehaviorSpec::Friendly { dialogue } => BehaviorKind::Friendly {
                dialogue: dialogue.clone(),
            },
            BehaviorSpec::Hostile { detection_radius } => {
                BehaviorKind::Hostile(HostileController::new(self.position, *detection_radius))
            }
        };
        ActorSeed {
            name: self.name.clone(),
            position: self.position,
            vitals: Vitals {
                level: self.level,
                max_health: self.max_health,
                attack_power: self.attack_power,
                defense: self.defense,
                attack_interval_seconds: self.attack_interval_seconds,
            },
            behavior,
            move_interval_seconds: self.move_interval_seconds,
            starting_health: self.current_health,
        }
    }
}

/// A complete starting state: tuning, grid and population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub sim: SimConfig,
    pub map: MapSpec,
    pub protagonist: ActorSpec,
    #[serde(default)]
    pub npcs: Vec<ActorSpec>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse scenario json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Validation { path: String, message: String },
    #[error("build tilemap: {0}")]
    Tilemap(#[from] TilemapError),
    #[error("spawn actor: {0}")]
    Spawn(#[from] SimError),
}

impl ScenarioSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let spec: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                path: if path.is_empty() { ".".to_string() } else { path },
                message: error.into_inner().to_string(),
            }
        })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sim_config(&self.sim)?;
        if let MapSpec::Size { width, height } = self.map {
            if width == 0 || height == 0 {
                return Err(expected_actual(
                    "map.size",
                    "non-zero width and height",
                    format!("{width}x{height}"),
                ));
            }
        }

        if self.protagonist.behavior != BehaviorSpec::Player {
            return Err(expected_actual(
                "protagonist.behavior.kind",
                "player",
                behavior_label(&self.protagonist.behavior),
            ));
        }
        validate_actor(&self.protagonist, "protagonist")?;

        let mut names = vec![self.protagonist.name.as_str()];
        for (index, npc) in self.npcs.iter().enumerate() {
            let path = format!("npcs[{index}]");
            if npc.behavior == BehaviorSpec::Player {
                return Err(expected_actual(
                    &format!("{path}.behavior.kind"),
                    "friendly or hostile",
                    "player",
                ));
            }
            validate_actor(npc, &path)?;
            if names.contains(&npc.name.as_str()) {
                return Err(validation_err(
                    &format!("{path}.name"),
                    format!("duplicate actor name '{}'", npc.name),
                ));
            }
            names.push(npc.name.as_str());
        }
        Ok(())
    }

    /// Builds the tilemap and spawns the protagonist followed by every NPC
    /// in declaration order.
    pub fn build_world(&self) -> Result<ActorWorld, ConfigError> {
        self.validate()?;
        let tilemap = self.map.build_tilemap()?;
        let mut world = ActorWorld::new(tilemap, self.sim);
        world.spawn(self.protagonist.to_seed())?;
        for npc in &self.npcs {
            world.spawn(npc.to_seed())?;
        }
        Ok(world)
    }
}

fn validate_sim_config(sim: &SimConfig) -> Result<(), ConfigError> {
    if !(sim.fixed_dt_seconds.is_finite() && sim.fixed_dt_seconds > 0.0) {
        return Err(expected_actual(
            "sim.fixed_dt_seconds",
            "a positive number",
            sim.fixed_dt_seconds,
        ));
    }
    if !(sim.default_move_interval_seconds.is_finite() && sim.default_move_interval_seconds > 0.0)
    {
        return Err(expected_actual(
            "sim.default_move_interval_seconds",
            "a positive number",
            sim.default_move_interval_seconds,
        ));
    }
    if !(sim.give_up_radius_multiplier.is_finite() && sim.give_up_radius_multiplier >= 1.0) {
        return Err(expected_actual(
            "sim.give_up_radius_multiplier",
            "a number >= 1.0",
            sim.give_up_radius_multiplier,
        ));
    }
    Ok(())
}

fn validate_actor(actor: &ActorSpec, path: &str) -> Result<(), ConfigError> {
    if actor.name.trim().is_empty() {
        return Err(validation_err(&format!("{path}.name"), "name must not be empty"));
    }
    if actor.level == 0 {
        return Err(expected_actual(&format!("{path}.level"), ">= 1", actor.level));
    }
    if actor.max_health == 0 {
        return Err(expected_actual(
            &format!("{path}.max_health"),
            ">= 1",
            actor.max_health,
        ));
    }
    if let Some(current) = actor.current_health {
        if current == 0 || current > actor.max_health {
            return Err(expected_actual(
                &format!("{path}.current_health"),
                format!("1..={}", actor.max_health),
                current,
            ));
        }
    }
    if !(actor.attack_interval_seconds.is_finite() && actor.attack_interval_seconds > 0.0) {
        return Err(expected_actual(
            &format!("{path}.attack_interval_seconds"),
            "a positive number",
            actor.attack_interval_seconds,
        ));
    }
    if let Some(interval) = actor.move_interval_seconds {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(expected_actual(
                &format!("{path}.move_interval_seconds"),
                "a positive number",
                interval,
            ));
        }
    }
    Ok(())
}

fn behavior_label(behavior: &BehaviorSpec) -> &'static str {
    match behavior {
        BehaviorSpec::Player => "player",
        BehaviorSpec::Friendly { .. } => "friendly",
        BehaviorSpec::Hostile { .. } => "hostile",
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        path: path.to_string(),
        message: message.into(),
    }
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> ConfigError {
    validation_err(path, format!("expected {expected}, got {actual}"))
}
