use std::io;
use std::path::PathBuf;

use isoworld::{ActionKind, ConfigError, ScenarioSpec};
use serde::Deserialize;
use thiserror::Error;

/// Scenario plus the scripted protagonist commands to replay against it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RunSpec {
    pub(crate) scenario: ScenarioSpec,
    #[serde(default)]
    pub(crate) script: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptStep {
    pub(crate) at_tick: u64,
    pub(crate) command: ScriptCommand,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ScriptCommand {
    WalkTo { x: i32, y: i32 },
    Interact { target: String, action: ActionKind },
}

#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error("failed to read run file {path}: {source}")]
    ReadRunFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse run json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Script { path: String, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunSpec {
    pub(crate) fn from_json_str(raw: &str) -> Result<Self, StartupError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let mut spec: Self =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let path = error.path().to_string();
                StartupError::Parse {
                    path: if path.is_empty() { ".".to_string() } else { path },
                    message: error.into_inner().to_string(),
                }
            })?;
        spec.scenario.validate()?;
        spec.validate_script()?;
        spec.script.sort_by_key(|step| step.at_tick);
        Ok(spec)
    }

    fn validate_script(&self) -> Result<(), StartupError> {
        let known = |name: &str| {
            self.scenario.protagonist.name == name
                || self.scenario.npcs.iter().any(|npc| npc.name == name)
        };
        for (index, step) in self.script.iter().enumerate() {
            if let ScriptCommand::Interact { target, .. } = &step.command {
                if !known(target) {
                    return Err(StartupError::Script {
                        path: format!("script[{index}].command.target"),
                        message: format!("expected a scenario actor name, got '{target}'"),
                    });
                }
            }
        }
        Ok(())
    }
}
