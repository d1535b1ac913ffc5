use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::run_spec::{RunSpec, StartupError};

const SCENARIO_ENV_VAR: &str = "ISOWORLD_SCENARIO";
const TICKS_ENV_VAR: &str = "ISOWORLD_TICKS";
const DEFAULT_TICK_COUNT: u64 = 2000;
const BUILT_IN_RUN_JSON: &str = include_str!("../../assets/default_run.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunSource {
    BuiltIn,
    File(PathBuf),
}

impl RunSource {
    pub(crate) fn load(&self) -> Result<RunSpec, StartupError> {
        match self {
            Self::BuiltIn => RunSpec::from_json_str(BUILT_IN_RUN_JSON),
            Self::File(path) => {
                let raw =
                    fs::read_to_string(path).map_err(|source| StartupError::ReadRunFile {
                        path: path.clone(),
                        source,
                    })?;
                RunSpec::from_json_str(&raw)
            }
        }
    }
}

pub(crate) struct AppWiring {
    pub(crate) source: RunSource,
    pub(crate) tick_count: u64,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== isoworld headless startup ===");

    let source = parse_run_source(std::env::var(SCENARIO_ENV_VAR).ok().as_deref());
    let tick_count = parse_tick_count(std::env::var(TICKS_ENV_VAR).ok().as_deref());
    info!(source = ?source, tick_count, "run_configured");

    AppWiring { source, tick_count }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_run_source(raw: Option<&str>) -> RunSource {
    match raw.map(str::trim) {
        Some(path) if !path.is_empty() => RunSource::File(PathBuf::from(path)),
        _ => RunSource::BuiltIn,
    }
}

fn parse_tick_count(raw: Option<&str>) -> u64 {
    match raw {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    value,
                    fallback_ticks = DEFAULT_TICK_COUNT,
                    "invalid_tick_count_using_default"
                );
                DEFAULT_TICK_COUNT
            }
        },
        None => DEFAULT_TICK_COUNT,
    }
}
