use std::path::PathBuf;

use crate::error::ConfigError;
use crate::geo::{Coordinates, Gazetteer};
use crate::loader::JobSource;

pub const DEFAULT_SOURCE: &str = "jobs.json";
pub const DEFAULT_PLACEHOLDER: &str = "/undraw_interview_re_e5jn.svg";

#[derive(Debug, Clone)]
pub struct Config {
    pub source: JobSource,
    pub gazetteer: Option<PathBuf>,
    pub position: Option<Coordinates>,
    pub placeholder: String,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub gazetteer: Option<PathBuf>,
    pub position: Option<String>,
}

/// Load configuration from `.env`, the process environment and CLI overrides.
pub fn load(overrides: Overrides) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    build(overrides, |key| std::env::var(key), default_gazetteer_path())
}

fn build<F>(
    overrides: Overrides,
    lookup: F,
    default_gazetteer: Option<PathBuf>,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let env = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

    let source = overrides
        .source
        .or_else(|| env("JOBBOARD_SOURCE"))
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let gazetteer = overrides
        .gazetteer
        .or_else(|| env("JOBBOARD_GAZETTEER").map(PathBuf::from))
        .or(default_gazetteer);

    let position = match overrides.position {
        Some(raw) => Some(parse_position("--position", &raw)?),
        None => match env("JOBBOARD_POSITION") {
            Some(raw) => Some(parse_position("JOBBOARD_POSITION", &raw)?),
            None => None,
        },
    };

    let placeholder = env("JOBBOARD_PLACEHOLDER").unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());
    let log_file = env("JOBBOARD_LOG").map(PathBuf::from);

    Ok(Config {
        source: JobSource::parse(&source),
        gazetteer,
        position,
        placeholder,
        log_file,
    })
}

fn parse_position(var: &str, raw: &str) -> Result<Coordinates, ConfigError> {
    Coordinates::parse(raw).map_err(|reason| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    })
}

fn default_gazetteer_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "jobboard")?;
    let path = dirs.config_dir().join("locations.json");
    path.exists().then_some(path)
}

impl Config {
    /// Built-in places, extended by the configured gazetteer file if any.
    pub fn gazetteer(&self) -> Result<Gazetteer, ConfigError> {
        let gazetteer = match &self.gazetteer {
            Some(path) => Gazetteer::builtin().with_file(path)?,
            None => Gazetteer::builtin(),
        };
        tracing::debug!(places = gazetteer.len(), "gazetteer ready");
        Ok(gazetteer)
    }
}
