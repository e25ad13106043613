use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::UserId;
use crate::store::{BudgetStore, HttpStore, SqliteStore};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Backend {
    Http { base_url: String },
    Local { path: PathBuf },
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) user: Option<String>,
    pub(crate) backend: Backend,
    pub(crate) timeout: Duration,
}

impl Config {
    /// Build the configuration from environment variables, then let
    /// `--api`, `--user` and `--db` flags override them. Returns the
    /// remaining (non-flag) arguments.
    pub(crate) fn from_env_and_args(args: &[String]) -> Result<(Self, Vec<String>)> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let mut api = env("TRACKWISE_API_URL");
        let mut user = env("TRACKWISE_USER");
        let mut db = env("TRACKWISE_DB").map(PathBuf::from);
        let timeout_secs = match env("TRACKWISE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("TRACKWISE_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut rest = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--api" | "--user" | "--db" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("{arg} requires a value"))?
                        .clone();
                    match arg.as_str() {
                        "--api" => api = Some(value),
                        "--user" => user = Some(value),
                        _ => db = Some(PathBuf::from(crate::run::cli::shellexpand(&value))),
                    }
                }
                "--local" => api = None,
                _ => rest.push(arg.clone()),
            }
        }

        let backend = match api {
            Some(base_url) => Backend::Http { base_url },
            None => Backend::Local {
                path: match db {
                    Some(path) => path,
                    None => default_db_path()?,
                },
            },
        };

        Ok((
            Self {
                user,
                backend,
                timeout: Duration::from_secs(timeout_secs),
            },
            rest,
        ))
    }

    pub(crate) fn user_id(&self) -> Result<UserId> {
        Ok(UserId::new(self.user.as_deref().unwrap_or_default())?)
    }

    pub(crate) fn open_store(&self) -> Result<Box<dyn BudgetStore>> {
        match &self.backend {
            Backend::Http { base_url } => {
                log::info!("Using budget API at {base_url}");
                Ok(Box::new(HttpStore::new(base_url, self.timeout)?))
            }
            Backend::Local { path } => {
                log::info!("Using local database {}", path.display());
                Ok(Box::new(SqliteStore::open(path)?))
            }
        }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "trackwise", "TrackWise")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("trackwise.db"))
}
