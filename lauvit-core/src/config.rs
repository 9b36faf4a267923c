//! Runtime configuration read from the environment.

use log::LevelFilter;

use crate::error::{LauvitError, Result};
use crate::logging::parse_level;

pub const DATABASE_URL_ENV: &str = "LAUVIT_DATABASE_URL";
pub const FALLBACK_DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const LOG_LEVEL_ENV: &str = "LAUVIT_LOG";
pub const POOL_SIZE_ENV: &str = "LAUVIT_POOL_SIZE";

pub const DEFAULT_DATABASE_URL: &str = "lauvit.db";
pub const MEMORY_DATABASE_URL: &str = ":memory:";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub log_level: LevelFilter,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
            pool_size: default_pool_size(),
        }
    }
}

fn default_pool_size() -> u32 {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);
    std::cmp::max(threads, 2) as u32
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(url) = get(DATABASE_URL_ENV).or_else(|| get(FALLBACK_DATABASE_URL_ENV)) {
            config.database_url = url;
        }

        if let Some(level) = get(LOG_LEVEL_ENV) {
            config.log_level = parse_level(&level).ok_or_else(|| {
                LauvitError::validation(format!("{LOG_LEVEL_ENV}: unknown log level {level:?}"))
            })?;
        }

        if let Some(size) = get(POOL_SIZE_ENV) {
            config.pool_size = match size.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(LauvitError::validation(format!(
                        "{POOL_SIZE_ENV}: expected a positive integer, got {size:?}"
                    )));
                }
            };
        }

        Ok(config)
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: MEMORY_DATABASE_URL.to_string(),
            pool_size: 1,
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert!(config.pool_size >= 2);
    }

    #[test]
    fn prefers_lauvit_url_over_generic_one() {
        let config = Config::from_lookup(lookup(&[
            (DATABASE_URL_ENV, "/tmp/a.db"),
            (FALLBACK_DATABASE_URL_ENV, "/tmp/b.db"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/a.db");

        let config =
            Config::from_lookup(lookup(&[(FALLBACK_DATABASE_URL_ENV, "/tmp/b.db")])).unwrap();
        assert_eq!(config.database_url, "/tmp/b.db");
    }

    #[test]
    fn parses_level_and_pool_size() {
        let config =
            Config::from_lookup(lookup(&[(LOG_LEVEL_ENV, "debug"), (POOL_SIZE_ENV, "4")])).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(LOG_LEVEL_ENV, "chatty")])),
            Err(LauvitError::Validation(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(POOL_SIZE_ENV, "0")])),
            Err(LauvitError::Validation(_))
        ));
    }
}
