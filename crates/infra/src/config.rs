//! Store configuration, read from the environment once at bootstrap.
//!
//! | variable | default |
//! |----------|---------|
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `RUN_MIGRATIONS` | `true` |

use thiserror::Error;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be set when USE_PERSISTENT_STORES=true")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: '{value}' ({expected})")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let persistent = parse_bool(&lookup, "USE_PERSISTENT_STORES", false)?;
        if !persistent {
            return Ok(Self::in_memory());
        }

        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing {
                var: "DATABASE_URL",
            })?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        expected: "a positive integer",
                    });
                }
            },
        };

        Ok(Self {
            backend: StoreBackend::Postgres(PostgresConfig {
                database_url,
                max_connections,
                run_migrations: parse_bool(&lookup, "RUN_MIGRATIONS", true)?,
            }),
        })
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value: raw,
                expected: "true or false",
            }),
        },
    }
}
