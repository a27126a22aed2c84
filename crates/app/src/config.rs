use anyhow::Context;

use greengrocer_infra::StoreConfig;
use greengrocer_observability::LogConfig;

/// Everything needed to bootstrap [`AppServices`](crate::AppServices).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub log: LogConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            log: LogConfig::from_env().context("reading LOG_FORMAT")?,
            store: StoreConfig::from_env().context("reading store configuration")?,
        })
    }

    /// In-memory store with default logging; what tests and demos use.
    pub fn in_memory() -> Self {
        Self::default()
    }
}
