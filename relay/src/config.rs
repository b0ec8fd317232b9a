//! Relay process configuration.
//!
//! Every setting comes from the environment (a `.env` file is loaded first by
//! `main`). Unset or unparseable values fall back to their defaults.

use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Directory of browser assets served at `/`.
    pub static_dir: PathBuf,
    /// Depth of each connection's outbound queue.
    pub client_queue_capacity: usize,
}

impl RelayConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let static_dir = lookup("STATIC_DIR")
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        Self {
            host,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            static_dir,
            client_queue_capacity: parse_or(&lookup, "CLIENT_QUEUE_CAPACITY", DEFAULT_CLIENT_QUEUE_CAPACITY)
                .max(1),
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The static directory, if it exists on disk.
    #[must_use]
    pub fn static_dir_if_present(&self) -> Option<PathBuf> {
        self.static_dir.is_dir().then(|| self.static_dir.clone())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
