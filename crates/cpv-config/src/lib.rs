//! # cpv-config
//!
//! Layered configuration loading for cpview using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CPVIEW_*` prefix, `__` as separator)
//! 2. Project-level `.cpview/config.toml`
//! 3. User-level `~/.config/cpview/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `CPVIEW_SERVER__BASE_URL` -> `server.base_url`,
//! `CPVIEW_REVIEW__UPDATE_LOG_PATH` -> `review.update_log_path`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use cpv_config::CpvConfig;
//!
//! let config = CpvConfig::load_with_dotenv().expect("config");
//! println!("server: {}", config.server.base_url);
//! ```

mod error;
mod review;
mod server;

pub use error::ConfigError;
pub use review::ReviewConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CpvConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

impl CpvConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value is
    /// invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.server.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".cpview/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CPVIEW_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cpview").join("config.toml"))
    }
}
