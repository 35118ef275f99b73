//! Configuration loading from file and environment

use chatvoice_core::AppConfig;
use config::{Config, Environment, File};

/// Environment variable naming the config file (without extension is fine)
pub const CONFIG_PATH_VAR: &str = "CHATVOICE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "chatvoice";

/// Load settings, highest priority first:
/// 1. Environment variables (`CHATVOICE_` prefix, `__` between sections)
/// 2. The file named by `CHATVOICE_CONFIG`, else `chatvoice.{toml,yaml,json}`
/// 3. Built-in defaults
pub fn load_config() -> anyhow::Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from(&path)
}

pub fn load_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("CHATVOICE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
