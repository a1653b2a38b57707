use std::{fs, path::Path};

use anyhow::Context;
use shared::config::AppConfig;

/// Loads the app config: compiled defaults, then an optional TOML
/// file (explicit path, or `app.toml` in the working directory), then
/// env overrides for the deployment-sensitive fields.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            toml::from_str::<AppConfig>(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?
        }
        None => match fs::read_to_string("app.toml") {
            Ok(raw) => toml::from_str::<AppConfig>(&raw).context("failed to parse app.toml")?,
            Err(_) => AppConfig::default(),
        },
    };

    if let Ok(v) = std::env::var("APP__AGENT_NAME") {
        config.agent_name = Some(v);
    }
    if let Ok(v) = std::env::var("APP__COMPANY_NAME") {
        config.company_name = v;
    }
    if let Ok(v) = std::env::var("APP__SUPPORTS_CHAT_INPUT") {
        if let Ok(parsed) = v.parse::<bool>() {
            config.supports_chat_input = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__SUPPORTS_VIDEO_INPUT") {
        if let Ok(parsed) = v.parse::<bool>() {
            config.supports_video_input = parsed;
        }
    }
    if let Ok(v) = std::env::var("APP__PRE_CONNECT_BUFFER") {
        if let Ok(parsed) = v.parse::<bool>() {
            config.is_pre_connect_buffer_enabled = parsed;
        }
    }

    Ok(config)
}
