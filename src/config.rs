use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const APP_DIR: &str = "flexbot";

/// The two startup credentials. Missing either one is the only
/// process-fatal condition in the system.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub riot_api_key: String,
    pub bot_token: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        let riot_api_key = required_env("RIOT_API_KEY")?;
        let bot_token = required_env("DISCORD_BOT_TOKEN")?;
        Ok(Self {
            riot_api_key,
            bot_token,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    let value = env::var(key).with_context(|| format!("{key} is not set"))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{key} is empty");
    }
    Ok(trimmed.to_string())
}

pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR),
    )
}

pub fn app_config_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".config").join(APP_DIR))
}
