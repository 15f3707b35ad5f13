use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub allowed_origin: String,
    pub clickup_base_url: String,
    pub clickup_token: Option<String>,
    pub clickup_list_id: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            allowed_origin: try_load("ALLOWED_ORIGIN", "https://intell-logic.github.io"),
            clickup_base_url: try_load("CLICKUP_BASE_URL", tickets::clickup::BASE_URL),
            clickup_token: optional("CLICKUP_API_TOKEN"),
            clickup_list_id: optional("CLICKUP_LIST_ID"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

// Absence is reported per request with a 500 envelope, never defaulted.
fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!("{key} not set, ClickUp calls will answer 500");
            None
        }
    }
}
