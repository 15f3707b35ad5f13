use std::sync::Arc;

use tickets::clickup::Api;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub api: Option<Api>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    // None when the ClickUp env vars are absent; handlers answer 500.
    pub fn with_config(config: Config) -> Arc<Self> {
        let api = match (&config.clickup_token, &config.clickup_list_id) {
            (Some(token), Some(list_id)) => {
                Some(Api::new(&config.clickup_base_url, token, list_id))
            }
            _ => None,
        };

        Arc::new(Self { config, api })
    }
}
