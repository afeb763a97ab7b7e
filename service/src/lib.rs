use config::Config;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    system_prompt: Arc<str>,
}

impl AppState {
    pub fn new(app_config: Config, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            config: app_config,
            system_prompt: system_prompt.into(),
        }
    }

    /// The system prompt prepended to every relayed conversation.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}
