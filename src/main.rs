use log::{error, info};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting oracle relay [model: {}, history limit: {}]",
        config.anthropic_model(),
        config.relay_history_limit
    );

    let system_prompt = match domain::knowledge::load_system_prompt(&config) {
        Ok(prompt) => prompt,
        Err(e) => {
            error!("Failed to load the system prompt: {e:?}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, system_prompt);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
