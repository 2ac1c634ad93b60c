use anyhow::Result;
use nightcharge::config::Config;
use nightcharge::logging::{get_logger, init_logging};
use nightcharge::web::{self, AppState};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let logger = get_logger("main");
    logger.info(&format!(
        "Nightcharge {} starting up (window {} - {})",
        env!("APP_VERSION"),
        config.schedule.start_time,
        config.schedule.end_time
    ));

    let host = config.web.host.clone();
    let port = config.web.port;
    let state = AppState::from_config(config)?;

    if let Err(e) = web::serve(state, &host, port).await {
        error!("Web server error: {}", e);
        return Err(e);
    }
    Ok(())
}
