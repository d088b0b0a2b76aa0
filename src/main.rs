use anyhow::Result;
use codementor::config::API_KEY_VAR;
use codementor::ui::TerminalUI;
use codementor::{ChatClient, ChatHandler, Config};
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env();
    info!("Model: {}", config.model);
    info!("Endpoint: {}", config.endpoint);
    match &config.api_key {
        Some(key) => info!("Using API key {}", key.masked()),
        None => warn!(
            "{} is not set; every reply will be a configuration warning",
            API_KEY_VAR
        ),
    }

    let handler = ChatHandler::new(ChatClient::new(config));
    let mut ui = TerminalUI::new(handler)?;
    ui.run().await?;

    Ok(())
}
