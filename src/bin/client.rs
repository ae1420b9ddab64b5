use clap::Parser;

use airoom_client::{config::Config, logger, ui};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    logger::setup_logger("airoom_client", "warn");

    tracing::debug!("Starting client against {}", config.api_url);
    ui::run(config).await;
}
