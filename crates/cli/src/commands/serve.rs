//! `gstmate serve` — Start the HTTP API server.

use gstmate_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🧾 gstmate Gateway");
    println!("   Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:      {}", config.store.backend);
    println!("   Summarizer: {}", config.summarizer.provider);

    gstmate_gateway::start(config).await?;

    Ok(())
}
