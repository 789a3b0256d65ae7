//! `gstmate status` — Show configuration summary.

use gstmate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🧾 gstmate Status");
    println!("================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Store:         {}", config.store.backend);
    if config.store.backend == "sqlite" {
        println!("  Database:      {}", config.store.sqlite_path);
    }
    if let Some(project) = &config.store.project_id {
        println!("  Project:       {project}");
    }
    println!("  Collection:    {}", config.store.collection);
    println!("  Summarizer:    {}", config.summarizer.provider);
    println!("  Model:         {}", config.summarizer.model);
    println!("  Gateway:       {}:{}", config.gateway.host, config.gateway.port);
    println!("  History limit: {}", config.service.history_limit);
    println!(
        "  Service auth:  {}",
        if config.gateway.bearer_tokens.is_empty() {
            "disabled"
        } else {
            "bearer tokens"
        }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `gstmate onboard` first");
    }

    Ok(())
}
