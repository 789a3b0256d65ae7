//! `gstmate onboard` — First-time setup.

use gstmate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🧾 gstmate — First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !config_path.exists() {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created default config: {}", config_path.display());
    } else {
        println!("  Config file exists: {}", config_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Set a summarizer API key:   export GSTMATE_API_KEY=...");
    println!("  2. Pick a store backend in:    {}", config_path.display());
    println!("  3. Start the gateway:          gstmate serve");

    Ok(())
}
