//! `gstmate doctor` — Diagnose configuration health.

use gstmate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 gstmate Doctor — Configuration Diagnostics");
    println!("=============================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ❌ No config file — run `gstmate onboard`");
        issues += 1;
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            if config.has_summarizer_key() || config.summarizer.provider == "ollama" {
                println!("  ✅ Summarizer key configured ({})", config.summarizer.provider);
            } else {
                println!(
                    "  ⚠️  No summarizer API key — set summarizer.api_key or GSTMATE_API_KEY"
                );
                issues += 1;
            }

            match config.store.backend.as_str() {
                "firestore" if config.store.project_id.is_none() => {
                    println!("  ❌ Firestore backend without store.project_id");
                    issues += 1;
                }
                "none" => {
                    println!("  ⚠️  Persistence disabled — history will always be empty");
                }
                backend => {
                    println!("  ✅ Store backend configured ({backend})");
                }
            }
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
