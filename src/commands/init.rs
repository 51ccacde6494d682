use anyhow::{Context, Result};
use corpus_acquire::config::Config;
use std::path::PathBuf;

pub async fn init_config(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;

    let config_path = path.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("Configuration file already exists: {}", config_path.display());
    }

    let toml_content = format!(
        "# corpus-acquire configuration\n\n{}",
        Config::default().to_toml()?
    );

    std::fs::write(&config_path, toml_content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
