use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tmd_parse::RenderOptions;

/// Compiler configuration file schema (`tmdc.json` or any `-c` path).
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    pub render_options: RenderOptions,
}

/// Outcome of [`load_or_create`], reported to the user by the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigSource {
    Read,
    Created,
}

/// Read the configuration at `path`, or write the defaults there if it does not exist.
pub fn load_or_create(path: &Path) -> Result<(CompilerConfig, ConfigSource)> {
    if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: CompilerConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok((config, ConfigSource::Read))
    } else {
        let config = CompilerConfig::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok((config, ConfigSource::Created))
    }
}
