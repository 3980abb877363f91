// JSON file loader for GuardianConfig.
//
// Any field missing from the file keeps its default, so a file containing
// only `{"max_links": 5}` is valid.

use crate::core::moderation::{GuardianConfig, MAX_TEMP_BAN_HOURS};
use anyhow::Context;
use std::path::Path;

/// Load config from `path`, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<GuardianConfig> {
    let Some(path) = path else {
        return Ok(GuardianConfig::default());
    };

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open guardian config at {}", path.display()))?;
    let config: GuardianConfig = serde_json::from_reader(file)
        .with_context(|| format!("Invalid guardian config at {}", path.display()))?;

    if config.temp_ban_hours <= 0 {
        anyhow::bail!("temp_ban_hours must be positive, got {}", config.temp_ban_hours);
    }
    if config.temp_ban_hours > MAX_TEMP_BAN_HOURS {
        anyhow::bail!(
            "temp_ban_hours must be at most {}, got {}",
            MAX_TEMP_BAN_HOURS,
            config.temp_ban_hours
        );
    }

    tracing::info!(
        path = %path.display(),
        terms = config.denylist.len(),
        max_links = config.max_links,
        "Loaded guardian config"
    );
    Ok(config)
}
