use crate::domain::{DiscoveryConfig, DiscoveryError, DiscoveryResult};
use crate::ports::ConfigProvider;
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Configuration provider holding a fixed `DiscoveryConfig`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: DiscoveryConfig,
}

impl StaticConfigProvider {
    #[must_use]
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn discovery_config(&self) -> DiscoveryConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    discovery: DiscoveryConfig,
}

/// Loads the `[discovery]` table of a TOML file.
///
/// Missing keys fall back to `DiscoveryConfig::default()`. Durations are
/// given in whole seconds.
///
/// # Config File Format
///
/// ```toml
/// [discovery]
/// agent_id = "builder-7"
/// port = 31415
/// auto_port = true
/// announce_interval_secs = 30
/// max_clock_skew_secs = 300
/// seed_peers = ["10.0.0.12:31415"]
///
/// [discovery.metadata]
/// role = "builder"
/// api_port = 8080
/// ```
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: DiscoveryConfig,
}

impl TomlConfigProvider {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> DiscoveryResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            DiscoveryError::Config(format!("failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate config from a TOML string.
    pub fn parse(content: &str) -> DiscoveryResult<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| DiscoveryError::Config(format!("failed to parse config: {e}")))?;
        file.discovery.validate()?;
        Ok(Self {
            config: file.discovery,
        })
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn discovery_config(&self) -> DiscoveryConfig {
        self.config.clone()
    }
}
