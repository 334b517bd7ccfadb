use serde::{Deserialize, Serialize};

/// Application configuration (saved to settings.toml in the config directory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// UI language code ("en" or "pl")
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Output path sent with every download request; the server resolves it
    pub folder: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            folder: "Downloads".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Base URL for every server request
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Parse a user-entered port string; `None` outside 1-65535
pub fn parse_port(input: &str) -> Option<u16> {
    let value: u32 = input.trim().parse().ok()?;
    if (1..=65535).contains(&value) {
        Some(value as u16)
    } else {
        None
    }
}

impl Config {
    /// Load configuration from settings.toml, falling back to defaults when
    /// the file does not exist
    pub fn load() -> anyhow::Result<Self> {
        use anyhow::Context;

        let config_path = crate::util::paths::get_app_config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .context(format!("Failed to read {:?}", config_path))?;
            toml::from_str(&content).context(format!("Failed to parse {:?}", config_path))?
        } else {
            tracing::info!("Config not found, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to settings.toml
    ///
    /// Validates first; an invalid config is rejected before anything touches
    /// the filesystem, leaving the stored settings unchanged.
    pub fn save(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        self.validate()?;

        let config_path = crate::util::paths::get_app_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;

        // Atomic write using temp file + rename
        let temp_path = config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content).context("Failed to write temp config file")?;
        std::fs::rename(&temp_path, &config_path).context("Failed to rename temp config file")?;

        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Save-boundary invariants: non-empty host, port in 1-65535
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("Server host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Server port must be between 1 and 65535");
        }
        Ok(())
    }

    #[cfg(test)]
    fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    #[cfg(test)]
    fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
