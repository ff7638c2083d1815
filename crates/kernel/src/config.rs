use serde::{Deserialize, Serialize};
use std::path::Path;
use textura_fonts::DEFAULT_FONT_PROVIDER;
use textura_input::DebounceConfig;
use textura_store::FieldDefaults;

/// Errors from loading an engine configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("font provider template has no {{family}} placeholder: {0}")]
    ProviderTemplate(String),
}

/// Engine tuning. Every key is optional in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub debounce: DebounceConfig,
    pub defaults: FieldDefaults,
    /// Stylesheet URL template with a `{family}` placeholder.
    pub font_provider: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            defaults: FieldDefaults::default(),
            font_provider: DEFAULT_FONT_PROVIDER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.font_provider.contains("{family}") {
            return Err(ConfigError::ProviderTemplate(self.font_provider.clone()));
        }
        Ok(())
    }
}
