use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/chat";
pub const ENDPOINT_ENV: &str = "ACCESS_ASSISTANT_ENDPOINT";

/// A header dropdown: its trigger label and the entries it reveals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DropdownConfig {
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub endpoint: Option<String>,
    pub placeholder: Option<String>,
    pub dropdowns: Option<Vec<DropdownConfig>>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user's config, writing a default file on first run.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::get_config_path()?)
    }

    pub fn load_or_create_at(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        let config = Self::new();
        config.save_to(config_path)?;
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Chat endpoint: environment first, then the config file, then the default.
    pub fn endpoint(&self) -> String {
        self.endpoint_with_env(std::env::var(ENDPOINT_ENV).ok())
    }

    fn endpoint_with_env(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn dropdowns(&self) -> Vec<DropdownConfig> {
        self.dropdowns.clone().unwrap_or_else(default_dropdowns)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("access-assistant").join("config.json"))
    }
}

fn default_dropdowns() -> Vec<DropdownConfig> {
    vec![
        DropdownConfig {
            label: "Access".to_string(),
            items: vec![
                "Request repository access".to_string(),
                "myAccess groups".to_string(),
                "Check request status".to_string(),
            ],
        },
        DropdownConfig {
            label: "Resources".to_string(),
            items: vec![
                "Informatica repositories".to_string(),
                "Onboarding guide".to_string(),
            ],
        },
        DropdownConfig {
            label: "Help".to_string(),
            items: vec![
                "Enter: send message".to_string(),
                "Shift+Enter: new line".to_string(),
                "Ctrl+N: menu".to_string(),
            ],
        },
    ]
}
