use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::ThemeManager;

/// Per-user TUI preferences, written when the theme is cycled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

pub struct ThemeLoader {
    path: PathBuf,
}

impl ThemeLoader {
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn default_path() -> PathBuf {
        stackchat_core::get_config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tui.toml")
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn load(&self) -> Result<ThemePreferences> {
        if !self.path.exists() {
            return Ok(ThemePreferences::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read TUI preferences from {:?}", self.path))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TUI preferences from {:?}", self.path))
    }

    pub fn save_theme_name(&self, theme_name: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let prefs = ThemePreferences {
            theme: Some(theme_name.to_string()),
        };
        let contents =
            toml::to_string_pretty(&prefs).context("Failed to serialize TUI preferences")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write TUI preferences to {:?}", self.path))
    }

    /// Saved preference first, then the configured theme.
    pub fn initialize_theme_manager(&self, configured: &str) -> ThemeManager {
        let mut manager = ThemeManager::new();
        let saved = match self.load() {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        };
        let wanted = saved.as_deref().unwrap_or(configured);

        if !manager.set_theme_by_name(wanted) {
            tracing::warn!(
                "Theme '{}' not found, using default '{}'",
                wanted,
                manager.current_theme().name()
            );
        }

        manager
    }
}

impl Default for ThemeLoader {
    fn default() -> Self {
        Self::new()
    }
}
