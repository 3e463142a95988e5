//! Theme Preference
//!
//! Persists the light/dark flag under the `colorTheme` key and decides
//! which stylesheet is enabled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Parse a stored flag; anything other than "light" is dark
    pub fn from_flag(flag: &str) -> Self {
        if flag == "light" {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// `rel` values for the (light, dark) stylesheet links
    pub fn stylesheet_rels(self) -> (&'static str, &'static str) {
        match self {
            Theme::Light => ("stylesheet", "stylesheet alternate"),
            Theme::Dark => ("stylesheet alternate", "stylesheet"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("Light"),
            Theme::Dark => f.write_str("Dark"),
        }
    }
}

/// On-disk layout of the state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(rename = "colorTheme", skip_serializing_if = "Option::is_none")]
    color_theme: Option<String>,
}

/// Theme flag bound to the file it is persisted in
#[derive(Debug, Clone)]
pub struct ThemePreference {
    path: PathBuf,
    theme: Theme,
}

/// Default location of the state file
pub fn default_state_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("collbrowse").join("state.toml"))
        .unwrap_or_else(|| PathBuf::from("./collbrowse-state.toml"))
}

impl ThemePreference {
    /// Read the preference stored at `path`; a missing file means dark
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ThemeError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                theme: Theme::default(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ThemeError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
        let state: StateFile = toml::from_str(&content).map_err(|e| ThemeError::Parse {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let theme = state
            .color_theme
            .as_deref()
            .map(Theme::from_flag)
            .unwrap_or_default();
        Ok(Self { path, theme })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// File the flag is persisted in
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set and persist the theme
    pub fn set(&mut self, theme: Theme) -> Result<(), ThemeError> {
        self.theme = theme;
        self.save()
    }

    /// Flip and persist the theme, returning the new value
    pub fn toggle(&mut self) -> Result<Theme, ThemeError> {
        self.set(self.theme.toggled())?;
        Ok(self.theme)
    }

    /// Write the flag to the state file
    pub fn save(&self) -> Result<(), ThemeError> {
        let state = StateFile {
            color_theme: Some(self.theme.as_str().to_string()),
        };
        let content =
            toml::to_string(&state).map_err(|e| ThemeError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ThemeError::Io {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
            }
        }

        std::fs::write(&self.path, content).map_err(|e| ThemeError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        tracing::debug!(theme = %self.theme.as_str(), path = ?self.path, "Theme saved");
        Ok(())
    }
}

/// Theme persistence errors
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to access theme file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse theme file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to serialize theme: {0}")]
    Serialize(String),
}
