//! Persisted light/dark preference.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default preference file, relative to the working directory.
pub const DEFAULT_THEME_FILE: &str = ".clinic-queue-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
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
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("unknown theme: {other}"),
        }
    }
}

/// What a `theme` console command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Show,
    Toggle,
    Set(Theme),
}

impl FromStr for ThemeChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("toggle") {
            return Ok(ThemeChoice::Toggle);
        }
        s.parse().map(ThemeChoice::Set)
    }
}

/// Reads and writes the preference file. Anything other than "dark" in the
/// file means light, matching how the display treats a missing preference.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Theme {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim() == "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn save(&self, theme: Theme) -> anyhow::Result<()> {
        fs::write(&self.path, theme.as_str())
            .with_context(|| format!("failed to save theme to {}", self.path.display()))?;
        tracing::debug!(%theme, path = %self.path.display(), "theme saved");
        Ok(())
    }

    /// Apply a choice and persist the result.
    pub fn apply(&self, choice: ThemeChoice) -> anyhow::Result<Theme> {
        let theme = match choice {
            ThemeChoice::Show => return Ok(self.load()),
            ThemeChoice::Toggle => self.load().toggled(),
            ThemeChoice::Set(theme) => theme,
        };
        self.save(theme)?;
        Ok(theme)
    }
}
