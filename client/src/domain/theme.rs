//! Colour scheme preference stored under the `app_theme` key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{KeyValueStore, StorageError, StorageKey};

/// Light or dark presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl ThemeMode {
    /// Stored spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other mode.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Colours for this mode.
    pub const fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                primary: "#0a7ea4",
                background: "#fff",
                surface: "#f8f9fa",
                text: "#11181C",
                text_secondary: "#687076",
                border: "#e1e5e9",
                error: "#dc3545",
                success: "#28a745",
            },
            Self::Dark => Palette {
                primary: "#0a7ea4",
                background: "#121212",
                surface: "#1e1e1e",
                text: "#ffffff",
                text_secondary: "#b0b0b0",
                border: "#2d2d2d",
                error: "#ff6b6b",
                success: "#6bcf7f",
            },
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or typed mode is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}`; expected `light` or `dark`")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

/// Hex colours used by a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Accent colour.
    pub primary: &'static str,
    /// Screen background.
    pub background: &'static str,
    /// Card and panel background.
    pub surface: &'static str,
    /// Body text.
    pub text: &'static str,
    /// Secondary text.
    pub text_secondary: &'static str,
    /// Dividers.
    pub border: &'static str,
    /// Error banners.
    pub error: &'static str,
    /// Confirmation toasts.
    pub success: &'static str,
}

/// Reads and writes the theme preference.
pub struct ThemeService<S: ?Sized> {
    storage: Arc<S>,
}

impl<S> ThemeService<S>
where
    S: KeyValueStore + ?Sized,
{
    /// Create a service over `storage`.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Stored mode. Absent, unreadable or unknown values yield light.
    pub async fn load_theme(&self) -> ThemeMode {
        match self.storage.get_item(StorageKey::AppTheme).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|err: UnknownTheme| {
                warn!(error = %err, "ignoring stored theme");
                ThemeMode::default()
            }),
            Ok(None) => ThemeMode::default(),
            Err(error) => {
                warn!(%error, "failed to load theme");
                ThemeMode::default()
            }
        }
    }

    /// Persist `mode`.
    pub async fn set_theme(&self, mode: ThemeMode) -> Result<(), StorageError> {
        self.storage
            .set_item(StorageKey::AppTheme, Some(mode.as_str().to_owned()))
            .await
            .inspect_err(|error| warn!(%error, "failed to save theme"))
    }

    /// Flip the stored mode and return the new one.
    pub async fn toggle_theme(&self) -> Result<ThemeMode, StorageError> {
        let next = self.load_theme().await.toggled();
        self.set_theme(next).await?;
        Ok(next)
    }
}
