// src/theme.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

const DEFAULT_THEME: &str = "default";

/// Color slots applied as the active presentation palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub colors: ThemeColors,
}

/// The fixed theme set. Selection outside this list is a no-op.
pub fn available_themes() -> &'static [Theme] {
    &THEMES
}

static THEMES: [Theme; 5] = [
    Theme {
        name: "default",
        colors: ThemeColors {
            primary: "#3B82F6",
            secondary: "#6366F1",
            accent: "#8B5CF6",
            background: "#F3F4F6",
            card: "#FFFFFF",
            text: "#1F2937",
            border: "#E5E7EB",
            success: "#10B981",
            error: "#EF4444",
            warning: "#F59E0B",
            info: "#3B82F6",
        },
    },
    Theme {
        name: "dark",
        colors: ThemeColors {
            primary: "#60A5FA",
            secondary: "#818CF8",
            accent: "#A78BFA",
            background: "#111827",
            card: "#1F2937",
            text: "#F9FAFB",
            border: "#374151",
            success: "#34D399",
            error: "#F87171",
            warning: "#FBBF24",
            info: "#60A5FA",
        },
    },
    Theme {
        name: "nature",
        colors: ThemeColors {
            primary: "#059669",
            secondary: "#10B981",
            accent: "#34D399",
            background: "#ECFDF5",
            card: "#FFFFFF",
            text: "#064E3B",
            border: "#D1FAE5",
            success: "#059669",
            error: "#DC2626",
            warning: "#D97706",
            info: "#0891B2",
        },
    },
    Theme {
        name: "sunset",
        colors: ThemeColors {
            primary: "#F97316",
            secondary: "#FB923C",
            accent: "#FDBA74",
            background: "#FFF7ED",
            card: "#FFFFFF",
            text: "#7C2D12",
            border: "#FFEDD5",
            success: "#16A34A",
            error: "#DC2626",
            warning: "#D97706",
            info: "#0284C7",
        },
    },
    Theme {
        name: "ocean",
        colors: ThemeColors {
            primary: "#0284C7",
            secondary: "#0EA5E9",
            accent: "#38BDF8",
            background: "#F0F9FF",
            card: "#FFFFFF",
            text: "#0C4A6E",
            border: "#E0F2FE",
            success: "#059669",
            error: "#DC2626",
            warning: "#D97706",
            info: "#0284C7",
        },
    },
];

fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name == name)
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTheme {
    theme: String,
}

/// Persisted theme preference, independent of everything on-chain. The
/// selected name is written to a small JSON file on every change and read
/// back at startup; anything unreadable or unknown falls back to the
/// default theme.
pub struct ThemeStore {
    path: PathBuf,
    current: RwLock<&'static Theme>,
}

impl ThemeStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let current = Self::read_persisted(&path).unwrap_or_else(|| {
            // First run or stale state; start from the default.
            find_theme(DEFAULT_THEME).unwrap_or(&THEMES[0])
        });
        debug!(theme = current.name, "theme loaded");
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    fn read_persisted(path: &Path) -> Option<&'static Theme> {
        let raw = std::fs::read_to_string(path).ok()?;
        let persisted: PersistedTheme = serde_json::from_str(&raw).ok()?;
        find_theme(&persisted.theme)
    }

    pub async fn current(&self) -> &'static Theme {
        *self.current.read().await
    }

    pub fn available(&self) -> &'static [Theme] {
        available_themes()
    }

    /// Select and persist a theme by name. Unknown names leave the current
    /// theme unchanged; a failed write keeps the in-memory selection.
    pub async fn select(&self, name: &str) {
        let Some(theme) = find_theme(name) else {
            debug!(name, "ignoring unknown theme");
            return;
        };

        *self.current.write().await = theme;

        if let Err(e) = self.persist(theme) {
            warn!(error = %e, path = %self.path.display(), "theme persistence failed");
        }
    }

    fn persist(&self, theme: &'static Theme) -> ClientResult<()> {
        let persisted = PersistedTheme {
            theme: theme.name.to_string(),
        };
        let body = serde_json::to_string_pretty(&persisted)
            .map_err(|e| ClientError::PersistError(e.to_string()))?;
        std::fs::write(&self.path, body).map_err(|e| ClientError::PersistError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_without_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::load(dir.path().join("theme.json"));
        assert_eq!(store.current().await.name, "default");
    }

    #[tokio::test]
    async fn test_select_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");

        let store = ThemeStore::load(&path);
        store.select("dark").await;
        assert_eq!(store.current().await.name, "dark");

        // A fresh store picks up the persisted choice.
        let reloaded = ThemeStore::load(&path);
        assert_eq!(reloaded.current().await.name, "dark");
    }

    #[tokio::test]
    async fn test_unknown_name_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::load(dir.path().join("theme.json"));

        store.select("ocean").await;
        store.select("neon").await;
        assert_eq!(store.current().await.name, "ocean");
    }

    #[tokio::test]
    async fn test_garbage_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, "not json").unwrap();

        let store = ThemeStore::load(&path);
        assert_eq!(store.current().await.name, "default");
    }

    #[tokio::test]
    async fn test_unknown_persisted_name_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, r#"{"theme":"neon"}"#).unwrap();

        let store = ThemeStore::load(&path);
        assert_eq!(store.current().await.name, "default");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_in_memory_selection() {
        let dir = tempfile::tempdir().unwrap();
        // A directory path cannot be written as a file.
        let store = ThemeStore::load(dir.path());

        store.select("dark").await;
        assert_eq!(store.current().await.name, "dark");

        let err = store.persist(store.current().await).unwrap_err();
        assert!(matches!(err, ClientError::PersistError(_)));
        assert_eq!(err.category(), "storage");
    }

    #[test]
    fn test_all_palettes_complete() {
        assert_eq!(available_themes().len(), 5);
        let names: Vec<_> = available_themes().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["default", "dark", "nature", "sunset", "ocean"]);
    }
}
