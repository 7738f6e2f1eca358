// Typed access to the three persisted theme slots. Reads fall back to
// defaults and writes report success as a bool; storage errors are logged
// here and never reach the caller.

use serde::Serialize;

use crate::store::KeyValueStore;

pub const KEY_PRIMARY_COLOR: &str = "theme.primary_color";
pub const KEY_WALLPAPER: &str = "theme.wallpaper";
pub const KEY_DARK_MODE: &str = "theme.dark_mode";

/// Primary color shipped with the stylesheet.
pub const DEFAULT_PRIMARY_COLOR: &str = "#3880ff";

/// What the user has chosen, as currently stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceSnapshot {
    /// `None` means the stylesheet's built-in color applies.
    pub primary_color: Option<String>,
    /// A `data:` URI, or `None` for the built-in wallpaper.
    pub wallpaper: Option<String>,
    pub dark_mode: bool,
}

pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "preference read failed");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: Option<&str>) -> bool {
        let result = match value {
            Some(v) => self.store.set(key, v),
            None => self.store.remove(key),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "preference write failed");
                false
            }
        }
    }

    /// The stored primary color, or the default.
    pub fn color(&self) -> String {
        self.stored_color()
            .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string())
    }

    /// The raw color slot; `None` when nothing was ever saved.
    pub fn stored_color(&self) -> Option<String> {
        self.read(KEY_PRIMARY_COLOR)
    }

    pub fn wallpaper(&self) -> Option<String> {
        self.read(KEY_WALLPAPER)
    }

    /// Only the exact string `"true"` turns dark mode on.
    pub fn dark_mode(&self) -> bool {
        self.read(KEY_DARK_MODE).as_deref() == Some("true")
    }

    pub fn save_color(&mut self, hex: &str) -> bool {
        self.write(KEY_PRIMARY_COLOR, Some(hex))
    }

    /// `None` deletes the entry, which is not the same as saving `""`.
    pub fn save_wallpaper(&mut self, data_uri: Option<&str>) -> bool {
        self.write(KEY_WALLPAPER, data_uri)
    }

    pub fn save_dark_mode(&mut self, enabled: bool) -> bool {
        self.write(KEY_DARK_MODE, Some(if enabled { "true" } else { "false" }))
    }

    /// Forget every theme preference. Attempts all three removals even if
    /// one fails.
    pub fn clear(&mut self) -> bool {
        let color = self.write(KEY_PRIMARY_COLOR, None);
        let wallpaper = self.write(KEY_WALLPAPER, None);
        let dark = self.write(KEY_DARK_MODE, None);
        color && wallpaper && dark
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            primary_color: self.stored_color(),
            wallpaper: self.wallpaper(),
            dark_mode: self.dark_mode(),
        }
    }
}
