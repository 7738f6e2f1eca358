// Settings page actions. Each user action ends in a toast; invalid input is
// rejected before anything is saved.

use std::path::Path;

use crate::color::parse_hex_color;
use crate::environment::StyleEnvironment;
use crate::notify::Toast;
use crate::store::KeyValueStore;
use crate::theme::ThemeManager;
use crate::wallpaper;

pub struct SettingsPage<'a, S, E> {
    theme: &'a mut ThemeManager<S, E>,
    max_wallpaper_bytes: u64,
}

impl<'a, S: KeyValueStore, E: StyleEnvironment> SettingsPage<'a, S, E> {
    pub fn new(theme: &'a mut ThemeManager<S, E>, max_wallpaper_bytes: u64) -> Self {
        Self {
            theme,
            max_wallpaper_bytes,
        }
    }

    /// The color picker only yields `#rrggbb`, so anything else is refused
    /// here rather than stored.
    pub fn choose_color(&mut self, hex: &str) -> Toast {
        if parse_hex_color(hex).is_none() {
            return Toast::error(format!("{hex} is not a #rrggbb color"));
        }
        if self.theme.set_color(hex) {
            Toast::success("Theme color updated")
        } else {
            Toast::error("Could not save theme color")
        }
    }

    pub fn choose_wallpaper_file(&mut self, path: &Path) -> Toast {
        let data_uri = match wallpaper::load_data_uri(path, self.max_wallpaper_bytes) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "wallpaper rejected");
                return Toast::error(e.to_string());
            }
        };
        if self.theme.set_wallpaper(Some(&data_uri)) {
            Toast::success("Wallpaper updated")
        } else {
            Toast::error("Could not save wallpaper, the image may be too large for storage")
        }
    }

    pub fn clear_wallpaper(&mut self) -> Toast {
        if self.theme.set_wallpaper(None) {
            Toast::success("Wallpaper reset to default")
        } else {
            Toast::error("Could not reset wallpaper")
        }
    }

    pub fn toggle_dark_mode(&mut self, enabled: bool) -> Toast {
        match (self.theme.set_dark_mode(enabled), enabled) {
            (true, true) => Toast::success("Dark mode on"),
            (true, false) => Toast::success("Dark mode off"),
            (false, _) => Toast::error("Could not save dark mode"),
        }
    }

    pub fn reset(&mut self) -> Toast {
        if self.theme.reset() {
            Toast::success("Theme reset to defaults")
        } else {
            Toast::error("Could not fully reset theme")
        }
    }
}
