// Ties persisted preferences to the style environment. Every setter saves
// first and projects only once the write succeeded, so the environment
// never shows a theme the store doesn't hold.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::environment::{NodeId, StyleEnvironment};
use crate::preferences::{PreferenceSnapshot, Preferences, DEFAULT_PRIMARY_COLOR};
use crate::projector::{ProjectionReport, ThemeProjector, ThemeVars};
use crate::store::KeyValueStore;

/// A theme shared between the settings page, the navigation driver and the
/// presence watcher.
pub type SharedTheme<S, E> = Arc<Mutex<ThemeManager<S, E>>>;

/// The bits of style state drift detection compares against preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveState {
    pub primary_color: Option<String>,
    pub dark_mode: bool,
}

pub struct ThemeManager<S, E> {
    prefs: Preferences<S>,
    env: E,
    projector: ThemeProjector,
}

impl<S: KeyValueStore, E: StyleEnvironment> ThemeManager<S, E> {
    pub fn new(store: S, env: E, vars: ThemeVars) -> Self {
        Self {
            prefs: Preferences::new(store),
            env,
            projector: ThemeProjector::new(vars),
        }
    }

    pub fn into_shared(self) -> SharedTheme<S, E> {
        Arc::new(Mutex::new(self))
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.prefs
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn vars(&self) -> &ThemeVars {
        self.projector.vars()
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.prefs.snapshot()
    }

    pub fn set_color(&mut self, hex: &str) -> bool {
        if !self.prefs.save_color(hex) {
            return false;
        }
        self.projector.apply_color(&mut self.env, hex);
        true
    }

    /// `None` forgets the custom wallpaper and shows the built-in one.
    pub fn set_wallpaper(&mut self, data_uri: Option<&str>) -> bool {
        if !self.prefs.save_wallpaper(data_uri) {
            return false;
        }
        self.projector.apply_wallpaper(&mut self.env, data_uri);
        true
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> bool {
        if !self.prefs.save_dark_mode(enabled) {
            return false;
        }
        self.projector.apply_dark_mode(&mut self.env, enabled);
        true
    }

    /// Forget every preference and put the stock theme back on screen.
    pub fn reset(&mut self) -> bool {
        let cleared = self.prefs.clear();
        // With nothing stored a plain projection would leave the old color
        // variables in place, so write the stock color explicitly.
        self.projector.apply_color(&mut self.env, DEFAULT_PRIMARY_COLOR);
        self.projector.apply_wallpaper(&mut self.env, None);
        self.projector.apply_dark_mode(&mut self.env, false);
        cleared
    }

    /// Re-project everything from the store.
    pub fn refresh(&mut self) -> ProjectionReport {
        let snapshot = self.prefs.snapshot();
        self.projector.project(&mut self.env, &snapshot)
    }

    pub fn live_state(&self) -> LiveState {
        let vars = self.projector.vars();
        LiveState {
            primary_color: self.env.root_property(&vars.primary),
            dark_mode: self.env.has_root_class(&vars.dark_class),
        }
    }

    /// Themeable surfaces at or below each of `nodes`.
    pub fn surfaces_in(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let marker = &self.projector.vars().surface_marker;
        nodes
            .iter()
            .flat_map(|n| self.env.surfaces_within(*n, marker))
            .collect()
    }

    /// Give each surface the stored wallpaper override. Returns how many
    /// were themed; zero when no wallpaper is stored.
    pub fn reapply_surfaces(&mut self, surfaces: &[NodeId]) -> usize {
        let Some(wallpaper) = self.prefs.wallpaper() else {
            return 0;
        };
        let mut themed = 0;
        for &node in surfaces {
            let report = self.projector.apply_surface(&mut self.env, node, Some(&wallpaper));
            if report.is_clean() {
                themed += 1;
            }
        }
        themed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Document, Element};
    use crate::store::MemoryStore;

    fn manager() -> ThemeManager<MemoryStore, Document> {
        ThemeManager::new(MemoryStore::new(), Document::new(), ThemeVars::default())
    }

    #[test]
    fn set_color_persists_and_projects() {
        let mut theme = manager();
        assert!(theme.set_color("#112233"));
        assert_eq!(theme.preferences().color(), "#112233");
        assert_eq!(theme.live_state().primary_color.as_deref(), Some("#112233"));
        assert_eq!(
            theme.environment().root_property("--ion-color-primary-contrast").as_deref(),
            Some("#ffffff")
        );
    }

    #[test]
    fn failed_save_does_not_project() {
        let mut theme =
            ThemeManager::new(MemoryStore::with_quota(4), Document::new(), ThemeVars::default());
        assert!(!theme.set_dark_mode(true));
        assert!(!theme.live_state().dark_mode);
    }

    #[test]
    fn reset_restores_stock_theme() {
        let mut theme = manager();
        theme.set_color("#112233");
        theme.set_dark_mode(true);
        theme.set_wallpaper(Some("data:image/png;base64,AAAA"));
        assert!(theme.reset());
        assert_eq!(theme.snapshot(), PreferenceSnapshot::default());
        assert_eq!(
            theme.live_state(),
            LiveState { primary_color: Some(DEFAULT_PRIMARY_COLOR.to_string()), dark_mode: false }
        );
        assert_eq!(
            theme.environment().root_property("--wallpaper-image").as_deref(),
            Some("url('assets/wallpaper/default.jpg')")
        );
    }

    #[test]
    fn reapply_surfaces_needs_stored_wallpaper() {
        let mut theme = manager();
        let page = theme
            .environment_mut()
            .append(
                None,
                Element::new("page").child(Element::new("content").class("wallpaper-surface")),
            )
            .unwrap();
        let surfaces = theme.surfaces_in(&[page]);
        assert_eq!(surfaces.len(), 1);
        assert_eq!(theme.reapply_surfaces(&surfaces), 0);

        theme.set_wallpaper(Some("data:image/png;base64,AAAA"));
        assert_eq!(theme.reapply_surfaces(&surfaces), 1);
    }
}
