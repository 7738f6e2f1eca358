// Writes preference state onto a style environment: primary color and its
// derived palette, the wallpaper reference (root default plus per-surface
// overrides), and the dark-mode class.

use crate::color::Palette;
use crate::environment::{NodeId, StyleEnvironment};
use crate::preferences::PreferenceSnapshot;

/// Names shared with the stylesheet. Changing any of these breaks the CSS
/// that consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVars {
    pub primary: String,
    pub primary_rgb: String,
    pub contrast: String,
    pub contrast_rgb: String,
    pub shade: String,
    pub shade_rgb: String,
    pub tint: String,
    pub tint_rgb: String,
    pub wallpaper: String,
    /// Root class that switches the stylesheet into dark mode.
    pub dark_class: String,
    /// Class marking containers that show the wallpaper.
    pub surface_marker: String,
    /// Image reference used when no wallpaper is stored.
    pub default_wallpaper: String,
}

impl Default for ThemeVars {
    fn default() -> Self {
        Self {
            primary: "--ion-color-primary".into(),
            primary_rgb: "--ion-color-primary-rgb".into(),
            contrast: "--ion-color-primary-contrast".into(),
            contrast_rgb: "--ion-color-primary-contrast-rgb".into(),
            shade: "--ion-color-primary-shade".into(),
            shade_rgb: "--ion-color-primary-shade-rgb".into(),
            tint: "--ion-color-primary-tint".into(),
            tint_rgb: "--ion-color-primary-tint-rgb".into(),
            wallpaper: "--wallpaper-image".into(),
            dark_class: "dark".into(),
            surface_marker: "wallpaper-surface".into(),
            default_wallpaper: "url('assets/wallpaper/default.jpg')".into(),
        }
    }
}

/// Tally of one projection pass. Failed writes are logged and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    pub attempted: usize,
    pub failed: usize,
}

impl ProjectionReport {
    fn record(&mut self, what: &str, result: anyhow::Result<()>) {
        self.attempted += 1;
        if let Err(e) = result {
            self.failed += 1;
            tracing::warn!(target_var = what, error = %e, "style write failed");
        }
    }

    fn merge(&mut self, other: ProjectionReport) {
        self.attempted += other.attempted;
        self.failed += other.failed;
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Wraps a data URI as a CSS image reference.
pub fn image_reference(data_uri: &str) -> String {
    format!("url('{data_uri}')")
}

#[derive(Debug, Clone, Default)]
pub struct ThemeProjector {
    vars: ThemeVars,
}

impl ThemeProjector {
    pub fn new(vars: ThemeVars) -> Self {
        Self { vars }
    }

    pub fn vars(&self) -> &ThemeVars {
        &self.vars
    }

    /// Write the primary color verbatim, then its derived palette if it
    /// parses. An unparsable color leaves the derived variables as they were.
    pub fn apply_color<E: StyleEnvironment>(&self, env: &mut E, hex: &str) -> ProjectionReport {
        let v = &self.vars;
        let mut report = ProjectionReport::default();
        report.record(&v.primary, env.set_root_property(&v.primary, hex));

        let Some(palette) = Palette::derive(hex) else {
            tracing::debug!(hex, "primary color not 6-digit hex, skipping derived palette");
            return report;
        };
        for (name, value) in [
            (&v.primary_rgb, &palette.rgb),
            (&v.contrast, &palette.contrast),
            (&v.contrast_rgb, &palette.contrast_rgb),
            (&v.shade, &palette.shade),
            (&v.shade_rgb, &palette.shade_rgb),
            (&v.tint, &palette.tint),
            (&v.tint_rgb, &palette.tint_rgb),
        ] {
            report.record(name, env.set_root_property(name, value));
        }
        report
    }

    /// Set the root wallpaper variable and sync every surface present now.
    pub fn apply_wallpaper<E: StyleEnvironment>(
        &self,
        env: &mut E,
        data_uri: Option<&str>,
    ) -> ProjectionReport {
        let v = &self.vars;
        let mut report = ProjectionReport::default();
        let root_value = data_uri
            .map(image_reference)
            .unwrap_or_else(|| v.default_wallpaper.clone());
        report.record(&v.wallpaper, env.set_root_property(&v.wallpaper, &root_value));

        for node in env.surfaces(&v.surface_marker) {
            report.merge(self.apply_surface(env, node, data_uri));
        }
        report
    }

    /// Override the wallpaper on one surface, or drop its override so the
    /// root default shows through.
    pub fn apply_surface<E: StyleEnvironment>(
        &self,
        env: &mut E,
        node: NodeId,
        data_uri: Option<&str>,
    ) -> ProjectionReport {
        let name = &self.vars.wallpaper;
        let mut report = ProjectionReport::default();
        let result = match data_uri {
            Some(uri) => env.set_element_property(node, name, &image_reference(uri)),
            None => env.remove_element_property(node, name),
        };
        report.record(name, result);
        report
    }

    pub fn apply_dark_mode<E: StyleEnvironment>(
        &self,
        env: &mut E,
        enabled: bool,
    ) -> ProjectionReport {
        let class = &self.vars.dark_class;
        let mut report = ProjectionReport::default();
        report.record(class, env.set_root_class(class, enabled));
        report
    }

    /// Full pass. Color variables are only touched when a color is stored;
    /// otherwise the stylesheet's own default stays in charge.
    pub fn project<E: StyleEnvironment>(
        &self,
        env: &mut E,
        snapshot: &PreferenceSnapshot,
    ) -> ProjectionReport {
        let mut report = ProjectionReport::default();
        if let Some(hex) = &snapshot.primary_color {
            report.merge(self.apply_color(env, hex));
        }
        report.merge(self.apply_wallpaper(env, snapshot.wallpaper.as_deref()));
        report.merge(self.apply_dark_mode(env, snapshot.dark_mode));
        tracing::debug!(attempted = report.attempted, failed = report.failed, "projected theme");
        report
    }
}
