// Decides when projection runs: once on every navigation plus a short burst
// of retries (page rendering can clobber style state right after the first
// pass), and a periodic drift check as a backstop. All work is detached
// from the caller; a newer navigation supersedes any burst still pending.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::DriverConfig;
use crate::environment::StyleEnvironment;
use crate::preferences::PreferenceSnapshot;
use crate::store::KeyValueStore;
use crate::theme::{LiveState, SharedTheme};

/// Lifecycle and navigation triggers that re-run projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    AppStart,
    /// In-app forward navigation.
    Forward,
    /// Back/forward through history.
    HistoryPop,
    HashChange,
    PushState,
    ReplaceState,
}

/// True when live style state no longer reflects `expected`.
///
/// The color only counts when one is stored; without one the stylesheet's
/// built-in default owns the variable.
pub fn detect_drift(live: &LiveState, expected: &PreferenceSnapshot) -> bool {
    let color_drift = expected
        .primary_color
        .as_deref()
        .is_some_and(|c| live.primary_color.as_deref() != Some(c));
    color_drift || live.dark_mode != expected.dark_mode
}

pub struct ThemeDriver<S, E> {
    theme: SharedTheme<S, E>,
    retry_delays: Vec<Duration>,
    drift_interval: Duration,
    burst: Option<JoinHandle<()>>,
    drift: Option<JoinHandle<()>>,
    projections: Arc<AtomicUsize>,
}

impl<S, E> ThemeDriver<S, E>
where
    S: KeyValueStore + Send + 'static,
    E: StyleEnvironment + Send + 'static,
{
    pub fn new(theme: SharedTheme<S, E>, config: &DriverConfig) -> Self {
        Self {
            theme,
            retry_delays: config.retry_delays(),
            drift_interval: config.drift_interval(),
            burst: None,
            drift: None,
            projections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Project for app start and begin drift checks.
    pub fn start(theme: SharedTheme<S, E>, config: &DriverConfig) -> Self {
        let mut driver = Self::new(theme, config);
        driver.navigate(NavigationEvent::AppStart);
        driver.start_drift_check();
        driver
    }

    /// Number of projection passes run so far (bursts and drift repairs).
    pub fn projections(&self) -> usize {
        self.projections.load(Ordering::Relaxed)
    }

    /// Project now, then again after each retry delay. Delays are measured
    /// from the trigger, not from the previous retry. Each pass re-reads
    /// the store, so a retry never re-applies a superseded preference.
    pub fn navigate(&mut self, event: NavigationEvent) {
        if let Some(previous) = self.burst.take() {
            previous.abort();
        }
        tracing::debug!(?event, "navigation, scheduling theme projection");

        let theme = self.theme.clone();
        let delays = self.retry_delays.clone();
        let counter = self.projections.clone();
        self.burst = Some(tokio::spawn(async move {
            let triggered = Instant::now();
            project(&theme, &counter).await;
            for delay in delays {
                tokio::time::sleep_until(triggered + delay).await;
                project(&theme, &counter).await;
            }
        }));
    }

    /// Start the periodic drift check. Calling it again is a no-op.
    pub fn start_drift_check(&mut self) {
        if self.drift.is_some() {
            return;
        }
        let theme = self.theme.clone();
        let period = self.drift_interval;
        let counter = self.projections.clone();
        self.drift = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let mut guard = theme.lock().await;
                let expected = guard.snapshot();
                if detect_drift(&guard.live_state(), &expected) {
                    tracing::info!("live theme drifted from stored preferences, re-projecting");
                    guard.refresh();
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    /// Whether a retry burst is still pending.
    pub fn burst_pending(&self) -> bool {
        self.burst.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the pending burst and the drift check.
    pub fn shutdown(&mut self) {
        if let Some(burst) = self.burst.take() {
            burst.abort();
        }
        if let Some(drift) = self.drift.take() {
            drift.abort();
        }
    }
}

impl<S, E> Drop for ThemeDriver<S, E> {
    fn drop(&mut self) {
        for handle in [self.burst.take(), self.drift.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

async fn project<S, E>(theme: &SharedTheme<S, E>, counter: &AtomicUsize)
where
    S: KeyValueStore,
    E: StyleEnvironment,
{
    theme.lock().await.refresh();
    counter.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(color: Option<&str>, dark: bool) -> PreferenceSnapshot {
        PreferenceSnapshot {
            primary_color: color.map(str::to_string),
            wallpaper: None,
            dark_mode: dark,
        }
    }

    fn live(color: Option<&str>, dark: bool) -> LiveState {
        LiveState {
            primary_color: color.map(str::to_string),
            dark_mode: dark,
        }
    }

    #[test]
    fn no_drift_when_in_sync() {
        assert!(!detect_drift(&live(Some("#112233"), true), &snapshot(Some("#112233"), true)));
    }

    #[test]
    fn color_mismatch_is_drift() {
        assert!(detect_drift(&live(Some("#3880ff"), false), &snapshot(Some("#112233"), false)));
        assert!(detect_drift(&live(None, false), &snapshot(Some("#112233"), false)));
    }

    #[test]
    fn unstored_color_never_drifts() {
        assert!(!detect_drift(&live(Some("#abcdef"), false), &snapshot(None, false)));
        assert!(!detect_drift(&live(None, false), &snapshot(None, false)));
    }

    #[test]
    fn dark_mode_mismatch_is_drift() {
        assert!(detect_drift(&live(None, true), &snapshot(None, false)));
        assert!(detect_drift(&live(None, false), &snapshot(None, true)));
    }
}
