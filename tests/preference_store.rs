// Preference store: SQLite persistence, defaults, reset, and how reads and
// writes degrade when storage fails.

use tintkeep::preferences::{
    PreferenceSnapshot, Preferences, DEFAULT_PRIMARY_COLOR, KEY_DARK_MODE, KEY_WALLPAPER,
};
use tintkeep::store::{KeyValueStore, MemoryStore, SqliteStore};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn open_temp_store() -> (SqliteStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open_at(&dir.path().join("test.db")).expect("open store");
    (store, dir) // caller keeps _dir alive so the directory isn't deleted mid-test
}

/// Storage that refuses every operation.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage disabled")
    }
    fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage disabled")
    }
    fn remove(&mut self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage disabled")
    }
}

// ── SQLite operations ────────────────────────────────────────────────────────

#[test]
fn test_store_open_creates_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("tintkeep_test.db");
    assert!(!path.exists());
    let _store = SqliteStore::open_at(&path).expect("open store");
    assert!(path.exists());
}

#[test]
fn test_store_set_overwrites() {
    let (mut store, _dir) = open_temp_store();
    store.set("k", "one").unwrap();
    store.set("k", "two").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn test_store_remove_missing_key_is_ok() {
    let (mut store, _dir) = open_temp_store();
    store.remove("never-set").unwrap();
    assert_eq!(store.get("never-set").unwrap(), None);
}

// ── Typed preferences ────────────────────────────────────────────────────────

#[test]
fn test_empty_store_yields_defaults() {
    let (store, _dir) = open_temp_store();
    let prefs = Preferences::new(store);
    assert_eq!(prefs.color(), DEFAULT_PRIMARY_COLOR);
    assert_eq!(prefs.wallpaper(), None);
    assert!(!prefs.dark_mode());
    assert_eq!(prefs.stored_color(), None);
    assert_eq!(prefs.snapshot(), PreferenceSnapshot::default());
}

#[test]
fn test_color_round_trip() {
    let (store, _dir) = open_temp_store();
    let mut prefs = Preferences::new(store);
    for hex in ["#112233", "#ABCDEF", "3880ff", "#000000"] {
        assert!(prefs.save_color(hex));
        assert_eq!(prefs.color(), hex);
    }
}

#[test]
fn test_preferences_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefs.db");
    {
        let mut prefs = Preferences::new(SqliteStore::open_at(&path).unwrap());
        assert!(prefs.save_color("#112233"));
        assert!(prefs.save_wallpaper(Some("data:image/png;base64,AAAA")));
        assert!(prefs.save_dark_mode(true));
    }
    let prefs = Preferences::new(SqliteStore::open_at(&path).unwrap());
    assert_eq!(
        prefs.snapshot(),
        PreferenceSnapshot {
            primary_color: Some("#112233".into()),
            wallpaper: Some("data:image/png;base64,AAAA".into()),
            dark_mode: true,
        }
    );
}

#[test]
fn test_dark_mode_only_exact_true() {
    let (store, _dir) = open_temp_store();
    let mut prefs = Preferences::new(store);
    let cases = [
        ("true", true),
        ("TRUE", false),
        ("1", false),
        ("yes", false),
        ("", false),
        ("false", false),
    ];
    for (raw, expected) in cases {
        prefs.store_mut().set(KEY_DARK_MODE, raw).unwrap();
        assert_eq!(prefs.dark_mode(), expected, "stored {raw:?}");
    }
}

#[test]
fn test_save_dark_mode_writes_string_form() {
    let (store, _dir) = open_temp_store();
    let mut prefs = Preferences::new(store);
    assert!(prefs.save_dark_mode(true));
    assert_eq!(prefs.store().get(KEY_DARK_MODE).unwrap().as_deref(), Some("true"));
    assert!(prefs.save_dark_mode(false));
    assert_eq!(prefs.store().get(KEY_DARK_MODE).unwrap().as_deref(), Some("false"));
}

#[test]
fn test_null_wallpaper_removes_row() {
    let (store, _dir) = open_temp_store();
    let mut prefs = Preferences::new(store);
    prefs.save_wallpaper(Some("data:image/png;base64,AAAA"));
    assert!(prefs.save_wallpaper(None));
    assert_eq!(prefs.store().get(KEY_WALLPAPER).unwrap(), None);

    // An empty string is a value, not a clear.
    assert!(prefs.save_wallpaper(Some("")));
    assert_eq!(prefs.store().get(KEY_WALLPAPER).unwrap().as_deref(), Some(""));
}

#[test]
fn test_clear_forgets_everything() {
    let (store, _dir) = open_temp_store();
    let mut prefs = Preferences::new(store);
    prefs.save_color("#112233");
    prefs.save_dark_mode(true);
    assert!(prefs.clear());
    assert_eq!(prefs.snapshot(), PreferenceSnapshot::default());
}

// ── Storage failures ─────────────────────────────────────────────────────────

#[test]
fn test_broken_store_degrades_to_fallbacks() {
    let mut prefs = Preferences::new(BrokenStore);
    assert_eq!(prefs.color(), DEFAULT_PRIMARY_COLOR);
    assert_eq!(prefs.wallpaper(), None);
    assert!(!prefs.dark_mode());
    assert!(!prefs.save_color("#112233"));
    assert!(!prefs.save_wallpaper(None));
    assert!(!prefs.save_dark_mode(true));
    assert!(!prefs.clear());
}

#[test]
fn test_quota_failure_reports_false_and_keeps_old_value() {
    let mut prefs = Preferences::new(MemoryStore::with_quota(64));
    assert!(prefs.save_color("#112233"));
    let huge = format!("data:image/png;base64,{}", "A".repeat(100));
    assert!(!prefs.save_wallpaper(Some(&huge)));
    assert_eq!(prefs.wallpaper(), None);
    assert_eq!(prefs.color(), "#112233");
}
