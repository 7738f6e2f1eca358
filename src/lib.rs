// Library root: exposes all modules so integration tests can `use tintkeep::*`.

pub mod color;
pub mod config;
pub mod driver;
pub mod environment;
pub mod logging;
pub mod notify;
pub mod preferences;
pub mod projector;
pub mod settings;
pub mod store;
pub mod theme;
pub mod wallpaper;
pub mod watcher;
