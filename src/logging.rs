// File-based logging via tracing. Writes to ~/.local/share/tintkeep/tintkeep.log.

use tracing_appender::rolling;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, LogLevel};

/// Filter directive scoping `level` to this crate's events.
pub fn crate_directive(level: LogLevel) -> anyhow::Result<Directive> {
    Ok(format!("tintkeep={}", level.as_str()).parse()?)
}

pub fn init(config: &Config) -> anyhow::Result<()> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("tintkeep");
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = rolling::never(&data_dir, "tintkeep.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::from_default_env().add_directive(crate_directive(config.log.level)?);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .init();

    // Leak the guard: the file writer has to stay open for the whole run.
    std::mem::forget(guard);
    Ok(())
}
