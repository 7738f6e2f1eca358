// Entry point: loads config, opens the preference store, and runs one
// settings action or renders the projected theme.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use tintkeep::config::Config;
use tintkeep::driver::{NavigationEvent, ThemeDriver};
use tintkeep::environment::{Document, Element};
use tintkeep::logging;
use tintkeep::notify::Toast;
use tintkeep::settings::SettingsPage;
use tintkeep::store::SqliteStore;
use tintkeep::theme::ThemeManager;
use tintkeep::watcher::PresenceWatcher;

#[derive(Parser)]
#[command(name = "tintkeep", about = "Theme preferences for the notes app")]
struct Cli {
    /// Preference database (default: ~/.local/share/tintkeep/tintkeep.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print stored preferences
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the primary color (#rrggbb)
    SetColor { hex: String },
    /// Use an image file as wallpaper
    SetWallpaper { path: PathBuf },
    /// Go back to the built-in wallpaper
    ClearWallpaper,
    /// Turn dark mode on or off
    DarkMode { state: Switch },
    /// Forget all theme preferences
    Reset,
    /// Print the stylesheet the stored preferences project to
    Css,
    /// Run the navigation driver against a simulated page for a few seconds
    Watch {
        #[arg(long, default_value_t = 3)]
        secs: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

/// A page shell with one wallpaper surface, as the notes page renders it.
fn page(marker: &str) -> Element {
    Element::new("page")
        .child(Element::new("header"))
        .child(Element::new("content").class(marker))
}

fn report(toast: Toast) {
    if toast.is_error() {
        eprintln!("{toast}");
    } else {
        println!("{toast}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring {}: {e}", Config::config_path().display());
        Config::default()
    });
    logging::init(&config)?;

    let store = match &cli.db {
        Some(path) => SqliteStore::open_at(path)?,
        None => SqliteStore::open()?,
    };
    let vars = config.theme.vars();
    let mut theme = ThemeManager::new(store, Document::new(), vars);
    let max_bytes = config.wallpaper.max_bytes;

    match cli.command {
        Command::Show { json } => {
            let snapshot = theme.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let prefs = theme.preferences();
                println!("color:     {}", prefs.color());
                match &snapshot.wallpaper {
                    Some(uri) => println!("wallpaper: custom ({} bytes)", uri.len()),
                    None => println!("wallpaper: default"),
                }
                println!("dark mode: {}", snapshot.dark_mode);
            }
        }
        Command::SetColor { hex } => {
            report(SettingsPage::new(&mut theme, max_bytes).choose_color(&hex))
        }
        Command::SetWallpaper { path } => {
            report(SettingsPage::new(&mut theme, max_bytes).choose_wallpaper_file(&path))
        }
        Command::ClearWallpaper => {
            report(SettingsPage::new(&mut theme, max_bytes).clear_wallpaper())
        }
        Command::DarkMode { state } => {
            let enabled = matches!(state, Switch::On);
            report(SettingsPage::new(&mut theme, max_bytes).toggle_dark_mode(enabled))
        }
        Command::Reset => report(SettingsPage::new(&mut theme, max_bytes).reset()),
        Command::Css => {
            let marker = theme.vars().surface_marker.clone();
            theme.environment_mut().append(None, page(&marker))?;
            theme.refresh();
            print!("{}", theme.environment().to_css());
        }
        Command::Watch { secs } => {
            let marker = theme.vars().surface_marker.clone();
            let mutations = theme.environment_mut().observe();
            theme.environment_mut().append(None, page(&marker))?;
            let shared = theme.into_shared();

            let watcher = PresenceWatcher::spawn(shared.clone(), mutations);
            let mut driver = ThemeDriver::start(shared.clone(), &config.driver);

            // Navigate once per second: tear the page down and build a new one.
            for _ in 0..secs {
                tokio::time::sleep(Duration::from_secs(1)).await;
                {
                    let mut guard = shared.lock().await;
                    let doc = guard.environment_mut();
                    doc.clear_body();
                    doc.append(None, page(&marker))?;
                }
                driver.navigate(NavigationEvent::Forward);
            }

            driver.shutdown();
            watcher.abort();
            let guard = shared.lock().await;
            println!("{} projection passes", driver.projections());
            print!("{}", guard.environment().to_css());
        }
    }

    Ok(())
}
