//! collbrowse CLI
//!
//! Command-line viewer for collections served over REST:
//! - List collections
//! - Show one collection
//! - Browse everything, or watch it refresh
//! - Switch the light/dark theme

use anyhow::Context;
use clap::{Parser, Subcommand};
use collbrowse::{
    config::{generate_default_config, Config},
    view, ClientConfig, CollectionStore, RestClient, StoreEvent, StoreSnapshot, Theme,
    ThemePreference,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser)]
#[command(name = "collbrowse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse the collections of an embedded database over REST")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// REST prefix (overrides config)
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh and list collection names
    List,

    /// Fetch and print one collection
    Show {
        /// Collection name
        name: String,
    },

    /// Refresh everything and print the sidebar and a collection
    Browse {
        /// Collection to display instead of the first one
        #[arg(short, long)]
        active: Option<String>,
    },

    /// Refresh periodically and re-render on changes
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "10")]
        interval: u64,
    },

    /// Check that the server answers
    Status,

    /// Show or change the theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Use the light theme
    Light,
    /// Use the dark theme
    Dark,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, Some(path.clone())),
        None => Config::load_default()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(prefix) = &cli.prefix {
        config.server.prefix = prefix.clone();
    }

    collbrowse::logging::init(&config.logging).context("failed to initialize logging")?;
    tracing::debug!(base_url = %config.server.base_url, "collbrowse v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let json = cli.format == "json";

    match cli.command {
        Commands::List => {
            let store = open_store(config.server.client_config())?;
            store.refresh_all().await?;
            let snapshot = store.snapshot().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.names)?);
            } else {
                let theme = load_theme(&config)?.theme();
                print!("{}", view::render_sidebar(&snapshot, theme));
            }
        }

        Commands::Show { name } => {
            let store = open_store(config.server.client_config())?;
            store.fetch_one(&name).await?;
            let snapshot = store.snapshot().await;

            if json {
                if let Some(payload) = snapshot.payload(&name) {
                    println!("{}", payload.to_pretty_json()?);
                }
            } else {
                print!("{}", view::render_panel(&snapshot, Some(&name)));
            }
        }

        Commands::Browse { active } => {
            let store = open_store(config.server.client_config())?;
            let report = store.refresh_all().await?;
            if let Some(name) = active {
                store.set_active(&name).await?;
            }
            let snapshot = store.snapshot().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let theme = load_theme(&config)?.theme();
                render_all(&snapshot, theme);
                for (name, error) in &report.failed {
                    eprintln!("{}: {}", name, error);
                }
            }
        }

        Commands::Watch { interval } => {
            let store = open_store(config.server.client_config())?;
            let theme = load_theme(&config)?.theme();
            watch(&store, theme, Duration::from_secs(interval.max(1))).await;
        }

        Commands::Status => {
            let client = RestClient::new(config.server.client_config())?;
            match client.health_check().await {
                Ok(count) => {
                    println!("collbrowse v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Server: {}", client.list_url());
                    println!("Collections: {}", count);
                }
                Err(e) => {
                    eprintln!("Cannot reach collection server at {}", client.list_url());
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Theme { action } => {
            let mut pref = load_theme(&config)?;
            match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => {}
                ThemeAction::Toggle => {
                    pref.toggle()?;
                }
                ThemeAction::Light => pref.set(Theme::Light)?,
                ThemeAction::Dark => pref.set(Theme::Dark)?,
            }

            let (light, dark) = pref.theme().stylesheet_rels();
            println!("Theme: {}", pref.theme());
            println!("  light.min.css rel=\"{}\"", light);
            println!("  dark.min.css  rel=\"{}\"", dark);
            println!("  stored in {}", pref.path().display());
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn open_store(client_config: ClientConfig) -> anyhow::Result<CollectionStore> {
    let client = RestClient::new(client_config)?;
    Ok(CollectionStore::new(Arc::new(client)))
}

fn load_theme(config: &Config) -> anyhow::Result<ThemePreference> {
    Ok(ThemePreference::load(config.theme.state_path())?)
}

fn render_all(snapshot: &StoreSnapshot, theme: Theme) {
    print!("{}", view::render_sidebar(snapshot, theme));
    println!();
    print!("{}", view::render_panel(snapshot, None));
    if let Some(banner) = view::render_error(snapshot) {
        eprint!("{}", banner);
    }
}

async fn watch(store: &CollectionStore, theme: Theme, interval: Duration) {
    let mut events = store.subscribe();
    let mut ticker = tokio::time::interval(interval);
    let mut rendered_version = 0;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Failures are already recorded in the store and rendered below
                match store.refresh_all_until(shutdown.as_mut()).await {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::debug!(error = %e, "Refresh failed"),
                    None => {
                        tracing::info!("Stopping watch");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        tracing::debug!(?event, "Store changed");
                        if matches!(event, StoreEvent::CollectionLoading { .. }) {
                            continue;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed store events");
                    }
                    Err(RecvError::Closed) => break,
                }

                let snapshot = store.snapshot().await;
                if snapshot.version != rendered_version {
                    rendered_version = snapshot.version;
                    render_all(&snapshot, theme);
                    println!();
                }
            }
            _ = shutdown.as_mut() => {
                tracing::info!("Stopping watch");
                break;
            }
        }
    }
}
