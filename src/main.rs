use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use guildpulse::application::services::{analytics, report, ActivityTracker, AutosaveTask};
use guildpulse::domain::traits::{EventSource, KeyValueStore};
use guildpulse::infrastructure::adapters::ConsoleEventSource;
use guildpulse::infrastructure::config::Config;
use guildpulse::infrastructure::storage::JsonFileStore;

#[derive(Parser)]
#[command(name = "guildpulse")]
#[command(about = "Guild activity tracking and analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "guildpulse.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start ingesting events (console source in dev mode)
    Run,
    /// Print an activity report for a guild
    Report {
        /// Guild id to report on
        guild: String,
        /// Trailing window in days
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_service(cli.config),
        Commands::Report { guild, days } => run_report(cli.config, guild, days),
        Commands::Version => {
            println!("guildpulse v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(cli.config),
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_service(config_path: String) {
    let config = load_config(&config_path);
    tracing::info!("Starting guildpulse (retention: {} days)", config.tracking.retention_days);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let store = Arc::new(JsonFileStore::new(config.storage.path.clone()));
        if let Err(e) = store.init().await {
            tracing::error!("Failed to initialize storage: {}", e);
            return;
        }

        let tracker =
            ActivityTracker::load(config.tracker_settings(), store.as_ref()).await;
        let tracker = Arc::new(RwLock::new(tracker));

        let autosave = AutosaveTask::spawn(
            tracker.clone(),
            store.clone() as Arc<dyn KeyValueStore>,
            Duration::from_secs(config.storage.autosave_seconds),
        );

        let mut source = ConsoleEventSource::new();
        tracing::info!("Reading events from stdin (msg/join/leave), Ctrl-C to stop");

        loop {
            tokio::select! {
                event = source.next_event() => {
                    match event {
                        Some(event) => tracker.write().await.record(event),
                        None => {
                            tracing::info!("Event source closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down");
                    break;
                }
            }
        }

        // Final save happens inside shutdown; nothing saves after this.
        autosave.shutdown().await;
    });
}

fn run_report(config_path: String, guild: String, days: u32) {
    let config = load_config(&config_path);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let store = JsonFileStore::new(config.storage.path.clone());
        if let Err(e) = store.init().await {
            tracing::error!("Failed to open storage: {}", e);
            return;
        }

        let tracker = ActivityTracker::load(config.tracker_settings(), &store).await;
        let log = tracker.guild(&guild);
        if log.is_none() {
            println!("No recorded activity for guild {}", guild);
        }

        let now = chrono::Utc::now();
        let summary = analytics::summarize(log, days, now);
        let trend = analytics::trend(log, days, now);
        let patterns = analytics::patterns(log, days.max(14), now);
        let projection = analytics::project_growth(log, days, now);

        print!("{}", report::render_summary(&guild, &summary));
        print!("{}", report::render_trend(&trend));
        print!("{}", report::render_patterns(&patterns));
        print!("{}", report::render_projection(&projection));
    });
}

fn init_config(config_path: String) {
    if std::path::Path::new(&config_path).exists() {
        tracing::warn!("Config already exists at {}, not overwriting", config_path);
        return;
    }
    match Config::default().save(&config_path) {
        Ok(()) => println!("Wrote default config to {}", config_path),
        Err(e) => tracing::error!("Failed to write config: {}", e),
    }
}
