//! Upkeep session daemon
//!
//! Runs the economy session against a sled-backed save store: ticks the
//! phase timer and decay schedule on a fixed cadence, prints balance and
//! mark events as they happen, and serves the management API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use owo_colors::OwoColorize;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time;
use upkeep_api::ApiState;
use upkeep_core::{
    EconomyConfig, EconomySession, NamedToggle, PhaseConfig, SessionConfig, ToggleHandle,
    ToggleSequence,
};
use upkeep_storage::SledStore;

/// Tick cadence for the session clock.
const TICK_INTERVAL_MS: u64 = 250;

#[derive(Parser)]
#[command(name = "upkeepd")]
#[command(about = "Upkeep session daemon")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show version
    #[arg(short, long)]
    version: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    economy: EconomyConfig,
    timer: PhaseConfig,
    toggles: TogglesConfig,
    storage: StorageConfig,
    api: ApiConfig,
    rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TogglesConfig {
    /// Named objects flipped by phase marks, in flip order.
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StorageConfig {
    data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "$HOME/.upkeep/save".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ApiConfig {
    enabled: bool,
    bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1:24180".to_string(),
        }
    }
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

fn expand_path(path: &str) -> String {
    path.replace("$HOME", &std::env::var("HOME").unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("upkeepd 0.1.0");
        return Ok(());
    }

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(expand_path("$HOME/.upkeep/config.toml")));

    println!("{}", "Upkeep Session Daemon v0.1.0".cyan().bold());
    println!("Config file: {:?}\n", config_path);

    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: Could not load config: {}", e);
            Config::default()
        }
    };

    let data_dir = expand_path(&config.storage.data_dir);
    let store = match SledStore::open(&data_dir) {
        Ok(store) => {
            println!("✅ Save store opened at {}", data_dir);
            Arc::new(store)
        }
        Err(e) => {
            eprintln!("❌ Failed to open save store: {}", e);
            return Err(e.into());
        }
    };

    let handles: Vec<Box<dyn ToggleHandle>> = config
        .toggles
        .names
        .iter()
        .map(|name| Box::new(NamedToggle::new(name.clone(), false)) as Box<dyn ToggleHandle>)
        .collect();
    if handles.is_empty() {
        println!("⚠  No toggles configured; phase marks will only move the ledger");
    } else {
        println!("✅ {} toggle handle(s) registered", handles.len());
    }
    let toggles = ToggleSequence::new(handles);

    let session_config = SessionConfig {
        economy: config.economy,
        timer: config.timer,
        rng_seed: config.rng_seed,
    };

    let mut session = match EconomySession::start(session_config, toggles, store) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Failed to start session: {}", e);
            return Err(e.into());
        }
    };
    println!(
        "✅ Session loaded: balance {:.0}, timer at {:.1}s",
        session.balance(),
        session.timer_snapshot().elapsed_secs
    );

    let balance_events = session.watch_balance();
    let (mark_tx, mark_events) = std::sync::mpsc::channel();
    session.subscribe_signals(move |signal| {
        let _ = mark_tx.send(signal);
    });

    let session = Arc::new(RwLock::new(session));

    if config.api.enabled {
        let addr: std::net::SocketAddr = config.api.bind.parse()?;
        let api_state = ApiState::new(Arc::clone(&session));
        tokio::spawn(async move {
            if let Err(e) = upkeep_api::start_server(addr, api_state).await {
                eprintln!("❌ API server error: {}", e);
            }
        });
        println!("✅ API enabled on {}", config.api.bind);
    }

    println!("\n{}", "Session Status: ACTIVE".green().bold());
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());

    let mut ticker = time::interval(Duration::from_millis(TICK_INTERVAL_MS));
    let mut last_tick = Instant::now();
    let mut last_heartbeat = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let delta_secs = now.duration_since(last_tick).as_secs_f64();
                last_tick = now;

                // In-memory state is still good after a failed write;
                // the next mutation persists again.
                if let Err(e) = session.write().await.advance(delta_secs) {
                    eprintln!("❌ Session tick failed: {}", e);
                }

                for signal in mark_events.try_iter() {
                    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
                    println!("[{}] ⏱️  {} reached", timestamp, signal);
                }
                for balance in balance_events.try_iter() {
                    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
                    println!("[{}] 💰 balance now {:.0}", timestamp, balance);
                }

                if last_heartbeat.elapsed() >= Duration::from_secs(60) {
                    last_heartbeat = Instant::now();
                    let status = session.read().await.status();
                    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
                    println!(
                        "[{}] {} balance {:.0}, elapsed {:.1}s, running {}",
                        timestamp,
                        "session heartbeat -".bright_black(),
                        status.balance,
                        status.timer.elapsed_secs,
                        status.timer.running
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n🛑 Shutting down...");
                break;
            }
        }
    }

    session.write().await.close();
    println!("✅ Session state saved; goodbye");

    Ok(())
}
