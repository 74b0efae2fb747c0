//! Turibot
//!
//! Binary entrypoint: loads configuration, starts the keep-alive HTTP
//! listener and the session sweeper, then runs the WhatsApp agent.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use turibot::config::BotConfig;
use turibot::host::Host;
use turibot::server;
use turibot::session::{run_sweeper, SessionStore};
use turibot::whatsapp::WhatsAppAgent;

#[derive(Parser)]
#[command(name = "turibot", version, about = "WhatsApp auto-responder for Wanderlust Turismo")]
struct Args {
    /// Path to the configuration file (defaults to ./turibot.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep-alive listener port (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// WhatsApp auth database path
    #[arg(long, default_value = "auth/turibot.db")]
    auth_db: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = BotConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if cfg.operator_jid.is_empty() {
        tracing::warn!("No operator_jid configured; handoff alerts are disabled");
    }

    let store = Arc::new(Mutex::new(SessionStore::new()));
    let (host, outbound) = Host::new(&cfg, store.clone());

    run_sweeper(store, cfg.sweep_period(), cfg.idle_window());
    let http = tokio::spawn(server::run(cfg.port));
    let agent = WhatsAppAgent::new(host, outbound, args.auth_db).start();

    tokio::select! {
        res = http => {
            if let Ok(Err(e)) = res {
                tracing::error!("HTTP listener failed: {}", e);
            }
        }
        _ = agent => {
            tracing::error!("WhatsApp agent exited");
        }
    }
    Ok(())
}
