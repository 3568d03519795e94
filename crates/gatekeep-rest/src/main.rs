//! gatekeep-server
//!
//! Serves a user store over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gatekeep::{Backend, MemoryStore, PersistentStore, Store, StoreConfig};
use gatekeep_rest::{api_router, serve, RestSettings};

/// User registration and login over HTTP.
#[derive(Parser)]
#[command(name = "gatekeep-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "GATEKEEP_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// SQLite database file. Users are kept in memory only if omitted.
    #[arg(short, long, env = "GATEKEEP_DATABASE")]
    database: Option<PathBuf>,

    /// Echo error details to clients.
    #[arg(long)]
    debug: bool,

    /// Maximum concurrent sessions per user (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    max_sessions: usize,

    /// Forbid users from changing their password.
    #[arg(long)]
    deny_password_change: bool,

    /// Pattern every username must fully match.
    #[arg(long)]
    username_pattern: Option<String>,

    /// Pattern every password must fully match.
    #[arg(long)]
    password_pattern: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn store_config(&self) -> gatekeep::Result<StoreConfig> {
        let mut builder = StoreConfig::builder()
            .max_sessions(self.max_sessions)
            .allow_password_change(!self.deny_password_change);
        if let Some(pattern) = &self.username_pattern {
            builder = builder.username_pattern(pattern.as_str());
        }
        if let Some(pattern) = &self.password_pattern {
            builder = builder.password_pattern(pattern.as_str());
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.store_config()?;
    let settings = RestSettings { debug: cli.debug };

    let listener = TcpListener::bind(cli.listen).await?;
    info!(addr = %cli.listen, "gatekeep server listening");

    match cli.database {
        Some(path) => {
            info!(path = %path.display(), "using sqlite store");
            // Opening blocks on the backend's own runtime.
            let store =
                tokio::task::spawn_blocking(move || PersistentStore::open(path, config)).await??;
            run(listener, store, settings).await
        }
        None => {
            info!("using in-memory store");
            run(listener, MemoryStore::in_memory(config), settings).await
        }
    }
}

async fn run<B: Backend + 'static>(
    listener: TcpListener,
    store: Store<B>,
    settings: RestSettings,
) -> anyhow::Result<()> {
    let router = Arc::new(api_router(store.clone(), settings));

    tokio::select! {
        result = serve(listener, router) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    tokio::task::spawn_blocking(move || store.close()).await??;
    Ok(())
}
