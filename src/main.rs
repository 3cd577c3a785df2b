//! api-base: a CRUD API behind a request security filter.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                     API SERVICE                  │
//!                      │                                                  │
//!  Client Request      │  ┌──────────┐   ┌──────────┐   ┌──────────────┐  │
//!  ────────────────────┼─▶│ request  │──▶│ security │──▶│   example    │  │
//!                      │  │ id + log │   │  filter  │   │   handlers   │  │
//!                      │  └──────────┘   └────┬─────┘   └──────┬───────┘  │
//!                      │                      │                │          │
//!                      │               ┌──────▼─────┐   ┌──────▼───────┐  │
//!                      │               │ rate limit │   │  repository  │  │
//!                      │               │   store    │   │ (+JSON file) │  │
//!                      │               └────────────┘   └──────────────┘  │
//!                      │                                                  │
//!                      │  Cross-cutting: config (hot reload), observability│
//!                      │  lifecycle (signals, graceful shutdown)          │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use api_base::config::{load_config, load_from_env, AppConfig, ConfigWatcher};
use api_base::example::{seed_examples, ExampleRepository, ExampleService, InMemoryExampleRepository};
use api_base::http::HttpServer;
use api_base::lifecycle::{log_startup_banner, wait_for_signal, Shutdown};
use api_base::observability::{init_tracing, metrics};

#[derive(Parser, Debug)]
#[command(name = "api-base", version, about = "Security-hardened example CRUD API")]
struct Args {
    /// Path to the TOML configuration file (optional).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Insert sample examples when the store is empty.
    #[arg(long)]
    seed: bool,
}

fn load(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(load_config(path)?)
    } else {
        Ok(load_from_env()?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args.config)?;

    init_tracing(&config.observability);
    log_startup_banner(&config);
    if !args.config.exists() {
        tracing::info!(path = %args.config.display(), "No config file found, using defaults and environment");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                error = %e,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let repo = Arc::new(if config.database.persist {
        InMemoryExampleRepository::load_from_file(Path::new(&config.database.path))?
    } else {
        InMemoryExampleRepository::default()
    });

    if args.seed {
        let inserted = seed_examples(&ExampleService::new(repo.clone())).await?;
        tracing::info!(inserted, "Seeding finished");
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = if args.config.exists() {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        (Some(watcher.run()?), updates)
    } else {
        let (_tx, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, repo.clone() as Arc<dyn ExampleRepository>);
    let mut server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    let stopped_early = tokio::select! {
        _ = wait_for_signal() => None,
        result = &mut server_task => Some(result),
    };
    match stopped_early {
        Some(result) => result??,
        None => {
            shutdown.trigger();
            server_task.await??;
        }
    }

    repo.flush().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
