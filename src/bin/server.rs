//! handcache Server Binary
//!
//! Starts the TCP server for handcache.

use std::sync::Arc;

use clap::Parser;
use handcache::config::DEFAULT_MAX_FRAME_SIZE;
use handcache::network::Server;
use handcache::{Config, Store, SystemClock};
use tracing_subscriber::{fmt, EnvFilter};

/// handcache Server
#[derive(Parser, Debug)]
#[command(name = "handcache-server")]
#[command(about = "In-memory key-value cache with TTL and LRU eviction")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4200")]
    listen: String,

    /// Maximum number of cached items (0 = unbounded)
    #[arg(short = 'c', long, default_value = "0")]
    max_items: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Largest accepted frame in bytes, header included
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    max_frame_size: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,handcache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("handcache Server v{}", handcache::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!(
        "Max items: {}",
        if args.max_items == 0 { "unbounded".to_string() } else { args.max_items.to_string() }
    );

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_items(args.max_items)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_size)
        .build();

    let store = Arc::new(Store::new(config.max_items, Arc::new(SystemClock)));

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
