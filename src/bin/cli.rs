//! handcache CLI Client
//!
//! Command-line interface for interacting with handcache. With a
//! subcommand it sends one request; without one it reads requests from
//! stdin, one per line.

use std::io::{self, BufRead};

use clap::{Parser, Subcommand};
use handcache::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// handcache CLI
#[derive(Parser, Debug)]
#[command(name = "handcache-cli")]
#[command(about = "CLI for the handcache key-value cache")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4200")]
    server: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair with a TTL
    Set {
        /// The key to set
        key: String,

        /// Seconds until the entry expires
        ttl: i64,

        /// The value to set
        value: String,
    },
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Get { key }) => client.get(&key).map(|reply| println!("{}", reply)),
        Some(Commands::Set { key, ttl, value }) => {
            client.set(&key, value.into_bytes(), ttl).map(|reply| println!("{}", reply))
        }
        None => interactive(&mut client),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Send each stdin line as a request until EOF or the server hangs up
fn interactive(client: &mut Client) -> handcache::Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match client.request_line(&line) {
            Ok(reply) => println!("{}", reply),
            Err(e @ handcache::CacheError::InvalidArgument(_)) => eprintln!("{}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
