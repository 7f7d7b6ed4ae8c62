//! Atelier CLI
//!
//! Command-line entry point for the Atelier backend.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP API server
//! - `inspect` - Print table counts and the latest update timestamp
//! - `token` - Mint a device auth token

use atelier_core::Store;
use atelier_server::{AuthConfig, ServerConfig, TokenValidator};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Atelier couture-shop backend.
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Data directory (omit to run in memory)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory for uploaded photos
        #[arg(short, long, default_value = "uploads")]
        uploads: PathBuf,

        /// Shared secret enabling token authentication
        #[arg(long)]
        auth_secret: Option<String>,
    },

    /// Print table counts and the latest update timestamp
    Inspect {
        /// Data directory
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Mint a device auth token
    Token {
        /// Shared secret (the same one the server was started with)
        #[arg(long)]
        auth_secret: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            data,
            uploads,
            auth_secret,
        } => {
            let mut config = ServerConfig::new(bind).with_uploads_dir(uploads);
            if let Some(data) = data {
                config = config.with_data_dir(data);
            }
            if let Some(secret) = auth_secret {
                config = config.with_auth(secret.into_bytes());
            }
            atelier_server::serve(config).await?;
        }

        Commands::Inspect { data } => {
            let store = Store::open(&data)?;
            store.read(|tables| {
                println!("clients:      {}", tables.clients.len());
                println!("measurements: {}", tables.measurements.len());
                println!("orders:       {}", tables.orders.len());
                match tables.latest_update() {
                    Some(ts) => println!("last update:  {}", ts.to_rfc3339()),
                    None => println!("last update:  (empty store)"),
                }
            });
        }

        Commands::Token { auth_secret } => {
            let validator = TokenValidator::new(AuthConfig::new(auth_secret.into_bytes()));
            let device_id = Uuid::new_v4();
            let token = validator.create_token(device_id.into_bytes());
            println!("device: {device_id}");
            println!("token:  {token}");
        }
    }

    Ok(())
}
