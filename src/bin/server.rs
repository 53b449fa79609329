//! SnapKV Server Binary
//!
//! Starts the HTTP server for SnapKV.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use snapkv::network::Server;
use snapkv::{Config, Engine, SnapshotFormat, Storage, StorageKind};
use tracing_subscriber::{fmt, EnvFilter};

/// SnapKV Server
#[derive(Parser, Debug)]
#[command(name = "snapkv-server")]
#[command(about = "String key-value store with crash-safe snapshots")]
#[command(version)]
struct Args {
    /// Snapshot file path
    #[arg(short, long, default_value = "./snapkv_data/data.json")]
    snapshot: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4000")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Snapshot encoding for writes
    #[arg(short, long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,

    /// Keep data in memory only and serve requests one at a time
    #[arg(long)]
    memory: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Binary,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => SnapshotFormat::Json,
            FormatArg::Binary => SnapshotFormat::Binary,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snapkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let kind = if args.memory {
        StorageKind::Memory
    } else {
        StorageKind::Durable
    };

    tracing::info!("SnapKV Server v{}", snapkv::VERSION);
    tracing::info!("Storage: {:?}", kind);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .snapshot_path(&args.snapshot)
        .snapshot_format(args.format.into())
        .storage_kind(kind)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    if let Err(e) = run(config) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> snapkv::Result<()> {
    let server = Server::bind(config.clone())?;

    match config.storage_kind {
        StorageKind::Memory => {
            let engine = Engine::open_memory();
            tracing::info!("In-memory engine ready");
            server.serve_sequential(&engine)
        }
        StorageKind::Durable => {
            tracing::info!("Snapshot path: {}", config.snapshot_path.display());
            let engine = Arc::new(Engine::open_durable(&config)?);
            tracing::info!(
                "Durable engine ready ({} keys loaded)",
                engine.storage().len()
            );
            server.serve_concurrent(engine)
        }
    }
}
