//! NukeKV server entry point.
//!
//! Loads the snapshot, starts the background manager and the worker pool,
//! then accepts connections until Ctrl+C. On shutdown the pool drains its
//! queue and any unsaved mutations are flushed one last time.

use std::sync::Arc;

use nukekv::commands::CommandHandler;
use nukekv::config::{Config, Settings};
use nukekv::connection::{bind_listener, handle_session};
use nukekv::dispatch::WorkerPool;
use nukekv::storage::{BackgroundConfig, BackgroundManager, StoreEngine};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Parse configuration from command-line arguments.
fn config_from_args() -> Config {
    let mut config = Config::default();
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        let needs_value = |name: &str| {
            eprintln!("Error: {} requires a value", name);
            std::process::exit(1);
        };
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    config.host = args[i + 1].clone();
                    i += 2;
                } else {
                    needs_value("--host");
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    config.port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    needs_value("--port");
                }
            }
            "--workers" | "-w" => {
                if i + 1 < args.len() {
                    config.workers = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid worker count");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    needs_value("--workers");
                }
            }
            "--memory-limit-mb" | "-m" => {
                if i + 1 < args.len() {
                    let mb: u64 = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid memory limit");
                        std::process::exit(1);
                    });
                    config.memory_limit = mb * 1024 * 1024;
                    i += 2;
                } else {
                    needs_value("--memory-limit-mb");
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    config.db_path = args[i + 1].clone().into();
                    i += 2;
                } else {
                    needs_value("--db");
                }
            }
            "--no-persistence" => {
                config.persistence = false;
                i += 1;
            }
            "--debug" => {
                config.debug = true;
                i += 1;
            }
            "--version" | "-v" => {
                println!("NukeKV version {}", nukekv::VERSION);
                std::process::exit(0);
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    config
}

fn print_help() {
    println!(
        r#"
NukeKV - An In-Memory Key-Value Database

USAGE:
    nukekv [OPTIONS]

OPTIONS:
    -h, --host <HOST>             Host to bind to (default: 0.0.0.0)
    -p, --port <PORT>             Port to listen on (default: 8080)
    -w, --workers <N>             Worker count, 0 = auto (default: 0)
    -m, --memory-limit-mb <MB>    Memory cap in MB, 0 = unlimited (default: 0)
        --db <FILE>               Snapshot file (default: nukekv.db)
        --no-persistence          Disable snapshots entirely
        --debug                   Start with debug timing enabled
    -v, --version                 Print version information
        --help                    Print this help message

PROTOCOL:
    Each request/reply is one frame: an 8-byte big-endian payload length
    followed by the payload. Send "STATS" for a live report, "QUIT" to
    close the session.
"#
    );
}

fn print_banner(config: &Config, workers: usize) {
    println!(
        r#"
     _   _       _        _  ____   __
    | \ | |_   _| | _____| |/ /\ \ / /
    |  \| | | | | |/ / _ \ ' /  \ V /
    | |\  | |_| |   <  __/ . \   | |
    |_| \_|\__,_|_|\_\___|_|\_\  |_|

NukeKV v{} - Protocol: Nuke-Wire (framed TCP)
─────────────────────────────────────────────────
Listening on {}  |  Workers: {}  |  Batching: {}
Press Ctrl+C to shut down.
"#,
        nukekv::VERSION,
        config.bind_address(),
        workers,
        config.batch_size,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config_from_args();

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let settings = Arc::new(Settings::from_config(&config));
    let engine = Arc::new(StoreEngine::new(Arc::clone(&settings)));
    engine.load_from_disk();

    let manager = BackgroundManager::start(Arc::clone(&engine), BackgroundConfig::default());

    let handler = CommandHandler::new(Arc::clone(&engine));
    let pool = Arc::new(WorkerPool::start(handler, settings.workers));

    let listener = bind_listener(config.bind_address().parse()?)?;
    print_banner(&config, settings.workers);
    info!("listening on {}", config.bind_address());

    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&pool), Arc::clone(&settings)) => {}
        _ = shutdown => {}
    }

    // finish queued commands, stop the sweeper, then save what is unsaved
    pool.shutdown().await;
    manager.stop();
    {
        let mut store = engine.write();
        if store.dirty() > 0 {
            info!(ops = store.dirty(), "performing final save");
            let path = settings.db_path.clone();
            engine.flush(&mut store, &path);
        }
    }

    info!("server shutdown complete");
    Ok(())
}

/// Accepts connections forever, one detached session task per client.
async fn accept_loop(listener: TcpListener, pool: Arc<WorkerPool>, settings: Arc<Settings>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let pool = Arc::clone(&pool);
                let settings = Arc::clone(&settings);
                tokio::spawn(async move {
                    handle_session(stream, addr, pool, settings).await;
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
