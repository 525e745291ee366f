use std::net::SocketAddr;
use std::process;

use fileserve::{config, router, state};
use tracing::info;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help") {
        println!("fileserve");
        println!("Serves a data directory over HTTP: listings, single-file downloads,");
        println!("and multi-file ZIP bundles streamed on the fly.");
        println!();
        println!("USAGE:");
        println!("    fileserve [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    --addr=<ADDRESS>      Listening address. [env: ADDR] [default: 0.0.0.0:8080]");
        println!("    --data-dir=<PATH>     Directory served to clients. [env: DATA_DIR] [default: ./data]");
        println!("    --static-dir=<PATH>   Frontend assets for unmatched routes. [env: STATIC_DIR] [default: ./frontend]");
        println!();
        println!("    --help                Prints this help information.");
        println!();

        process::exit(0);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::Config::load();
    info!(
        data_dir = %config.data_dir.display(),
        static_dir = %config.static_dir.display(),
        "configuration loaded"
    );

    let state = state::AppState::new(config.clone()).expect("Failed to prepare data directory");

    let app = router::create_router(state);

    let addr: SocketAddr = config.addr.parse().expect("Invalid address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    info!(%addr, "server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = wait_for_ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }

    info!("shutdown signal received, stopping server");
}

async fn wait_for_ctrl_c() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
