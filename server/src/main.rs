//! livesearch binary: thin CLI shell over the [`livesearch_server`] library crate.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use livesearch_server::config::{load_config, BackendConfig, ServerConfig, DEFAULT_LISTEN_PORT};
use livesearch_server::types::AppContext;
use livesearch_server::{build_router, default_config_path};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Live code search page with a results relay to a search backend.
#[derive(Parser)]
#[command(name = "livesearch", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.livesearch/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, HOST:PORT (overrides config and PORT)
    #[arg(long)]
    listen: Option<String>,

    /// Directory served under /static (overrides config)
    #[arg(long)]
    docroot: Option<PathBuf>,

    /// Search backend base URL, e.g. http://127.0.0.1:9999 (overrides config)
    #[arg(long, value_name = "URL")]
    backend: Option<String>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "Could not register SIGTERM handler");
                    let _ = ctrl_c.await;
                    info!("Received SIGINT, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

/// CLI flag, then config file, then `PORT`, then the default port on the
/// chosen bind address.
fn resolve_listen(cli: &Cli, config: &ServerConfig) -> String {
    if let Some(listen) = &cli.listen {
        return listen.clone();
    }
    if let Some(listen) = &config.listen {
        return listen.clone();
    }
    let bind_addr = if cli.bind_all { "0.0.0.0" } else { "127.0.0.1" };
    let port = match std::env::var("PORT") {
        Ok(p) => p.parse::<u16>().unwrap_or_else(|_| {
            warn!(value = p.as_str(), "Ignoring invalid PORT");
            DEFAULT_LISTEN_PORT
        }),
        Err(_) => DEFAULT_LISTEN_PORT,
    };
    format!("{bind_addr}:{port}")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livesearch=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut config = match &config_path {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }),
        None => ServerConfig::default(),
    };

    if let Some(docroot) = &cli.docroot {
        config.docroot = docroot.clone();
    }
    if let Some(addr) = &cli.backend {
        let id = config.backend.as_ref().map(|b| b.id.clone());
        let mut backend = BackendConfig::from_addr(addr.clone());
        if let Some(id) = id {
            backend.id = id;
        }
        config.backend = Some(backend);
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    if config.backend.is_none() {
        warn!("No search backend configured; result requests will fail with 503");
    }
    if !config.docroot.join("pkg").is_dir() {
        warn!(docroot = %config.docroot.display(), "docroot has no pkg/ directory; the panel bundle will not load");
    }

    let listen = resolve_listen(&cli, &config);
    let listener = tokio::net::TcpListener::bind(&listen).await.unwrap_or_else(|e| {
        error!(listen = listen.as_str(), error = %e, "Could not bind listen address");
        std::process::exit(1);
    });

    let docroot = config.docroot.clone();
    let results_path = config.results_path.clone();
    let backend = config.backend.as_ref().map(|b| b.results_url());
    let ctx = AppContext::new(config).unwrap_or_else(|e| {
        error!(error = %e, "Could not build HTTP client");
        std::process::exit(1);
    });
    let app = build_router(ctx);

    info!(
        docroot = %docroot.display(),
        results_path = results_path.as_str(),
        backend = backend.as_deref().unwrap_or("<none>"),
        "Serving search page"
    );
    match listener.local_addr() {
        Ok(addr) => info!("http://{addr}"),
        Err(_) => info!(listen = listen.as_str(), "Listening"),
    }

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
