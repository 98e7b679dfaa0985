//! Hogwarts role-play backend entry point.
//!
//! Binary name: `hogsim`
//!
//! Loads configuration, initializes tracing and services, then serves the
//! HTTP API until Ctrl+C or SIGTERM.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use hogwarts_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        default_filter: cli.default_filter().to_string(),
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = hogwarts_infra::config::load_app_config(&cli.config).await;

    match cli.command {
        Commands::Config => {
            if config.auth.jwt_secret.is_some() {
                config.auth.jwt_secret = Some("********".to_string());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let state = AppState::init(&config).await?;
            let pool = state.db_pool.clone();

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} hogsim listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} {}",
                console::style("upstream").dim(),
                console::style(&config.upstream.base_url).yellow()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state, &config.server.allowed_origins);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            pool.close().await;
            println!("\n  Server stopped.");
        }
    }

    shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
