use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use stock_api_providers::alpaca::AlpacaProvider;
use stock_api_providers::provider::{DEFAULT_HISTORY_WINDOW_DAYS, MarketDataGateway};
use stock_api_providers::yahoo::YahooProvider;
use stock_api_server::routes::{DEFAULT_CORS_ORIGIN, cors_layer, create_router};
use stock_api_server::service::StockService;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "stock-api",
    about = "Serve current prices and daily history for stock symbols"
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "STOCK_API_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Data provider: alpaca, yahoo
    #[arg(long, env = "STOCK_API_PROVIDER", default_value = "alpaca")]
    provider: String,

    /// Calendar days of daily history to return
    #[arg(
        long,
        env = "STOCK_API_HISTORY_DAYS",
        default_value_t = DEFAULT_HISTORY_WINDOW_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=3650)
    )]
    history_days: i64,

    /// Timeout for each request to the data provider, in seconds
    #[arg(
        long,
        env = "STOCK_API_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,

    /// Browser origins allowed to read responses (comma-separated)
    #[arg(
        long = "cors-origin",
        env = "STOCK_API_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGIN
    )]
    cors_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn create_provider(name: &str, timeout: Duration) -> Result<Arc<dyn MarketDataGateway>> {
    match name {
        "alpaca" => Ok(Arc::new(
            AlpacaProvider::from_env(timeout).context("failed to create Alpaca provider")?,
        )),
        "yahoo" => Ok(Arc::new(
            YahooProvider::new(timeout).context("failed to create Yahoo provider")?,
        )),
        other => anyhow::bail!("unknown provider: {other}. Expected: alpaca, yahoo"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed flags
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let gateway = create_provider(&cli.provider, Duration::from_secs(cli.timeout_secs))?;

    info!(
        provider = gateway.name(),
        bind = %cli.bind,
        history_days = cli.history_days,
        timeout_secs = cli.timeout_secs,
        cors_origins = ?cli.cors_origins,
        "configuration loaded"
    );

    let service = Arc::new(StockService::new(
        gateway,
        chrono::Duration::days(cli.history_days),
    ));
    let cors = cors_layer(&cli.cors_origins).context("invalid CORS origin")?;
    let app = create_router(service, cors);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    info!("listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
