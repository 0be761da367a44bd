use clap::Parser;
use mintscore::api::{create_router, AppState};
use mintscore::cli::{read_json, Cli, Commands};
use mintscore::config::AppConfig;
use mintscore::domain::{TokenMetadata, TradeEvent};
use mintscore::error::{MintscoreError, Result};
use mintscore::model::Scorer;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    init_logging(&config);
    if let Err(errors) = config.validate() {
        return Err(MintscoreError::Validation(errors.join("; ")));
    }

    match &cli.command {
        Commands::Serve { port } => run_server(&config, *port).await,
        Commands::Train { trades, tokens } => {
            let trades: Vec<TradeEvent> = read_json(trades)?;
            let tokens: Vec<TokenMetadata> = read_json(tokens)?;
            let scorer = Scorer::new(&config);
            let report = scorer.train(&trades, &tokens)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Predict { trades, token } => {
            let trades: Vec<TradeEvent> = read_json(trades)?;
            let token: TokenMetadata = read_json(token)?;
            let scorer = Scorer::new(&config);
            match scorer.load_persisted() {
                Ok(true) => {}
                Ok(false) => info!("no trained model found, using heuristic fallback"),
                // A corrupt store degrades to the fallback instead of failing the call.
                Err(e) => warn!(error = %e, "could not load model artifact, using fallback"),
            }
            let prediction = scorer.predict(&trades, &token)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
            Ok(())
        }
    }
}

async fn run_server(config: &AppConfig, port_override: Option<u16>) -> Result<()> {
    let scorer = Arc::new(Scorer::new(config));
    match scorer.load_persisted() {
        Ok(true) => {}
        Ok(false) => info!("no trained model found, serving heuristic fallback until trained"),
        Err(e) => warn!(error = %e, "could not load model artifact, serving fallback"),
    }

    let app = create_router(AppState::new(scorer));
    let port = port_override.unwrap_or(config.server.port);
    let addr = format!("{}:{port}", config.server.host);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "scoring API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},mintscore=debug", config.logging.level)));

    // Optional file logging, enabled by MINTSCORE_LOG_DIR.
    //
    // Important: `tracing_appender::rolling::daily` panics if it can't
    // create the initial log file, so writability is preflighted.
    let file_layer = std::env::var("MINTSCORE_LOG_DIR").ok().and_then(|log_dir| {
        if std::fs::create_dir_all(&log_dir).is_err() {
            eprintln!("Warning: could not create log directory {log_dir}, file logging disabled");
            return None;
        }
        let test_path = std::path::Path::new(&log_dir).join(".mintscore_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let file_appender = tracing_appender::rolling::daily(&log_dir, "mintscore.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Keep the guard alive for the process lifetime.
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not write to log directory {log_dir} ({e}), file logging disabled"
                );
                None
            }
        }
    });

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
