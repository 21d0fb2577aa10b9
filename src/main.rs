// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use todo_server::{
    api::router,
    auth::{TokenDirectory, TokenDirectoryError},
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{MemoryTodoStore, RedbTodoStore},
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn load_tokens(config: &AppConfig) -> Result<TokenDirectory, TokenDirectoryError> {
    let mut directory = TokenDirectory::new();

    if let Some(path) = &config.tokens_file {
        directory.merge(TokenDirectory::from_json_file(path)?)?;
        tracing::info!(path = %path.display(), "Loaded token file");
    }
    if let Some(inline) = &config.inline_tokens {
        directory.merge(TokenDirectory::from_inline(inline)?)?;
    }

    if directory.is_empty() {
        tracing::warn!("No API tokens configured; every /api request will be rejected");
    }
    Ok(directory)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = load_tokens(&config)?;

    let state = match &config.data_dir {
        Some(dir) => {
            let store = RedbTodoStore::open_in_dir(dir)?;
            tracing::info!(data_dir = %dir.display(), "Using redb todo storage");
            AppState::new(store)
        }
        None => {
            tracing::warn!("DATA_DIR not set; todos are kept in memory only");
            AppState::new(MemoryTodoStore::new())
        }
    }
    .with_credentials(credentials);

    let app = router(state);
    let listener = TcpListener::bind(config.bind_addr).await?;

    tracing::info!(
        addr = %config.bind_addr,
        "Todo server listening on http://{} (docs at /docs)",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
