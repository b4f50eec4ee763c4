// src/main.rs

use quiz_grader::config::Config;
use quiz_grader::extraction::GeminiKeySource;
use quiz_grader::grading::{Workspace, ticker::spawn_ticker};
use quiz_grader::routes;
use quiz_grader::state::AppState;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (and .env, if present)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let key_source = match GeminiKeySource::new(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to create model client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Using model {} at {}", config.gemini_model, key_source.endpoint());

    let workspace = match Workspace::new(config.test_duration_secs) {
        Ok(workspace) => workspace.shared(),
        Err(e) => {
            tracing::error!("Failed to create workspace: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // One tick per second drives the test countdown
    let _ticker = spawn_ticker(workspace.clone(), Duration::from_secs(1));

    let state = AppState {
        config: config.clone(),
        key_source: Arc::new(key_source),
        workspace,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Answer key grader listening on {}", addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
