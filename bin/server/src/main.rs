use parley_ai::OpenAiCompatClient;
use parley_conversation::ConversationService;
use parley_server::{AppState, config::ServerConfig, router};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be populated
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv
        && !e.not_found()
    {
        tracing::warn!(error = %e, "Failed to read .env file");
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = %report, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(?config, "Loaded configuration");

    let provider = match OpenAiCompatClient::new(config.backend_config()) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create completion client");
            return ExitCode::FAILURE;
        }
    };

    let conversation = ConversationService::new(Arc::new(provider), config.conversation_config());
    let app = router(Arc::new(AppState::new(conversation)));

    let listener = match tokio::net::TcpListener::bind(config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %config.bind_address, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        max_history = config.max_history,
        model = %config.completion.model,
        "Starting chat relay on http://{}",
        config.bind_address
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
