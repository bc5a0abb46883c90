//! Main Entrypoint for the Asybot Gateway
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Constructing the AI collaborator client for the configured provider.
//! 4. Assembling the registry, broadcaster, and processor into the app state.
//! 5. Starting the WebSocket server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use asybot_core::llm_client::{
    ConversationClient, DEFAULT_PERSONA_PROMPT, OpenAICompatibleClient,
};
use asybot_gateway::{
    broadcast::Broadcaster,
    config::{Config, Provider},
    registry::ConnectionRegistry,
    router::create_router,
    simulator,
    state::AppState,
    ws::turn::ConversationProcessor,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing gateway...");

    // --- 3. Initialize the AI Collaborator ---
    let client: Arc<dyn ConversationClient> = match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config.openai_api_key.as_ref().unwrap();
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
                DEFAULT_PERSONA_PROMPT.to_string(),
            ))
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config.gemini_api_key.as_ref().unwrap();
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
                DEFAULT_PERSONA_PROMPT.to_string(),
            ))
        }
    };

    // --- 4. Assemble Shared State ---
    let registry = Arc::new(ConnectionRegistry::new(config.admission_policy));
    let broadcaster = Broadcaster::new(registry.clone());
    let processor = Arc::new(ConversationProcessor::new(
        client,
        broadcaster.clone(),
        config.ai_timeout,
    ));

    let app_state = Arc::new(AppState {
        registry: registry.clone(),
        broadcaster: broadcaster.clone(),
        processor,
        config: Arc::new(config.clone()),
    });

    if config.simulator_enabled {
        info!("Command simulator enabled.");
        tokio::spawn(simulator::run(registry, broadcaster));
    }

    // --- 5. Start Server ---
    let app = create_router(app_state);

    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        policy = ?config.admission_policy,
        bind_address = %config.bind_address,
        "Gateway configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
