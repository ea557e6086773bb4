//! Légifrance research agent HTTP Server
//!
//! Axum-based server providing REST API and WebSocket endpoints for a
//! ReAct agent that answers French legal questions through the Légifrance
//! lookup server.

mod config;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, LlmProvider, ToolRegistry};
use agent_runtime::OpenAiProvider;
use legifrance::lookup::{self, HttpLookupClient, LookupService};

use crate::config::AppConfig;
use crate::handlers::{
    chat_handler, chat_stream_handler, get_thread, health_check, list_threads, list_tools,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    // Initialize LLM provider
    let provider = Arc::new(OpenAiProvider::from_config(config.llm.clone())?);
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to LLM at {}", config.llm.base_url),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ LLM endpoint not available - chat requests will fail");
            tracing::warn!("  Check LLM_BASE_URL ({})", config.llm.base_url);
        }
    }

    // Initialize lookup service
    let lookup: Arc<dyn LookupService> = Arc::new(HttpLookupClient::new(config.lookup.clone())?);
    if lookup::wait_until_ready(lookup.as_ref(), config.health_check_timeout, Duration::from_secs(1)).await {
        tracing::info!("✓ Lookup service ready at {}", config.lookup.base_url);
    } else {
        tracing::warn!("⚠ Lookup service not ready - tool calls will report it unavailable");
        tracing::warn!("  Check MCP_SERVER_URL ({})", config.lookup.base_url);
    }

    // Initialize tools
    let mut tools = ToolRegistry::new();
    legifrance::register_tools(&mut tools, lookup.clone(), config.default_max_results)?;

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .system_prompt(legifrance::LEGIFRANCE_SYSTEM_PROMPT)
        .model(config.model.clone())
        .temperature(config.temperature)
        .max_iterations(config.max_iterations)
        .turn_timeout(config.turn_timeout)
        .build()?;

    let state = AppState {
        agent: Arc::new(agent),
        lookup,
    };

    let addr = config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 Légifrance agent running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /api/tools         - Tool catalogue");
    tracing::info!("  POST /api/chat          - Send message");
    tracing::info!("  GET  /api/chat/stream   - WebSocket streaming");
    tracing::info!("  GET  /api/threads       - Conversation threads");
    tracing::info!("  GET  /api/threads/{{id}}  - Thread history");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        // Agent API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        // Threads
        .route("/api/threads", get(list_threads))
        .route("/api/threads/{id}", get(get_thread))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
