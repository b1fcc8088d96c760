use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use concierge::config::AppConfig;
use concierge::db;
use concierge::handlers;
use concierge::services::ai::groq::GroqProvider;
use concierge::services::ai::ollama::OllamaProvider;
use concierge::services::ai::LlmProvider;
use concierge::services::notify::{BookingNotifier, HttpBookingNotifier};
use concierge::services::weather::{OpenWeatherProvider, WeatherProvider};
use concierge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {})", config.ollama_url);
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )?)
        }
        _ => {
            anyhow::ensure!(
                !config.groq_api_key.is_empty(),
                "GROQ_API_KEY must be set when LLM_PROVIDER=groq"
            );
            tracing::info!("using Groq LLM provider (model: {})", config.groq_model);
            Box::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            )?)
        }
    };

    let weather: Option<Box<dyn WeatherProvider>> = if config.openweather_api_key.is_empty() {
        tracing::info!("OPENWEATHER_API_KEY not set, weather tips disabled");
        None
    } else {
        Some(Box::new(OpenWeatherProvider::new(
            config.openweather_api_key.clone(),
        )?))
    };

    let booking_api: Option<Box<dyn BookingNotifier>> = if config.booking_api_url.is_empty() {
        tracing::info!("BOOKING_API_URL not set, downstream notifications disabled");
        None
    } else {
        Some(Box::new(HttpBookingNotifier::new(
            config.booking_api_url.clone(),
        )?))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        llm,
        weather,
        booking_api,
        sessions: Mutex::new(HashMap::new()),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .route("/reset", post(handlers::chat::reset))
        .route("/greeting", get(handlers::chat::greeting))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
