use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::models::ChatSession;
use crate::services::ai::LlmProvider;
use crate::services::notify::BookingNotifier;
use crate::services::weather::WeatherProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    /// Absent when no weather API key is configured.
    pub weather: Option<Box<dyn WeatherProvider>>,
    /// Absent when no downstream booking API is configured.
    pub booking_api: Option<Box<dyn BookingNotifier>>,
    /// One session per caller-supplied id. The inner async mutex serializes
    /// turns within a session; turns in different sessions are independent.
    pub sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<ChatSession>>>>,
}

impl AppState {
    /// Fetch or lazily create the session for an id.
    pub fn session(&self, id: &str) -> Arc<tokio::sync::Mutex<ChatSession>> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!(session = id, "creating new chat session");
                Arc::new(tokio::sync::Mutex::new(ChatSession::new(
                    chrono::Utc::now().date_naive(),
                    self.config.template_seed,
                )))
            })
            .clone()
    }
}
