use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use tower::ServiceExt;

use concierge::config::AppConfig;
use concierge::db;
use concierge::handlers;
use concierge::models::{Booking, BookingRecord, ChatSession, SessionState};
use concierge::services::ai::{LlmProvider, Message};
use concierge::services::dialogue;
use concierge::services::notify::BookingNotifier;
use concierge::services::weather::{WeatherObservation, WeatherProvider};
use concierge::state::AppState;

// ── Mock Providers ──

/// Deterministic LLM stub. The system prompt picks the capability
/// (extraction, change classification, weather tip) and the last user
/// message picks the canned response.
struct MockLlm;

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        if system_prompt.contains("wants to change") {
            return Ok(if last.contains("guests") {
                r#"{"field":"guests"}"#.to_string()
            } else if last.contains("destination") || last.contains("city") {
                r#"{"field":"destination"}"#.to_string()
            } else if last.contains("date") {
                r#"{"field":"dates"}"#.to_string()
            } else {
                r#"{"field":"unknown"}"#.to_string()
            });
        }

        if system_prompt.contains("travel assistant") {
            return Ok("Pack light layers! 🧳".to_string());
        }

        // Extraction prompts.
        Ok(if last.contains("garbage") {
            "I am sorry, I cannot help with that.".to_string()
        } else if last.contains("check in 2099-01-01") {
            r#"{"destination":null,"check_in":"2099-01-01","check_out":"2099-01-03","guests":2}"#
                .to_string()
        } else if last.contains("2020-01-01") {
            r#"{"destination":null,"check_in":"2020-01-01","check_out":null,"guests":null}"#
                .to_string()
        } else if last.contains("Paris") {
            r#"{"destination":"Paris","check_in":null,"check_out":null,"guests":null}"#.to_string()
        } else {
            r#"{"destination":null,"check_in":null,"check_out":null,"guests":null}"#.to_string()
        })
    }
}

struct MockWeather;

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, _city: &str) -> anyhow::Result<WeatherObservation> {
        Ok(WeatherObservation {
            description: "clear sky".to_string(),
            temp_celsius: 22.0,
        })
    }
}

struct MockNotifier {
    notified: Arc<Mutex<Vec<Booking>>>,
    fail: bool,
}

#[async_trait]
impl BookingNotifier for MockNotifier {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("partner API unreachable");
        }
        self.notified.lock().unwrap().push(booking.clone());
        Ok(())
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        llm_provider: "groq".to_string(),
        groq_api_key: "test".to_string(),
        groq_model: "test".to_string(),
        ollama_url: String::new(),
        ollama_model: String::new(),
        openweather_api_key: String::new(),
        booking_api_url: String::new(),
        template_seed: Some(42),
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        llm: Box::new(MockLlm),
        weather: None,
        booking_api: None,
        sessions: Mutex::new(HashMap::new()),
    })
}

fn test_session() -> ChatSession {
    ChatSession::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), Some(42))
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .route("/reset", post(handlers::chat::reset))
        .route("/greeting", get(handlers::chat::greeting))
        .with_state(state)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Drive the session up to the summary-and-confirm prompt.
async fn fill_booking(state: &Arc<AppState>, session: &mut ChatSession) -> Vec<String> {
    dialogue::process_message(state, session, "I want to go to Paris").await;
    dialogue::process_message(state, session, "check in 2099-01-01, checkout 2099-01-03, 2 guests")
        .await
}

// ── Dialogue flow ──

#[tokio::test]
async fn test_empty_message_prompts_still_there() {
    let state = test_state();
    let mut session = test_session();
    let replies = dialogue::process_message(&state, &mut session, "   ").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("still there"));
    // Only the (empty) user turn was recorded.
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0].role, "user");
}

#[tokio::test]
async fn test_destination_then_next_question() {
    let state = test_state();
    let mut session = test_session();
    let replies = dialogue::process_message(&state, &mut session, "I want to go to Paris").await;
    assert_eq!(session.record.destination.as_deref(), Some("Paris"));
    assert_eq!(session.record.check_in, None);
    // The next question targets check-in.
    let reply = &replies[0];
    assert!(
        reply.contains("arriving") || reply.contains("check-in") || reply.contains("from"),
        "unexpected reply: {reply}"
    );
    assert_eq!(session.state, SessionState::CollectingInfo);
}

#[tokio::test]
async fn test_full_details_move_to_confirmation() {
    let state = test_state();
    let mut session = test_session();
    let replies = fill_booking(&state, &mut session).await;

    assert!(session.record.is_complete());
    assert_eq!(session.state, SessionState::AwaitingConfirmation);
    let summary = &replies[0];
    assert!(summary.contains("Paris"));
    assert!(summary.contains("2099-01-01"));
    assert!(summary.contains("2099-01-03"));
    assert!(summary.contains('2'));
}

#[tokio::test]
async fn test_confirmation_yes_saves_and_resets() {
    let state = test_state();
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "yes").await;
    assert!(replies[0].contains("Paris"));

    let bookings = {
        let conn = state.db.lock().unwrap();
        concierge::db::queries::get_bookings(&conn).unwrap()
    };
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].destination, "Paris");
    assert_eq!(bookings[0].check_in, date("2099-01-01"));
    assert_eq!(bookings[0].check_out, date("2099-01-03"));
    assert_eq!(bookings[0].guests, 2);
    assert!(replies[0].contains(&bookings[0].id));

    // Session is reset for the next booking.
    assert_eq!(session.state, SessionState::CollectingInfo);
    assert_eq!(session.record, BookingRecord::default());
    assert!(session.history.is_empty());
}

#[tokio::test]
async fn test_past_check_in_rejected() {
    let state = test_state();
    let mut session = test_session();
    let replies =
        dialogue::process_message(&state, &mut session, "check in on 2020-01-01 please").await;
    assert!(replies[0].contains("already passed"));
    assert_eq!(session.record.check_in, None);
}

#[tokio::test]
async fn test_change_flow_clears_guests() {
    let state = test_state();
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "no, wrong guests").await;
    assert_eq!(session.state, SessionState::CollectingInfo);
    assert_eq!(session.record.guests, None);
    // Everything else is preserved.
    assert_eq!(session.record.destination.as_deref(), Some("Paris"));
    assert_eq!(session.record.check_in, Some(date("2099-01-01")));
    assert!(replies[0].contains("How many guests"));
}

#[tokio::test]
async fn test_change_flow_dates_clears_both() {
    let state = test_state();
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    dialogue::process_message(&state, &mut session, "no, the date is off").await;
    assert_eq!(session.record.check_in, None);
    assert_eq!(session.record.check_out, None);
    assert_eq!(session.record.destination.as_deref(), Some("Paris"));
    assert_eq!(session.state, SessionState::CollectingInfo);
}

#[tokio::test]
async fn test_change_flow_unknown_asks_generic() {
    let state = test_state();
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "nope").await;
    assert!(replies[0].contains("What would you like to adjust"));
    // Nothing was cleared; we are back to collecting.
    assert!(session.record.is_complete());
    assert_eq!(session.state, SessionState::CollectingInfo);
}

#[tokio::test]
async fn test_ambiguous_confirmation_reprompts() {
    let state = test_state();
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "hmm maybe").await;
    assert!(replies[0].contains("yes/no"));
    assert_eq!(session.state, SessionState::AwaitingConfirmation);
    assert!(session.record.is_complete());
}

#[tokio::test]
async fn test_unparseable_extraction_degrades_to_no_update() {
    let state = test_state();
    let mut session = test_session();
    let replies = dialogue::process_message(&state, &mut session, "garbage input").await;
    // No crash, no update; the assistant just asks for the first field.
    assert_eq!(session.record, BookingRecord::default());
    assert_eq!(replies.len(), 1);
    assert!(!replies[0].is_empty());
}

#[tokio::test]
async fn test_small_talk_skips_extraction() {
    let state = test_state();
    let mut session = test_session();
    let replies = dialogue::process_message(&state, &mut session, "hello!").await;
    assert_eq!(session.record, BookingRecord::default());
    assert!(!replies[0].is_empty());
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn test_persistence_failure_keeps_record_for_retry() {
    // A connection without the bookings table makes the insert fail.
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        llm: Box::new(MockLlm),
        weather: None,
        booking_api: None,
        sessions: Mutex::new(HashMap::new()),
    });
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "yes").await;
    assert!(replies[0].contains("couldn't save"));
    // No reset: the user can just confirm again.
    assert_eq!(session.state, SessionState::AwaitingConfirmation);
    assert!(session.record.is_complete());
}

#[tokio::test]
async fn test_weather_tip_appended_on_success() {
    let conn = db::init_db(":memory:").unwrap();
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        llm: Box::new(MockLlm),
        weather: Some(Box::new(MockWeather)),
        booking_api: None,
        sessions: Mutex::new(HashMap::new()),
    });
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "yes").await;
    assert_eq!(replies.len(), 2);
    assert!(replies[1].contains("22°C in Paris"));
    assert!(replies[1].contains("Pack light layers"));
}

#[tokio::test]
async fn test_notifier_receives_booking() {
    let notified = Arc::new(Mutex::new(Vec::new()));
    let conn = db::init_db(":memory:").unwrap();
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        llm: Box::new(MockLlm),
        weather: None,
        booking_api: Some(Box::new(MockNotifier {
            notified: Arc::clone(&notified),
            fail: false,
        })),
        sessions: Mutex::new(HashMap::new()),
    });
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "yes").await;
    assert!(!replies[0].contains("partner system"));

    let notified = notified.lock().unwrap();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].destination, "Paris");
    assert_eq!(notified[0].guests, 2);
}

#[tokio::test]
async fn test_notifier_failure_degrades_message() {
    let conn = db::init_db(":memory:").unwrap();
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        llm: Box::new(MockLlm),
        weather: None,
        booking_api: Some(Box::new(MockNotifier {
            notified: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        })),
        sessions: Mutex::new(HashMap::new()),
    });
    let mut session = test_session();
    fill_booking(&state, &mut session).await;

    let replies = dialogue::process_message(&state, &mut session, "yes").await;
    // Booking still succeeded; the message carries a partial-success note.
    assert!(replies[0].contains("partner system"));
    let bookings = {
        let db = state.db.lock().unwrap();
        concierge::db::queries::get_bookings(&db).unwrap()
    };
    assert_eq!(bookings.len(), 1);
}

#[tokio::test]
async fn test_seeded_sessions_phrase_identically() {
    let state = test_state();
    let mut a = test_session();
    let mut b = test_session();
    let ra = dialogue::process_message(&state, &mut a, "I want to go to Paris").await;
    let rb = dialogue::process_message(&state, &mut b, "I want to go to Paris").await;
    assert_eq!(ra, rb);
}

// ── HTTP layer ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_endpoint_returns_replies() {
    let app = test_app(test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"message":"I want to go to Paris"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let replies = json["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert!(!replies[0].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_endpoint_missing_message_rejected() {
    let app = test_app(test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"session_id":"s1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_greeting_then_reset() {
    let state = test_state();

    let resp = test_app(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .uri("/greeting?session_id=s1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!json["response"].as_str().unwrap().is_empty());

    // A second greeting for the same session is empty.
    let resp = test_app(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .uri("/greeting?session_id=s1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["response"].as_str().unwrap(), "");

    // Reset clears the session; the greeting becomes available again.
    let resp = test_app(Arc::clone(&state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reset")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"session_id":"s1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["response"].as_str().unwrap().contains("reset"));

    let resp = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/greeting?session_id=s1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!json["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let state = test_state();

    let send = |state: Arc<AppState>, session_id: &str, message: &str| {
        let body = format!(r#"{{"session_id":"{session_id}","message":"{message}"}}"#);
        async move {
            test_app(state)
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/chat")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap()
        }
    };

    send(Arc::clone(&state), "a", "I want to go to Paris").await;
    send(Arc::clone(&state), "b", "hello!").await;

    let sessions = state.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 2);
}
