use std::sync::Arc;

use chrono::Utc;

use crate::db::queries;
use crate::models::{Booking, ChatSession, SessionState};
use crate::services::ai::{LlmProvider, Message};
use crate::services::templates;
use crate::services::weather::WeatherObservation;
use crate::state::AppState;

pub struct FinalizeOutcome {
    pub messages: Vec<String>,
    /// True only when the booking row was persisted; the caller resets the
    /// session exactly then.
    pub saved: bool,
}

/// Persist the confirmed booking and compose the outcome messages.
///
/// The weather tip and the downstream booking-API call are best effort: the
/// first is silently omitted on failure, the second downgrades to a note.
/// Only the database insert can fail the confirmation, in which case the
/// record is kept for a retry.
pub async fn confirm_booking(state: &Arc<AppState>, session: &mut ChatSession) -> FinalizeOutcome {
    if !session.record.is_complete() {
        // Should not happen from the confirmation state, but never persist a
        // partial record.
        tracing::warn!("confirmation reached with an incomplete record");
        session.state = SessionState::CollectingInfo;
        return FinalizeOutcome {
            messages: vec![
                "I'm still missing some booking details. Let's finish those first.".to_string(),
            ],
            saved: false,
        };
    }

    let record = session.record.clone();
    let destination = record.destination.clone().unwrap_or_default();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        destination: destination.clone(),
        check_in: record.check_in.unwrap_or_default(),
        check_out: record.check_out.unwrap_or_default(),
        guests: record.guests.unwrap_or_default(),
        created_at: Utc::now().naive_utc(),
    };

    let insert = {
        let db = state.db.lock().unwrap();
        queries::insert_booking(&db, &booking)
    };
    if let Err(e) = insert {
        tracing::error!(error = %e, "failed to persist booking");
        return FinalizeOutcome {
            messages: vec![
                "I couldn't save your booking just now. Want to try confirming again?".to_string(),
            ],
            saved: false,
        };
    }

    tracing::info!(booking_id = %booking.id, destination = %destination, "booking confirmed");

    let mut confirmation = format!(
        "{} I've booked {}. Your reference is {}.",
        templates::success_message(&mut session.rng, &destination),
        record.summary(),
        booking.id,
    );

    let mut messages = Vec::new();

    let tip = weather_tip(state, &destination).await;

    if let Some(api) = &state.booking_api {
        if let Err(e) = api.notify(&booking).await {
            tracing::warn!(error = %e, "booking API notification failed");
            confirmation.push_str(
                " (I couldn't sync this with our partner system, but your reservation is saved on our side.)",
            );
        }
    }

    messages.push(confirmation);
    if let Some(tip) = tip {
        messages.push(tip);
    }

    FinalizeOutcome {
        messages,
        saved: true,
    }
}

/// Best-effort weather tip for the destination. Every failure path means
/// "no tip", never an error surfaced to the user.
async fn weather_tip(state: &Arc<AppState>, destination: &str) -> Option<String> {
    let weather = state.weather.as_ref()?;

    let obs = match weather.current(destination).await {
        Ok(obs) => obs,
        Err(e) => {
            tracing::warn!(error = %e, destination, "weather lookup failed");
            return None;
        }
    };

    Some(compose_tip(state.llm.as_ref(), destination, &obs).await)
}

async fn compose_tip(llm: &dyn LlmProvider, destination: &str, obs: &WeatherObservation) -> String {
    let observed = format!(
        "It's {:.0}°C in {} with {}.",
        obs.temp_celsius, destination, obs.description
    );

    let request = Message {
        role: "user".to_string(),
        content: format!(
            "Provide a concise weather tip (1-2 sentences) for a traveler going to {}, \
             where the current temperature is {:.0}°C and the weather is {}. \
             Include a relevant emoji at the end.",
            destination, obs.temp_celsius, obs.description
        ),
    };

    match llm.chat("You are a helpful travel assistant.", &[request]).await {
        Ok(tip) if !tip.trim().is_empty() => format!("{observed} {}", tip.trim()),
        Ok(_) => observed,
        Err(e) => {
            tracing::warn!(error = %e, "weather tip generation failed, using plain report");
            observed
        }
    }
}
