use std::sync::Arc;

use crate::models::{BookingRecord, ChangeField, ChatSession, ReplyKind, SessionState};
use crate::services::ai::extraction;
use crate::services::{finalize, templates};
use crate::state::AppState;

const AFFIRMATIVE: &[&str] = &[
    "yes", "yeah", "yep", "confirm", "correct", "ok", "okay", "sure", "proceed",
];
const NEGATIVE: &[&str] = &["no", "nope", "change", "wrong", "cancel", "incorrect"];

/// Return a greeting only when the conversation has not started yet.
pub fn initial_greeting(session: &mut ChatSession) -> String {
    if !session.history.is_empty() {
        return String::new();
    }
    let greeting = templates::pick(&mut session.rng, templates::GREETINGS).to_string();
    session.push_assistant(&greeting, ReplyKind::Other);
    greeting
}

/// Clear the session and confirm it to the user.
pub fn reset(session: &mut ChatSession) -> String {
    session.clear();
    tracing::info!("session reset");
    templates::RESET_MESSAGE.to_string()
}

/// One dialogue turn. Never fails: anything unexpected inside the turn is
/// caught here and turned into a generic retry prompt.
pub async fn process_message(
    state: &Arc<AppState>,
    session: &mut ChatSession,
    text: &str,
) -> Vec<String> {
    match run_turn(state, session, text).await {
        Ok(replies) => replies,
        Err(e) => {
            tracing::error!(error = %e, "turn failed");
            vec![templates::GENERIC_RETRY.to_string()]
        }
    }
}

async fn run_turn(
    state: &Arc<AppState>,
    session: &mut ChatSession,
    text: &str,
) -> anyhow::Result<Vec<String>> {
    let text = text.trim();
    session.push_user(text);

    if text.is_empty() {
        return Ok(vec![templates::STILL_THERE.to_string()]);
    }

    tracing::info!(state = session.state.as_str(), "processing message");

    if let Some((reply, kind)) = small_talk_reply(session, text) {
        session.push_assistant(&reply, kind);
        return Ok(vec![reply]);
    }

    if session.state == SessionState::AwaitingConfirmation {
        return handle_confirmation(state, session, text).await;
    }

    let prior = &session.history[..session.history.len() - 1];
    let partial =
        extraction::extract_booking(state.llm.as_ref(), prior, text, session.reference_date).await;
    tracing::debug!(extracted = ?partial, "merged extraction");

    if let Some(message) = session.record.merge(&partial, session.reference_date) {
        session.push_assistant(&message, ReplyKind::Error);
        return Ok(vec![message]);
    }

    if session.record.is_complete() {
        session.state = SessionState::AwaitingConfirmation;
        let summary = session.record.summary();
        let prompt = templates::summary_prompt(&mut session.rng, &summary);
        session.push_assistant(&prompt, ReplyKind::Question);
        return Ok(vec![prompt]);
    }

    let reply = next_question(session);
    session.push_assistant(&reply, ReplyKind::Question);
    Ok(vec![reply])
}

/// Question for the highest-priority missing field, with a short
/// acknowledgment unless the previous assistant turn was already a question
/// or an error message.
fn next_question(session: &mut ChatSession) -> String {
    let field = match session.record.next_missing() {
        Some(field) => field,
        None => return templates::CONFIRM_REPROMPT.to_string(),
    };
    let question = templates::question_for(&mut session.rng, field);
    match session.last_reply_kind {
        ReplyKind::Question | ReplyKind::Error => question,
        ReplyKind::Other => format!(
            "{} {}",
            templates::pick(&mut session.rng, templates::ACKNOWLEDGMENTS),
            question
        ),
    }
}

/// Greeting/thanks/farewell handling. Matched turns skip extraction; the
/// reply chains the next missing-field question only when collection is
/// already underway and we did not just ask one.
fn small_talk_reply(session: &mut ChatSession, text: &str) -> Option<(String, ReplyKind)> {
    let lower = text.to_lowercase();

    let set = if ["hi", "hello", "hey"].iter().any(|w| contains_word(&lower, w)) {
        templates::GREETING_REPLIES
    } else if lower.contains("how are you") {
        templates::HOW_ARE_YOU_REPLIES
    } else if lower.contains("thank") {
        templates::THANKS_REPLIES
    } else if contains_word(&lower, "bye") || lower.contains("goodbye") {
        templates::FAREWELL_REPLIES
    } else {
        return None;
    };

    let mut reply = templates::pick(&mut session.rng, set).to_string();
    let mut kind = ReplyKind::Other;

    let partially_filled =
        session.record != BookingRecord::default() && !session.record.is_complete();
    if partially_filled && session.last_reply_kind != ReplyKind::Question {
        if let Some(field) = session.record.next_missing() {
            let question = templates::question_for(&mut session.rng, field);
            reply.push(' ');
            reply.push_str(&question);
            kind = ReplyKind::Question;
        }
    }

    Some((reply, kind))
}

/// Interpret the user's reply to the summary-and-confirm prompt.
async fn handle_confirmation(
    state: &Arc<AppState>,
    session: &mut ChatSession,
    text: &str,
) -> anyhow::Result<Vec<String>> {
    let lower = text.to_lowercase();

    if AFFIRMATIVE.iter().any(|w| contains_word(&lower, w)) {
        let outcome = finalize::confirm_booking(state, session).await;
        if outcome.saved {
            session.clear();
        } else {
            for message in &outcome.messages {
                session.push_assistant(message, ReplyKind::Error);
            }
        }
        return Ok(outcome.messages);
    }

    if NEGATIVE.iter().any(|w| contains_word(&lower, w)) {
        let field = extraction::classify_change(state.llm.as_ref(), text).await;
        tracing::info!(field = ?field, "change request classified");

        match field {
            ChangeField::Destination => session.record.destination = None,
            ChangeField::CheckIn | ChangeField::Dates => {
                session.record.check_in = None;
                session.record.check_out = None;
            }
            ChangeField::CheckOut => session.record.check_out = None,
            ChangeField::Guests => session.record.guests = None,
            ChangeField::Unknown => {}
        }

        session.state = SessionState::CollectingInfo;
        let reply = templates::change_prompt(field)
            .unwrap_or(templates::CHANGE_FALLBACK)
            .to_string();
        session.push_assistant(&reply, ReplyKind::Question);
        return Ok(vec![reply]);
    }

    let reply = templates::CONFIRM_REPROMPT.to_string();
    session.push_assistant(&reply, ReplyKind::Question);
    Ok(vec![reply])
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}
