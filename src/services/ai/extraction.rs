use chrono::NaiveDate;

use crate::models::{ChangeField, ChatMessage, ExtractedBooking};
use crate::services::ai::{LlmProvider, Message};

const EXTRACT_SYSTEM_PROMPT: &str = r#"You extract hotel booking details from a conversation. Today's date is {current_date}. Convert relative dates ("tomorrow", "next week", "March 5th-8th") to absolute YYYY-MM-DD dates using today as the anchor. An implicit check-out like "3 nights" means check_in plus 3 days.

Return ONLY valid JSON (no markdown, no explanation) with this exact structure:
{
  "destination": "city name or null",
  "check_in": "YYYY-MM-DD or null",
  "check_out": "YYYY-MM-DD or null",
  "guests": 2
}

Rules:
- Use null for anything not mentioned anywhere in the conversation.
- When a date range is given, check_in is the earliest date and check_out the latest.
- guests is an integer, or null if never mentioned.
- Never invent values."#;

const CLASSIFY_SYSTEM_PROMPT: &str = r#"A user was shown a hotel booking summary and wants to change something. Decide which field their message targets.

Return ONLY valid JSON: {"field": "destination" | "check_in" | "check_out" | "dates" | "guests" | "unknown"}

Use "dates" when both dates or an unspecified date are meant, and "unknown" when you cannot tell."#;

/// Ask the model for a structured partial booking. This never fails: any
/// transport or parse problem degrades to an all-absent record so the turn
/// simply extracts nothing.
pub async fn extract_booking(
    llm: &dyn LlmProvider,
    history: &[ChatMessage],
    latest_message: &str,
    reference_date: NaiveDate,
) -> ExtractedBooking {
    let mut messages: Vec<Message> = history
        .iter()
        .map(|m| Message {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();

    messages.push(Message {
        role: "user".to_string(),
        content: latest_message.to_string(),
    });

    let system = EXTRACT_SYSTEM_PROMPT.replace("{current_date}", &reference_date.to_string());

    let response = match llm.chat(&system, &messages).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "extraction call failed, treating as no update");
            return ExtractedBooking::default();
        }
    };

    match parse_extraction_response(&response) {
        Some(extracted) => extracted,
        None => {
            tracing::warn!("extraction response was not parseable JSON, treating as no update");
            ExtractedBooking::default()
        }
    }
}

/// One-shot classification of which field a change request targets.
/// Failures collapse to `Unknown`; the dialogue falls back to asking.
pub async fn classify_change(llm: &dyn LlmProvider, message: &str) -> ChangeField {
    let messages = [Message {
        role: "user".to_string(),
        content: message.to_string(),
    }];

    let response = match llm.chat(CLASSIFY_SYSTEM_PROMPT, &messages).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "change classification call failed");
            return ChangeField::Unknown;
        }
    };

    parse_change_response(&response)
}

/// Parse a model response into a partial booking: direct JSON first, then a
/// forgiving re-parse (strip markdown fences, scan for the outermost object).
fn parse_extraction_response(response: &str) -> Option<ExtractedBooking> {
    if let Ok(extracted) = serde_json::from_str::<ExtractedBooking>(response) {
        return Some(extracted);
    }

    let cleaned = strip_fences(response);
    if let Ok(extracted) = serde_json::from_str::<ExtractedBooking>(cleaned) {
        return Some(extracted);
    }

    let object = find_json_object(cleaned)?;
    serde_json::from_str::<ExtractedBooking>(object).ok()
}

fn parse_change_response(response: &str) -> ChangeField {
    let cleaned = strip_fences(response);

    if let Some(object) = find_json_object(cleaned) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(object) {
            if let Some(field) = value["field"].as_str() {
                return ChangeField::parse(field);
            }
        }
    }

    // Some models reply with the bare token despite the instructions.
    ChangeField::parse(cleaned)
}

fn strip_fences(response: &str) -> &str {
    let cleaned = response.trim();
    let cleaned = cleaned
        .strip_prefix("```json")
        .or_else(|| cleaned.strip_prefix("```"))
        .unwrap_or(cleaned);
    cleaned.strip_suffix("```").unwrap_or(cleaned).trim()
}

fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
