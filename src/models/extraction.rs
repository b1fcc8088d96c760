use serde::{Deserialize, Serialize};

/// Best-effort partial booking produced by one extraction call.
///
/// Every field is independently optional; the LLM emits `null` for anything
/// it could not find. `guests` stays a raw JSON value because models return
/// it as either an integer or a numeric string — the validator decides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedBooking {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub guests: Option<serde_json::Value>,
}

impl ExtractedBooking {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.check_in.is_none()
            && self.check_out.is_none()
            && self.guests.is_none()
    }
}

/// Which field a user wants to change when declining a confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeField {
    Destination,
    CheckIn,
    CheckOut,
    Dates,
    Guests,
    Unknown,
}

impl ChangeField {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "destination" => ChangeField::Destination,
            "check_in" | "check-in" => ChangeField::CheckIn,
            "check_out" | "check-out" => ChangeField::CheckOut,
            "dates" => ChangeField::Dates,
            "guests" => ChangeField::Guests,
            _ => ChangeField::Unknown,
        }
    }
}
