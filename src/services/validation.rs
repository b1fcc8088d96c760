use chrono::NaiveDate;

/// A rejected field value. The `Display` text is the corrective prompt shown
/// to the user verbatim, so keep it conversational.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Hmm, I couldn't read that date. Could you give it as YYYY-MM-DD?")]
    BadFormat,

    #[error("That check-in date has already passed. When would you like to arrive?")]
    PastDate,

    #[error("The check-out date must be after the check-in date ({0}). When would you like to check out?")]
    DateOrder(NaiveDate),

    #[error("The number of guests must be at least 1. How many people are staying?")]
    NonPositiveGuests,

    #[error("I need the guest count as a number. How many people are staying?")]
    NotANumber,
}

/// Strict date parse against the session's reference "today". Ambiguous
/// formats are rejected, never guessed.
pub fn validate_date(raw: &str, reference_date: NaiveDate) -> Result<NaiveDate, ValidationFailure> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationFailure::BadFormat)?;
    if date < reference_date {
        return Err(ValidationFailure::PastDate);
    }
    Ok(date)
}

pub fn validate_date_order(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ValidationFailure> {
    if check_out <= check_in {
        return Err(ValidationFailure::DateOrder(check_in));
    }
    Ok(())
}

/// Guest counts arrive from the LLM as a JSON integer or a numeric string.
pub fn validate_guests(raw: &serde_json::Value) -> Result<i64, ValidationFailure> {
    let n = match raw {
        serde_json::Value::Number(n) => n.as_i64().ok_or(ValidationFailure::NotANumber)?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationFailure::NotANumber)?,
        _ => return Err(ValidationFailure::NotANumber),
    };
    if n < 1 {
        return Err(ValidationFailure::NonPositiveGuests);
    }
    Ok(n)
}
