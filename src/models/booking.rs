use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::ExtractedBooking;
use crate::services::validation::{
    validate_date, validate_date_order, validate_guests, ValidationFailure,
};

/// The in-progress booking being assembled across turns. Fields are filled
/// one at a time (or in batches) as extraction succeeds and cleared on reset,
/// successful confirmation, or an explicit change request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingRecord {
    pub destination: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i64>,
}

impl BookingRecord {
    pub fn is_complete(&self) -> bool {
        self.destination.is_some()
            && self.check_in.is_some()
            && self.check_out.is_some()
            && self.guests.is_some()
    }

    pub fn clear(&mut self) {
        *self = BookingRecord::default();
    }

    /// The first field still missing, in the order we ask for them.
    pub fn next_missing(&self) -> Option<MissingField> {
        if self.destination.is_none() {
            Some(MissingField::Destination)
        } else if self.check_in.is_none() {
            Some(MissingField::CheckIn)
        } else if self.check_out.is_none() {
            Some(MissingField::CheckOut)
        } else if self.guests.is_none() {
            Some(MissingField::Guests)
        } else {
            None
        }
    }

    /// One-line summary used in the confirmation prompt. Only meaningful once
    /// the record is complete.
    pub fn summary(&self) -> String {
        format!(
            "a hotel in {} from {} to {} for {} guest(s)",
            self.destination.as_deref().unwrap_or("?"),
            self.check_in.map(|d| d.to_string()).unwrap_or_default(),
            self.check_out.map(|d| d.to_string()).unwrap_or_default(),
            self.guests.unwrap_or(0),
        )
    }

    /// Merge one turn's extraction into the record.
    ///
    /// Fields are considered in a fixed order (destination, guests, check-in,
    /// check-out) and at most one validation message is produced per turn:
    /// the first failure wins, and the check-out step is skipped entirely once
    /// a message exists since its prompt would contradict the earlier one.
    /// Returns the message for the caller to surface verbatim.
    pub fn merge(
        &mut self,
        partial: &ExtractedBooking,
        reference_date: NaiveDate,
    ) -> Option<String> {
        let mut message: Option<ValidationFailure> = None;

        if let Some(dest) = partial.destination.as_deref() {
            let dest = dest.trim();
            let differs = self
                .destination
                .as_deref()
                .map(|d| !d.eq_ignore_ascii_case(dest))
                .unwrap_or(true);
            if !dest.is_empty() && differs {
                self.destination = Some(dest.to_string());
            }
        }

        if let Some(raw) = partial.guests.as_ref() {
            match validate_guests(raw) {
                Ok(n) => {
                    if self.guests != Some(n) {
                        self.guests = Some(n);
                    }
                }
                Err(failure) => {
                    message.get_or_insert(failure);
                }
            }
        }

        if let Some(raw) = partial.check_in.as_deref() {
            let differs = self
                .check_in
                .map(|d| d.to_string() != raw.trim())
                .unwrap_or(true);
            if differs {
                match validate_date(raw, reference_date) {
                    Ok(new_check_in) => {
                        self.check_in = Some(new_check_in);
                        // A check-in change invalidates any stored check-out
                        // unless this same turn also carries a consistent one.
                        let simultaneous = partial
                            .check_out
                            .as_deref()
                            .and_then(|raw_out| validate_date(raw_out, reference_date).ok())
                            .filter(|&out| out > new_check_in);
                        self.check_out = simultaneous;
                    }
                    Err(failure) => {
                        message.get_or_insert(failure);
                    }
                }
            }
        }

        if message.is_none() {
            if let (Some(raw), Some(check_in)) = (partial.check_out.as_deref(), self.check_in) {
                let differs = self
                    .check_out
                    .map(|d| d.to_string() != raw.trim())
                    .unwrap_or(true);
                if differs {
                    match validate_date(raw, reference_date)
                        .and_then(|out| validate_date_order(check_in, out).map(|_| out))
                    {
                        Ok(out) => self.check_out = Some(out),
                        Err(failure) => {
                            message = Some(failure);
                        }
                    }
                }
            }
        }

        message.map(|m| m.to_string())
    }
}

/// The next field to ask for, in collection priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingField {
    Destination,
    CheckIn,
    CheckOut,
    Guests,
}

/// A persisted booking row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
    pub created_at: NaiveDateTime,
}
