pub mod booking;
pub mod conversation;
pub mod extraction;

pub use booking::{Booking, BookingRecord, MissingField};
pub use conversation::{ChatMessage, ChatSession, ReplyKind, SessionState};
pub use extraction::{ChangeField, ExtractedBooking};
