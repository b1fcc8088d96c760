//! Enumerated reply templates. Phrasing is chosen with the session's seeded
//! RNG so conversations stay varied but reproducible under a fixed seed.

use rand::rngs::StdRng;
use rand::Rng;

use crate::models::MissingField;

pub const GREETINGS: &[&str] = &[
    "Hi there! I'm your friendly booking assistant. Ready to find you the perfect stay? 🌆",
    "Hello! I'm here to help with your hotel booking. Let's get started! 🏨",
    "Welcome! Where should we book your next adventure? 🌍",
];

pub const ACKNOWLEDGMENTS: &[&str] = &["Got it!", "Great!", "Perfect!", "Sounds good!"];

pub const STILL_THERE: &str = "Just checking - are you still there? 😊";

pub const RESET_MESSAGE: &str =
    "Booking and conversation history reset. How can I help you with your new booking?";

pub const CONFIRM_REPROMPT: &str =
    "Just to confirm: should I finalize this booking? (yes/no) 😊";

pub const GENERIC_RETRY: &str =
    "Sorry, something went wrong on my end. Could you say that again?";

pub const DESTINATION_QUESTIONS: &[&str] = &[
    "Where should we book your stay? 🌍",
    "Which city are you looking at? 🏙️",
    "Ready to pick a destination? ✈️",
];

pub const CHECK_IN_QUESTIONS: &[&str] = &[
    "When will you be arriving? 🗓️",
    "What's your check-in date? 📅",
    "When should we book your stay from?",
];

pub const CHECK_OUT_QUESTIONS: &[&str] = &[
    "And when will you be checking out? 📅",
    "What's your check-out date? 🏨",
    "Until when should we book the room?",
];

pub const GUEST_QUESTIONS: &[&str] = &[
    "How many people will be joining? 👨‍👩‍👧‍👦",
    "Number of guests? 😊",
    "How many travelers should we plan for? 🧳",
];

pub const SUMMARY_PROMPTS: &[&str] = &[
    "All set! Here's your plan: {summary}. Should I finalize this? 😊",
    "Let me confirm: {summary}. Does this look right? 👍",
    "Ready to book! 🎉 Your details: {summary}. Confirm?",
];

pub const SUCCESS_MESSAGES: &[&str] = &[
    "All set! Your booking is confirmed 🎉 Enjoy your stay in {destination}!",
    "Confirmed! 🎊 We're excited for your trip to {destination}!",
    "Booking saved! Have an amazing time in {destination}! 🌟",
];

pub const GREETING_REPLIES: &[&str] = &["Hello! 😊", "Hi there!", "Hey! Ready to book?"];

pub const HOW_ARE_YOU_REPLIES: &[&str] = &[
    "I'm great, thanks for asking! Ready to help with your booking.",
    "Doing well! Let's find you a great hotel.",
];

pub const THANKS_REPLIES: &[&str] = &["You're welcome! 😊", "My pleasure!", "Happy to help!"];

pub const FAREWELL_REPLIES: &[&str] = &[
    "Have a great day! 🌟",
    "Goodbye! Let me know if you need anything else.",
];

/// Pick one template from a non-empty set.
pub fn pick<'a>(rng: &mut StdRng, templates: &[&'a str]) -> &'a str {
    templates[rng.gen_range(0..templates.len())]
}

pub fn question_for(rng: &mut StdRng, field: MissingField) -> String {
    let set = match field {
        MissingField::Destination => DESTINATION_QUESTIONS,
        MissingField::CheckIn => CHECK_IN_QUESTIONS,
        MissingField::CheckOut => CHECK_OUT_QUESTIONS,
        MissingField::Guests => GUEST_QUESTIONS,
    };
    pick(rng, set).to_string()
}

pub fn summary_prompt(rng: &mut StdRng, summary: &str) -> String {
    pick(rng, SUMMARY_PROMPTS).replace("{summary}", summary)
}

pub fn success_message(rng: &mut StdRng, destination: &str) -> String {
    pick(rng, SUCCESS_MESSAGES).replace("{destination}", destination)
}

/// Follow-up question after the user asked to change a field. `None` for an
/// unclassifiable request; the caller falls back to the generic prompt.
pub fn change_prompt(field: crate::models::ChangeField) -> Option<&'static str> {
    use crate::models::ChangeField;
    match field {
        ChangeField::Destination => Some("No problem! Where would you like to go instead? 🌍"),
        ChangeField::CheckIn | ChangeField::Dates => {
            Some("Got it! What's the new check-in date? 🗓️")
        }
        ChangeField::CheckOut => Some("Sure! When would you like to check out? 📅"),
        ChangeField::Guests => Some("Okay! How many guests should we update to? 👨‍👩‍👧‍👦"),
        ChangeField::Unknown => None,
    }
}

pub const CHANGE_FALLBACK: &str =
    "What would you like to adjust? You can say 'destination', 'dates', or 'guests'.";
