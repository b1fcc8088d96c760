pub mod ai;
pub mod dialogue;
pub mod finalize;
pub mod notify;
pub mod templates;
pub mod validation;
pub mod weather;
