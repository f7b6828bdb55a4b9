pub mod ai_match;
pub mod health;
pub mod matches;
pub mod notifications;
