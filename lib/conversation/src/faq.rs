//! FAQ hub handler.
//!
//! The FAQ state is re-entrant: triage, scheduling and the symptom check all
//! land here, and from here a conversation can go back to scheduling or end.

use crate::dialogue::{ConversationContext, DialogueState};
use crate::tokenizer::RecognizedSet;

pub(crate) const SCHEDULE_TOKENS: &[&str] = &["appointment", "schedule"];
const FAREWELL_TOKENS: &[&str] = &["bye", "goodbye"];
const GRATITUDE_TOKENS: &[&str] = &["thank", "thanks"];

pub(crate) const ASK_AVAILABILITY: &str =
    "Let's schedule an appointment. When are you available (e.g., 'tomorrow at 2 PM')?";
pub(crate) const HOURS: &str = "We are open Monday to Friday, 8 AM to 5 PM. Anything else?";
pub(crate) const INSURANCE: &str =
    "We accept most major insurance providers. Any other questions?";
pub(crate) const FAREWELL: &str = "Thank you for choosing Robocop Medical Center. \
     Take care, and I hope you feel better soon. GOODBYE";
pub(crate) const YOURE_WELCOME: &str = "You're welcome! Anything else I can help you with?";
pub(crate) const MENU: &str = "You can ask about clinic hours, insurance, or say 'schedule' \
     if you want to book an appointment. What would you like to do?";

/// Answers a message in the FAQ hub.
///
/// Checks run in a fixed order and the first match wins: scheduling,
/// hours, insurance, farewell, gratitude, then the fallback menu. Only
/// scheduling and farewell leave the FAQ state.
pub(crate) fn answer(context: &mut ConversationContext, recognized: &RecognizedSet) -> String {
    let reply = if recognized.contains_any(SCHEDULE_TOKENS) {
        context.state = DialogueState::Scheduling;
        ASK_AVAILABILITY
    } else if recognized.contains("hours") {
        HOURS
    } else if recognized.contains("insurance") {
        INSURANCE
    } else if recognized.contains_any(FAREWELL_TOKENS) {
        context.state = DialogueState::Goodbye;
        FAREWELL
    } else if recognized.contains_any(GRATITUDE_TOKENS) {
        YOURE_WELCOME
    } else {
        MENU
    };
    reply.to_string()
}
