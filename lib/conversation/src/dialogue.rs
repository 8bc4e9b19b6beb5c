//! Finite-state dialogue engine.
//!
//! The engine walks a clinic triage conversation:
//!
//! ```text
//! Greeting -> SymptomCheck -> TriageOptions -> Scheduling -> Faq -> Goodbye
//! ```
//!
//! `Faq` is a hub reachable from `SymptomCheck`, `TriageOptions`,
//! `Scheduling` and itself; `Goodbye` is terminal. Every input produces a
//! reply, unrecognized input included.

use crate::faq;
use crate::tokenizer::{RecognizedSet, Tokenizer};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker a responder reply carries when the conversation is over.
pub const TERMINAL_MARKER: &str = "GOODBYE";

const SYMPTOM_VOCABULARY: &[&str] = &[
    "sore",
    "throat",
    "fever",
    "cough",
    "dizzy",
    "pain",
    "headache",
    "backache",
    "infection",
    "cold",
    "chills",
];

// "am" is listed but absent from the clinic lexicon, so it never matches.
const TIME_VOCABULARY: &[&str] = &[
    "tomorrow",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "afternoon",
    "morning",
    "evening",
    "2",
    "3",
    "4",
    "pm",
    "am",
    "next",
];

const WELCOME: &str = "Hello! I'm Kodi, your Robocop Medical Center assistant. \
     How can I help you? Could you describe your main symptom?";
const ASK_TO_GREET: &str = "Hello! Please say hi or hello so we can begin.";
const UNCLEAR_SYMPTOM: &str =
    "I'm not sure I understand your symptom. Could you describe it more clearly?";
const ADVICE: &str = "For minor symptoms, rest and hydration can help. \
     If you have severe issues, we recommend seeing a doctor. \
     Anything else you'd like to know?";
const ASK_WHEN: &str = "Great! When are you available for an appointment?";
const NO_WORRIES: &str = "No worries. Is there anything else you'd like? \
     You could ask about hours or insurance, or schedule later.";
const UNCLEAR_TRIAGE: &str =
    "I'm not sure what you mean. Would you like an appointment or just advice?";
const ASK_DAY_OR_TIME: &str = "Please specify a day or time (e.g., 'tomorrow at 2 PM').";

/// Returns true if `text` contains the terminal marker, ignoring case.
#[must_use]
pub fn contains_terminal_marker(text: &str) -> bool {
    text.to_uppercase().contains(TERMINAL_MARKER)
}

/// Conversation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    /// Waiting for the patient to say anything.
    #[default]
    Greeting,
    /// Asking for the main symptom.
    SymptomCheck,
    /// Offering an appointment or advice.
    TriageOptions,
    /// Collecting an appointment time.
    Scheduling,
    /// Answering questions about hours, insurance and scheduling.
    Faq,
    /// Conversation is over.
    Goodbye,
}

impl DialogueState {
    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Goodbye)
    }
}

/// Slots and state collected during one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Current state.
    pub state: DialogueState,
    /// Appointment time, verbatim as the patient typed it.
    pub appointment_time: Option<String>,
    /// Symptom captured during the symptom check.
    pub symptom: Option<String>,
}

impl ConversationContext {
    /// Creates an empty context in the given state.
    #[must_use]
    pub fn in_state(state: DialogueState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}

/// Drives one conversation from greeting to goodbye.
///
/// An engine owns its context; start a new engine for a new conversation.
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    tokenizer: Tokenizer,
    context: ConversationContext,
}

impl DialogueEngine {
    /// Creates an engine in the greeting state.
    #[must_use]
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self::with_context(tokenizer, ConversationContext::default())
    }

    /// Creates an engine resuming from an existing context.
    #[must_use]
    pub fn with_context(tokenizer: Tokenizer, context: ConversationContext) -> Self {
        Self { tokenizer, context }
    }

    /// Returns the conversation context.
    #[must_use]
    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Consumes the engine, returning its context.
    #[must_use]
    pub fn into_context(self) -> ConversationContext {
        self.context
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> DialogueState {
        self.context.state
    }

    /// Returns true once the conversation has reached goodbye.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.context.state.is_terminal()
    }

    /// Computes the reply to one patient message, advancing the state.
    pub fn respond(&mut self, raw_text: &str) -> String {
        let recognized = self.tokenizer.recognize(raw_text);
        let from = self.context.state;

        let reply = match from {
            DialogueState::Greeting => self.greet(raw_text),
            DialogueState::SymptomCheck => self.check_symptom(&recognized),
            DialogueState::TriageOptions => self.triage(raw_text, &recognized),
            DialogueState::Scheduling => self.schedule(raw_text, &recognized),
            DialogueState::Faq => faq::answer(&mut self.context, &recognized),
            DialogueState::Goodbye => TERMINAL_MARKER.to_string(),
        };

        if self.context.state != from {
            debug!(from = ?from, to = ?self.context.state, "dialogue transition");
        }
        reply
    }

    fn greet(&mut self, raw_text: &str) -> String {
        if raw_text.trim().is_empty() {
            return ASK_TO_GREET.to_string();
        }
        self.context.state = DialogueState::SymptomCheck;
        WELCOME.to_string()
    }

    fn check_symptom(&mut self, recognized: &RecognizedSet) -> String {
        if let Some(symptom) = recognized.first_of(SYMPTOM_VOCABULARY) {
            self.context.symptom = Some(symptom.to_string());
            self.context.state = DialogueState::TriageOptions;
            return format!(
                "Sorry to hear you have {symptom}. \
                 Would you like me to schedule an appointment or offer basic advice?"
            );
        }

        if recognized.contains_any(&["hours", "insurance"]) {
            self.context.state = DialogueState::Faq;
            return faq::answer(&mut self.context, recognized);
        }

        UNCLEAR_SYMPTOM.to_string()
    }

    fn triage(&mut self, raw_text: &str, recognized: &RecognizedSet) -> String {
        // "advice" is not a lexicon token, so it is matched on the raw text.
        let (next, reply) = if recognized.contains_any(faq::SCHEDULE_TOKENS) {
            (DialogueState::Scheduling, faq::ASK_AVAILABILITY)
        } else if raw_text.to_lowercase().contains("advice") {
            (DialogueState::Faq, ADVICE)
        } else if recognized.contains("yes") {
            (DialogueState::Scheduling, ASK_WHEN)
        } else if recognized.contains("no") {
            (DialogueState::Faq, NO_WORRIES)
        } else {
            (DialogueState::TriageOptions, UNCLEAR_TRIAGE)
        };
        self.context.state = next;
        reply.to_string()
    }

    fn schedule(&mut self, raw_text: &str, recognized: &RecognizedSet) -> String {
        if !recognized.contains_any(TIME_VOCABULARY) {
            return ASK_DAY_OR_TIME.to_string();
        }
        self.context.appointment_time = Some(raw_text.to_string());
        self.context.state = DialogueState::Faq;
        format!(
            "Your appointment is set for '{raw_text}'. Anything else I can help you with? \
             (Type 'hours' or 'insurance' or 'schedule')"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_in(state: DialogueState) -> DialogueEngine {
        DialogueEngine::with_context(Tokenizer::default(), ConversationContext::in_state(state))
    }

    #[test]
    fn full_conversation() {
        let mut engine = DialogueEngine::default();
        assert_eq!(engine.state(), DialogueState::Greeting);

        let reply = engine.respond("hi");
        assert_eq!(engine.state(), DialogueState::SymptomCheck);
        assert!(reply.contains("How can I help"));

        let reply = engine.respond("I have a sore throat");
        assert_eq!(engine.state(), DialogueState::TriageOptions);
        let symptom = engine.context().symptom.clone().expect("symptom captured");
        assert!(symptom == "sore" || symptom == "throat");
        assert!(reply.contains(&symptom));

        engine.respond("schedule");
        assert_eq!(engine.state(), DialogueState::Scheduling);

        let reply = engine.respond("tomorrow at 2 pm");
        assert_eq!(engine.state(), DialogueState::Faq);
        assert_eq!(
            engine.context().appointment_time.as_deref(),
            Some("tomorrow at 2 pm")
        );
        assert!(reply.contains("tomorrow at 2 pm"));

        let reply = engine.respond("bye");
        assert_eq!(engine.state(), DialogueState::Goodbye);
        assert!(reply.contains("GOODBYE"));
        assert!(engine.is_finished());
    }

    #[test]
    fn greeting_accepts_unrecognized_text() {
        let mut engine = DialogueEngine::default();
        engine.respond("yo there");
        assert_eq!(engine.state(), DialogueState::SymptomCheck);
    }

    #[test]
    fn greeting_waits_on_blank_input() {
        let mut engine = DialogueEngine::default();
        assert_eq!(engine.respond("   "), ASK_TO_GREET);
        assert_eq!(engine.state(), DialogueState::Greeting);
    }

    #[test]
    fn symptom_check_clarifies_unknown_input() {
        let mut engine = engine_in(DialogueState::SymptomCheck);
        assert_eq!(engine.respond("my elbow is weird"), UNCLEAR_SYMPTOM);
        assert_eq!(engine.state(), DialogueState::SymptomCheck);
        assert!(engine.context().symptom.is_none());
    }

    #[test]
    fn symptom_check_can_jump_to_faq() {
        let mut engine = engine_in(DialogueState::SymptomCheck);
        let reply = engine.respond("What are your hours?");
        assert_eq!(engine.state(), DialogueState::Faq);
        assert_eq!(reply, faq::HOURS);
    }

    #[test]
    fn symptom_wins_over_faq_topics() {
        let mut engine = engine_in(DialogueState::SymptomCheck);
        engine.respond("fever, and is it covered by insurance?");
        assert_eq!(engine.state(), DialogueState::TriageOptions);
        assert_eq!(engine.context().symptom.as_deref(), Some("fever"));
    }

    #[test]
    fn triage_advice_is_substring_match() {
        let mut engine = engine_in(DialogueState::TriageOptions);
        assert_eq!(engine.respond("Some ADVICE please"), ADVICE);
        assert_eq!(engine.state(), DialogueState::Faq);

        let mut engine = engine_in(DialogueState::TriageOptions);
        engine.respond("any adviceplease");
        assert_eq!(engine.state(), DialogueState::Faq);
    }

    #[test]
    fn triage_schedule_beats_advice() {
        let mut engine = engine_in(DialogueState::TriageOptions);
        engine.respond("appointment, not advice");
        assert_eq!(engine.state(), DialogueState::Scheduling);
    }

    #[test]
    fn triage_yes_and_no() {
        let mut engine = engine_in(DialogueState::TriageOptions);
        assert_eq!(engine.respond("yes"), ASK_WHEN);
        assert_eq!(engine.state(), DialogueState::Scheduling);

        let mut engine = engine_in(DialogueState::TriageOptions);
        assert_eq!(engine.respond("no thanks"), NO_WORRIES);
        assert_eq!(engine.state(), DialogueState::Faq);
    }

    #[test]
    fn triage_disambiguates() {
        let mut engine = engine_in(DialogueState::TriageOptions);
        assert_eq!(engine.respond("hmm"), UNCLEAR_TRIAGE);
        assert_eq!(engine.state(), DialogueState::TriageOptions);
    }

    #[test]
    fn scheduling_needs_a_time_word() {
        let mut engine = engine_in(DialogueState::Scheduling);
        assert_eq!(engine.respond("whenever"), ASK_DAY_OR_TIME);
        assert_eq!(engine.state(), DialogueState::Scheduling);
        assert!(engine.context().appointment_time.is_none());

        // "am" is not a lexicon token.
        assert_eq!(engine.respond("10 am"), ASK_DAY_OR_TIME);

        engine.respond("Next Friday, 3pm");
        assert_eq!(engine.state(), DialogueState::Faq);
        assert_eq!(
            engine.context().appointment_time.as_deref(),
            Some("Next Friday, 3pm")
        );
    }

    #[test]
    fn faq_gibberish_is_idempotent() {
        let mut engine = engine_in(DialogueState::Faq);
        for _ in 0..3 {
            assert_eq!(engine.respond("zzzz qqq"), faq::MENU);
            assert_eq!(engine.state(), DialogueState::Faq);
        }
    }

    #[test]
    fn faq_can_reschedule() {
        let mut engine = engine_in(DialogueState::Faq);
        engine.respond("I need to schedule again");
        assert_eq!(engine.state(), DialogueState::Scheduling);
    }

    #[test]
    fn goodbye_is_terminal() {
        let mut engine = engine_in(DialogueState::Goodbye);
        for text in ["hi", "schedule", "", "hours"] {
            assert_eq!(engine.respond(text), TERMINAL_MARKER);
            assert_eq!(engine.state(), DialogueState::Goodbye);
        }
    }

    #[test]
    fn terminal_marker_is_case_insensitive() {
        assert!(contains_terminal_marker("ok, goodbye then"));
        assert!(contains_terminal_marker("GOODBYE"));
        assert!(!contains_terminal_marker("good bye"));
    }

    #[test]
    fn context_serde_roundtrip() {
        let mut engine = DialogueEngine::default();
        engine.respond("hello");
        engine.respond("bad cough");

        let json = serde_json::to_string(engine.context()).expect("serialize");
        assert!(json.contains("\"TRIAGE_OPTIONS\""));
        let parsed: ConversationContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(&parsed, engine.context());
    }
}
