//! Lexicon of tokens the responder recognizes.
//!
//! The lexicon is a plain mapping from a normalized token to a semantic
//! [`Category`]. Building one from a list keeps the last entry for a
//! repeated token.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Semantic tag attached to a lexicon entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Greeting,
    Request,
    Affirmation,
    Negation,
    Symptom,
    Noun,
    Verb,
    Time,
    Role,
    Adjective,
    Gratitude,
    Farewell,
    Brand,
    Number,
}

/// Entries of the stock clinic lexicon, in declaration order.
///
/// `open` appears twice; the later entry wins.
const CLINIC_ENTRIES: &[(&str, Category)] = &[
    ("hello", Category::Greeting),
    ("hi", Category::Greeting),
    ("hey", Category::Greeting),
    ("help", Category::Request),
    ("yes", Category::Affirmation),
    ("no", Category::Negation),
    ("sore", Category::Symptom),
    ("throat", Category::Symptom),
    ("fever", Category::Symptom),
    ("cough", Category::Symptom),
    ("dizzy", Category::Symptom),
    ("appointment", Category::Noun),
    ("schedule", Category::Verb),
    ("tomorrow", Category::Time),
    ("day", Category::Time),
    ("next", Category::Time),
    ("week", Category::Time),
    ("doctor", Category::Role),
    ("general", Category::Adjective),
    ("practitioner", Category::Role),
    ("insurance", Category::Noun),
    ("hours", Category::Noun),
    ("monday", Category::Time),
    ("tuesday", Category::Time),
    ("wednesday", Category::Time),
    ("thursday", Category::Time),
    ("friday", Category::Time),
    ("saturday", Category::Time),
    ("sunday", Category::Time),
    ("morning", Category::Time),
    ("afternoon", Category::Time),
    ("evening", Category::Time),
    ("thank", Category::Gratitude),
    ("thanks", Category::Gratitude),
    ("bye", Category::Farewell),
    ("goodbye", Category::Farewell),
    ("robocop", Category::Brand),
    ("medical", Category::Adjective),
    ("center", Category::Noun),
    ("feeling", Category::Verb),
    ("better", Category::Adjective),
    ("open", Category::Verb),
    ("night", Category::Time),
    ("pain", Category::Symptom),
    ("headache", Category::Symptom),
    ("backache", Category::Symptom),
    ("infection", Category::Symptom),
    ("cold", Category::Symptom),
    ("chills", Category::Symptom),
    ("scheduling", Category::Noun),
    ("clinic", Category::Noun),
    ("pharmacy", Category::Noun),
    ("refill", Category::Noun),
    ("reminder", Category::Noun),
    ("prescription", Category::Noun),
    ("blood", Category::Noun),
    ("pressure", Category::Noun),
    ("diabetes", Category::Noun),
    ("heart", Category::Noun),
    ("specialist", Category::Role),
    ("checkup", Category::Noun),
    ("test", Category::Noun),
    ("results", Category::Noun),
    ("open", Category::Verb),
    ("closed", Category::Adjective),
    ("cardiology", Category::Noun),
    ("dermatology", Category::Noun),
    ("optometry", Category::Noun),
    ("zero", Category::Number),
    ("one", Category::Number),
    ("two", Category::Number),
    ("three", Category::Number),
    ("four", Category::Number),
    ("five", Category::Number),
    ("six", Category::Number),
    ("seven", Category::Number),
    ("eight", Category::Number),
    ("nine", Category::Number),
    ("ten", Category::Number),
    ("2", Category::Number),
    ("3", Category::Number),
    ("4", Category::Number),
    ("pm", Category::Time),
];

/// Token to category lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    entries: HashMap<String, Category>,
}

impl Lexicon {
    /// Creates an empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the stock Robocop Medical Center lexicon.
    #[must_use]
    pub fn clinic() -> Self {
        Self::from_entries(CLINIC_ENTRIES.iter().copied())
    }

    /// Builds a lexicon from `(token, category)` pairs.
    ///
    /// Tokens are lower-cased on insert. A repeated token keeps the last
    /// category seen.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Category)>) -> Self {
        let mut lexicon = Self::new();
        for (token, category) in entries {
            lexicon.insert(token, category);
        }
        lexicon
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, token: impl Into<String>, category: Category) {
        self.entries.insert(token.into().to_lowercase(), category);
    }

    /// Returns the category of a normalized token.
    #[must_use]
    pub fn category(&self, token: &str) -> Option<Category> {
        self.entries.get(token).copied()
    }

    /// Returns true if the normalized token is in the lexicon.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Returns the number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the lexicon is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
