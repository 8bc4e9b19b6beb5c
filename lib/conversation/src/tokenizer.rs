//! Tokenization and lexicon recognition.
//!
//! Free text is lower-cased and split on every run of characters that are
//! not ASCII letters or digits. Tokens found in the [`Lexicon`] form the
//! [`RecognizedSet`] the dialogue engine dispatches on.

use crate::lexicon::Lexicon;
use std::collections::HashSet;

/// Splits text into normalized tokens.
///
/// Every returned token is non-empty, lower-case and ASCII alphanumeric.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokens of one message that are present in the lexicon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedSet {
    tokens: HashSet<String>,
}

impl RecognizedSet {
    /// Returns true if `token` was recognized.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Returns true if any of `candidates` was recognized.
    #[must_use]
    pub fn contains_any(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| self.tokens.contains(*c))
    }

    /// Returns the first of `candidates`, in slice order, that was recognized.
    #[must_use]
    pub fn first_of<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.tokens.contains(*c))
    }

    /// Returns the number of recognized tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns whether nothing was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Classifies message tokens against a lexicon.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lexicon: Lexicon,
}

impl Tokenizer {
    /// Creates a tokenizer over the given lexicon.
    #[must_use]
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Tokenizes `text` and keeps the tokens the lexicon knows.
    #[must_use]
    pub fn recognize(&self, text: &str) -> RecognizedSet {
        let tokens = tokenize(text)
            .into_iter()
            .filter(|token| self.lexicon.contains(token))
            .collect();
        RecognizedSet { tokens }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Lexicon::clinic())
    }
}
