//! Conversation engine for the kodi responder.
//!
//! This crate provides:
//!
//! - **Lexicon**: Static token to category lookup table
//! - **Tokenizer**: Normalizes free text and picks out recognized tokens
//! - **Dialogue Engine**: Finite-state clinic triage conversation
//! - **FAQ handler**: Shared hub routine reachable from several states

pub mod dialogue;
mod faq;
pub mod lexicon;
pub mod tokenizer;

pub use dialogue::{ConversationContext, DialogueEngine, DialogueState, contains_terminal_marker};
pub use lexicon::{Category, Lexicon};
pub use tokenizer::{RecognizedSet, Tokenizer, tokenize};
