//! Chat turns over `GameState`.
//!
//! Sending appends the user turn and hands back the reply stream; each
//! fragment read from it is folded into the transcript with
//! [`apply_fragment`].

use recovery_core::{ChatTurn, GameState, Role};
use std::sync::Arc;

use crate::generator::{FragmentStream, TextGenerator};

/// Prefix of a user turn that describes a sensation.
pub const SENSATION_PREFIX: &str = "He sentido: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Coaching,
    SensationAnalysis,
}

/// The user-turn text for a described sensation.
pub fn sensation_message(description: &str) -> String {
    format!("{}\"{}\"", SENSATION_PREFIX, description.trim())
}

/// The bare description inside a sensation turn.
pub fn sensation_description(text: &str) -> &str {
    let inner = text.strip_prefix(SENSATION_PREFIX).unwrap_or(text).trim();
    inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(inner)
}

pub struct ChatOrchestrator {
    generator: Arc<dyn TextGenerator>,
}

impl ChatOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Append the user turn and request the reply. Coaching replies see the
    /// transcript as it was before this turn; sensation analysis sees only
    /// the description.
    pub async fn send_message(
        &self,
        state: &GameState,
        text: &str,
        kind: MessageKind,
    ) -> (GameState, FragmentStream) {
        let stream = match kind {
            MessageKind::Coaching => {
                self.generator
                    .continue_conversation(&state.chat_history, text)
                    .await
            }
            MessageKind::SensationAnalysis => {
                self.generator
                    .analyze_sensation(sensation_description(text))
                    .await
            }
        };

        let mut next = state.clone();
        next.chat_history.push(ChatTurn::user(text));
        (next, stream)
    }
}

/// Fold one cumulative fragment into the transcript. The first fragment of
/// a reply opens a new assistant turn; later ones replace its text.
pub fn apply_fragment(state: &GameState, fragment: &str, first: bool) -> GameState {
    let mut next = state.clone();
    match next.chat_history.last_mut() {
        Some(last) if !first && last.role == Role::Assistant => {
            last.text = fragment.to_string();
        }
        _ => next.chat_history.push(ChatTurn::assistant(fragment)),
    }
    next
}
