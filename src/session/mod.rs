//! Text and voice front ends around the group chat.

pub mod answer;
pub mod orchestrator;
pub mod text;
pub mod voice;

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use answer::{extract_answer, NO_ANSWER};
pub use orchestrator::{Exchange, Orchestrator, APOLOGY};
pub use text::TextSession;
pub use voice::VoiceSession;

/// Turns one user utterance into one reply.
#[async_trait]
pub trait ExchangeHandler: Send + Sync {
    async fn handle(&self, user_text: &str) -> String;
}

/// Why a session loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    ExitCommand,
    EndOfInput,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub exchanges: usize,
    pub end: SessionEnd,
}

static EXIT_RE: OnceLock<Regex> = OnceLock::new();
static FAREWELL_RE: OnceLock<Regex> = OnceLock::new();

/// A typed line that is exactly an exit word.
pub fn is_exit_command(text: &str) -> bool {
    EXIT_RE
        .get_or_init(|| Regex::new(r"^(?i:exit|quit|退出)[.!。！]?$").expect("exit regex must compile"))
        .is_match(text.trim())
}

/// A spoken sentence containing a farewell anywhere.
pub fn is_farewell(text: &str) -> bool {
    FAREWELL_RE
        .get_or_init(|| {
            Regex::new(r"(?i)\b(exit|goodbye)\b|退出|再见|拜拜").expect("farewell regex must compile")
        })
        .is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_match_whole_lines_only() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT "));
        assert!(is_exit_command("退出"));
        assert!(!is_exit_command("how do I exit vim"));
    }

    #[test]
    fn farewells_match_inside_sentences() {
        assert!(is_farewell("OK, goodbye!"));
        assert!(is_farewell("好的再见"));
        assert!(is_farewell("拜拜"));
        assert!(!is_farewell("what is the exchange rate"));
        assert!(!is_farewell("exiting the highway"));
    }
}
