//! Round termination and the reviewer's verdict.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{AgentName, Message, APPROVED, NEEDS_REVISION};

/// Decides whether the latest message closes the round.
pub type TerminationPredicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// What the reviewer concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum ReviewVerdict {
    Approved,
    NeedsRevision(String),
    Unclear,
}

impl ReviewVerdict {
    /// A revision request wins over a stray approval marker.
    pub fn parse(text: &str) -> Self {
        if let Some(idx) = text.find(NEEDS_REVISION) {
            let reason = text[idx + NEEDS_REVISION.len()..]
                .trim_start_matches([':', '：', ' '])
                .trim();
            return Self::NeedsRevision(reason.to_string());
        }
        if text.contains(APPROVED) {
            Self::Approved
        } else {
            Self::Unclear
        }
    }

    /// The verdict carried by `msg`, if the reviewer wrote it.
    pub fn of(msg: &Message) -> Option<Self> {
        msg.is_from(AgentName::Reviewer).then(|| Self::parse(&msg.content))
    }
}

/// Reviewer message carrying an approval.
pub fn is_approval(msg: &Message) -> bool {
    ReviewVerdict::of(msg) == Some(ReviewVerdict::Approved)
}

/// Default predicate: stop on reviewer approval.
pub fn approval_predicate() -> TerminationPredicate {
    Arc::new(is_approval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verdicts() {
        assert_eq!(ReviewVerdict::parse("Looks right. APPROVED"), ReviewVerdict::Approved);
        assert_eq!(
            ReviewVerdict::parse("NEEDS_REVISION: missing the temperature"),
            ReviewVerdict::NeedsRevision("missing the temperature".into())
        );
        assert_eq!(ReviewVerdict::parse("hmm"), ReviewVerdict::Unclear);
    }

    #[test]
    fn only_reviewer_approval_terminates() {
        assert!(is_approval(&Message::assistant(AgentName::Reviewer, "APPROVED")));
        assert!(!is_approval(&Message::assistant(AgentName::Summarizer, "APPROVED")));
        assert!(!is_approval(&Message::assistant(
            AgentName::Reviewer,
            "NEEDS_REVISION: not APPROVED yet"
        )));
    }
}
