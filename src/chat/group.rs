//! The conversation loop.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::events::{ChatEventEmitter, ChatEventPayload, ChatEventSink};
use super::fallback::{empty_view_reply, fallback_reply};
use super::filter::filter_history;
use super::selector::select_next_speaker;
use super::termination::{approval_predicate, ReviewVerdict, TerminationPredicate};
use crate::agent::{AgentRoster, Turn};
use crate::types::{AgentName, Message, Usage};

pub const DEFAULT_MAX_ROUND: u32 = 20;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The selector had nobody left to pick.
    SelectorEnded,
    /// The termination predicate matched a reply.
    Terminated,
    /// `max_round` turns were taken.
    RoundCap,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub messages: Vec<Message>,
    /// Agent turns taken; a tool-using turn counts once.
    pub rounds: u32,
    pub stop_reason: StopReason,
    /// Last verdict the reviewer gave, if it spoke.
    pub verdict: Option<ReviewVerdict>,
    pub fallbacks: u32,
    pub usage: Usage,
}

/// Runs agents in turn over a shared, append-only history.
pub struct GroupChat {
    roster: AgentRoster,
    max_round: u32,
    termination: TerminationPredicate,
    event_sink: Option<ChatEventSink>,
}

impl GroupChat {
    pub fn new(roster: AgentRoster) -> Self {
        Self {
            roster,
            max_round: DEFAULT_MAX_ROUND,
            termination: approval_predicate(),
            event_sink: None,
        }
    }

    pub fn with_max_round(mut self, max_round: u32) -> Self {
        self.max_round = max_round;
        self
    }

    pub fn with_termination(mut self, predicate: TerminationPredicate) -> Self {
        self.termination = predicate;
        self
    }

    pub fn with_event_sink(mut self, sink: ChatEventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn max_round(&self) -> u32 {
        self.max_round
    }

    /// Run one exchange starting from `seed`.
    ///
    /// Never fails: an agent error is replaced by that role's fallback reply
    /// and the loop carries on.
    pub async fn run(&self, seed: Message) -> Transcript {
        let emitter = ChatEventEmitter::new(self.event_sink.clone());
        emitter.emit(ChatEventPayload::Started {
            seed: seed.content.clone(),
        });
        info!(max_round = self.max_round, "group chat started");

        let mut history = vec![seed];
        let mut last = Some(AgentName::UserProxy);
        let mut rounds = 0;
        let mut stop_reason = StopReason::RoundCap;
        let mut verdict = None;
        let mut fallbacks = 0;
        let mut usage = Usage::default();

        while rounds < self.max_round {
            let Some(next) = select_next_speaker(last, &history) else {
                stop_reason = StopReason::SelectorEnded;
                break;
            };
            emitter.emit(ChatEventPayload::SpeakerSelected {
                agent: next,
                round: rounds,
            });

            let view = filter_history(&history);
            let turn = if view.is_empty() {
                debug!(agent = %next, "empty view, using canned reply");
                Turn::reply(empty_view_reply(next))
            } else {
                match self.roster.get(next).generate_reply(&view).await {
                    Ok(turn) => turn,
                    Err(err) => {
                        warn!(agent = %next, error = %err, "generation failed, using fallback");
                        emitter.emit(ChatEventPayload::FallbackUsed {
                            agent: next,
                            error: err.to_string(),
                        });
                        fallbacks += 1;
                        Turn::reply(fallback_reply(next, &history))
                    }
                }
            };

            usage.merge(&turn.usage);
            let reply = turn.reply.clone();
            for message in turn.into_messages() {
                debug!(agent = %next, chars = message.content.len(), "message appended");
                emitter.emit(ChatEventPayload::MessageAppended {
                    message: message.clone(),
                });
                history.push(message);
            }
            last = Some(next);
            rounds += 1;

            if next == AgentName::Reviewer {
                let parsed = ReviewVerdict::parse(&reply.content);
                if let ReviewVerdict::NeedsRevision(reason) = &parsed {
                    // TODO: send NEEDS_REVISION back to the planner once a second pass is wanted.
                    warn!(%reason, "reviewer requested a revision; ending without re-planning");
                }
                verdict = Some(parsed);
            }

            if (self.termination)(&reply) {
                stop_reason = StopReason::Terminated;
                break;
            }
        }

        info!(rounds, ?stop_reason, fallbacks, "group chat finished");
        emitter.emit(ChatEventPayload::Finished { stop_reason, rounds });

        Transcript {
            messages: history,
            rounds,
            stop_reason,
            verdict,
            fallbacks,
            usage,
        }
    }
}

impl std::fmt::Debug for GroupChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupChat")
            .field("roster", &self.roster)
            .field("max_round", &self.max_round)
            .finish()
    }
}
