//! Group chat: speaker selection, history filtering and the turn loop.

pub mod events;
pub mod fallback;
pub mod filter;
pub mod group;
pub mod selector;
pub mod termination;

pub use events::{ChatEvent, ChatEventPayload, ChatEventSink};
pub use filter::filter_history;
pub use group::{GroupChat, StopReason, Transcript, DEFAULT_MAX_ROUND};
pub use selector::select_next_speaker;
pub use termination::{approval_predicate, ReviewVerdict, TerminationPredicate};
