//! Structured events emitted while a group chat runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::StopReason;
use crate::types::{AgentName, Message};

pub type ExchangeId = Uuid;

/// Callback receiving chat events.
pub type ChatEventSink = Arc<dyn Fn(&ChatEvent) + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEventPayload {
    Started { seed: String },
    SpeakerSelected { agent: AgentName, round: u32 },
    MessageAppended { message: Message },
    FallbackUsed { agent: AgentName, error: String },
    Finished { stop_reason: StopReason, rounds: u32 },
}

/// Envelope for chat events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub exchange_id: ExchangeId,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: ChatEventPayload,
}

pub(crate) struct ChatEventEmitter {
    exchange_id: ExchangeId,
    seq: AtomicU64,
    sink: Option<ChatEventSink>,
}

impl ChatEventEmitter {
    pub(crate) fn new(sink: Option<ChatEventSink>) -> Self {
        Self {
            exchange_id: Uuid::new_v4(),
            seq: AtomicU64::new(1),
            sink,
        }
    }

    pub(crate) fn emit(&self, payload: ChatEventPayload) {
        let Some(sink) = &self.sink else {
            return;
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        sink(&ChatEvent {
            exchange_id: self.exchange_id,
            seq,
            timestamp: Utc::now(),
            payload,
        });
    }
}
