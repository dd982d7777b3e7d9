//! One user request in, one answer out.

use async_trait::async_trait;
use tracing::{error, info};

use super::answer::extract_answer;
use super::ExchangeHandler;
use crate::chat::{GroupChat, Transcript};
use crate::error::{QuintetError, Result};
use crate::types::{AgentName, Message};

pub const APOLOGY: &str = "Sorry, something went wrong while handling your request. Please try again.";

/// Result of a single exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub answer: String,
    pub transcript: Transcript,
}

/// Drives a fresh [`GroupChat`] run for every request.
///
/// History never carries over: each exchange starts from the user's text alone.
#[derive(Debug)]
pub struct Orchestrator {
    chat: GroupChat,
}

impl Orchestrator {
    pub fn new(chat: GroupChat) -> Self {
        Self { chat }
    }

    pub fn chat(&self) -> &GroupChat {
        &self.chat
    }

    pub async fn exchange(&self, user_text: &str) -> Result<Exchange> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(QuintetError::InvalidArgument("user text is empty".to_string()));
        }
        info!(chars = text.chars().count(), "exchange started");
        let transcript = self.chat.run(Message::user(AgentName::UserProxy, text)).await;
        let answer = extract_answer(&transcript.messages);
        Ok(Exchange { answer, transcript })
    }
}

#[async_trait]
impl ExchangeHandler for Orchestrator {
    async fn handle(&self, user_text: &str) -> String {
        match self.exchange(user_text).await {
            Ok(exchange) => exchange.answer,
            Err(err) => {
                error!(error = %err, "exchange failed");
                APOLOGY.to_string()
            }
        }
    }
}
