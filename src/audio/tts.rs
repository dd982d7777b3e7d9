//! Text-to-speech boundary.

use async_trait::async_trait;

use super::types::SpeechRequest;
use crate::error::Result;

/// Produces encoded audio for a piece of text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}

/// Says text out loud.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}
