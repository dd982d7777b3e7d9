//! Speech-to-text boundary.

use async_trait::async_trait;

use super::types::{AudioClip, TranscriptionResult};
use crate::error::Result;

/// Turns recorded audio into text.
///
/// Silence is not an error: implementations return an empty transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> Result<TranscriptionResult>;
}
