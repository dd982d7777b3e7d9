//! Microphone boundary.

use std::time::Duration;

use async_trait::async_trait;

use super::types::AudioClip;
use crate::error::Result;

/// Captures audio from an input device.
#[async_trait]
pub trait Recorder: Send + Sync {
    async fn record(&self, duration: Duration) -> Result<AudioClip>;
}
