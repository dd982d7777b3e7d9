//! Hardware-free stand-ins for the speech boundary.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::recorder::Recorder;
use super::transcription::Transcriber;
use super::tts::Speaker;
use super::types::{AudioClip, TranscriptionResult};
use crate::error::{QuintetError, Result};

/// Returns a minimal WAV header for every recording.
#[derive(Debug, Default)]
pub struct MockRecorder {
    recordings: Mutex<Vec<Duration>>,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far.
    pub fn recordings(&self) -> Vec<Duration> {
        self.recordings.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Recorder for MockRecorder {
    async fn record(&self, duration: Duration) -> Result<AudioClip> {
        if let Ok(mut recordings) = self.recordings.lock() {
            recordings.push(duration);
        }
        let mut bytes = b"RIFF".to_vec();
        bytes.resize(44, 0);
        Ok(AudioClip::wav(bytes).with_duration(duration))
    }
}

/// Plays back a scripted list of transcripts, then silence.
///
/// A scripted `Err` surfaces as a transcription failure. A transcriber built
/// with [`MockTranscriber::repeating`] hears its sentence once the script runs
/// out instead of silence.
#[derive(Debug, Default)]
pub struct MockTranscriber {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    repeat: Option<String>,
}

impl MockTranscriber {
    pub fn new(transcripts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            script: Mutex::new(transcripts.into_iter().map(|t| Ok(t.into())).collect()),
            repeat: None,
        }
    }

    /// Hears `sentence` on every recording.
    pub fn repeating(sentence: impl Into<String>) -> Self {
        Self {
            script: Mutex::default(),
            repeat: Some(sentence.into()),
        }
    }

    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(reason.into()));
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<TranscriptionResult> {
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(text)) => Ok(TranscriptionResult::text(text)),
            Some(Err(reason)) => Err(QuintetError::Transcription(reason)),
            None => Ok(self
                .repeat
                .as_ref()
                .map(|sentence| TranscriptionResult::text(sentence.clone()))
                .unwrap_or_default()),
        }
    }
}

/// Collects everything it is asked to say.
#[derive(Debug, Default)]
pub struct MockSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::info!(text, "[mock speech]");
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
        Ok(())
    }
}
