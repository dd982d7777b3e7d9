//! Spoken conversation: record, transcribe, answer, speak.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::text::write_line;
use super::{is_farewell, ExchangeHandler, SessionEnd, SessionOutcome};
use crate::audio::{Recorder, Speaker, Transcriber};
use crate::error::Result;

pub const GREETING: &str = "Hello! I'm your assistant. What can I help you with?";
pub const REPEAT_PROMPT: &str = "I didn't catch that, please try again.";
pub const NOT_HEARD: &str = "Sorry, I didn't catch that.";
pub const VOICE_FAREWELL: &str = "OK, goodbye!";
const DEFAULT_RECORD_DURATION: Duration = Duration::from_secs(5);

pub struct VoiceSession {
    handler: Arc<dyn ExchangeHandler>,
    recorder: Arc<dyn Recorder>,
    transcriber: Arc<dyn Transcriber>,
    speaker: Arc<dyn Speaker>,
    record_duration: Duration,
}

impl VoiceSession {
    pub fn new(
        handler: Arc<dyn ExchangeHandler>,
        recorder: Arc<dyn Recorder>,
        transcriber: Arc<dyn Transcriber>,
        speaker: Arc<dyn Speaker>,
    ) -> Self {
        Self {
            handler,
            recorder,
            transcriber,
            speaker,
            record_duration: DEFAULT_RECORD_DURATION,
        }
    }

    pub fn with_record_duration(mut self, duration: Duration) -> Self {
        self.record_duration = duration;
        self
    }

    /// Record and transcribe once. `None` means nothing usable was heard.
    async fn listen(&self, duration: Duration) -> Option<String> {
        let clip = match self.recorder.record(duration).await {
            Ok(clip) => clip,
            Err(err) => {
                warn!(error = %err, "recording failed");
                return None;
            }
        };
        match self.transcriber.transcribe(&clip).await {
            Ok(result) if !result.is_silent() => Some(result.text.trim().to_string()),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "transcription failed");
                None
            }
        }
    }

    async fn say(&self, text: &str) {
        if let Err(err) = self.speaker.speak(text).await {
            warn!(error = %err, "speech output failed");
        }
    }

    /// Talk until a farewell, EOF on `input`, or `cancel`.
    ///
    /// Each Enter on `input` starts one recording.
    pub async fn run<R, W>(&self, input: R, mut output: W, cancel: CancellationToken) -> Result<SessionOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut exchanges = 0;

        write_line(&mut output, "Voice mode. Press Ctrl+C to quit.").await?;
        write_line(&mut output, &format!("Assistant: {GREETING}")).await?;
        self.say(GREETING).await;

        let end = loop {
            write_line(&mut output, "Press Enter to start speaking...").await?;
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Interrupted,
                line = lines.next_line() => line?,
            };
            if line.is_none() {
                break SessionEnd::EndOfInput;
            }

            let heard = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Interrupted,
                heard = self.listen(self.record_duration) => heard,
            };
            let Some(user_text) = heard else {
                write_line(&mut output, REPEAT_PROMPT).await?;
                self.say(REPEAT_PROMPT).await;
                continue;
            };
            write_line(&mut output, &format!("You said: {user_text}")).await?;

            if is_farewell(&user_text) {
                write_line(&mut output, &format!("Assistant: {VOICE_FAREWELL}")).await?;
                self.say(VOICE_FAREWELL).await;
                break SessionEnd::ExitCommand;
            }

            write_line(&mut output, "Thinking...").await?;
            let answer = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Interrupted,
                answer = self.handler.handle(&user_text) => answer,
            };
            exchanges += 1;
            write_line(&mut output, &format!("Assistant: {answer}")).await?;
            self.say(&answer).await;
        };

        if end == SessionEnd::Interrupted {
            write_line(&mut output, "\nConversation ended.").await?;
        }
        info!(exchanges, ?end, "voice session ended");
        Ok(SessionOutcome { exchanges, end })
    }

    /// One record-answer-speak cycle, returning `(user_text, reply)`.
    pub async fn single_interaction(&self, duration: Duration) -> (String, String) {
        let Some(user_text) = self.listen(duration).await else {
            return (String::new(), NOT_HEARD.to_string());
        };
        let reply = self.handler.handle(&user_text).await;
        self.say(&reply).await;
        (user_text, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MockRecorder, MockSpeaker, MockTranscriber};
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl ExchangeHandler for Fixed {
        async fn handle(&self, _user_text: &str) -> String {
            "It is sunny.".to_string()
        }
    }

    fn session(transcriber: MockTranscriber, speaker: Arc<MockSpeaker>) -> VoiceSession {
        VoiceSession::new(
            Arc::new(Fixed),
            Arc::new(MockRecorder::new()),
            Arc::new(transcriber),
            speaker,
        )
    }

    #[tokio::test]
    async fn single_interaction_reports_silence() {
        let speaker = Arc::new(MockSpeaker::new());
        let voice = session(MockTranscriber::new([""]), speaker.clone());
        let (heard, reply) = voice.single_interaction(Duration::from_secs(1)).await;
        assert_eq!(heard, "");
        assert_eq!(reply, NOT_HEARD);
        assert!(speaker.spoken().is_empty());
    }

    #[tokio::test]
    async fn single_interaction_speaks_the_reply() {
        let speaker = Arc::new(MockSpeaker::new());
        let voice = session(MockTranscriber::new(["weather?"]), speaker.clone());
        let (heard, reply) = voice.single_interaction(Duration::from_secs(1)).await;
        assert_eq!((heard.as_str(), reply.as_str()), ("weather?", "It is sunny."));
        assert_eq!(speaker.spoken(), vec!["It is sunny.".to_string()]);
    }

    #[tokio::test]
    async fn farewell_ends_the_loop() {
        let speaker = Arc::new(MockSpeaker::new());
        let voice = session(MockTranscriber::new(["再见"]), speaker.clone());
        let outcome = voice
            .run(&b"\n\n"[..], Vec::new(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome { exchanges: 0, end: SessionEnd::ExitCommand });
        assert_eq!(speaker.spoken(), vec![GREETING.to_string(), VOICE_FAREWELL.to_string()]);
    }
}
