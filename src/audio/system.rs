//! Recorder and speakers backed by external programs.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::recorder::Recorder;
use super::tts::{Speaker, SpeechSynthesizer};
use super::types::{AudioClip, AudioFormat, SpeechRequest};
use crate::error::{QuintetError, Result};

const SECONDS_PLACEHOLDER: &str = "{seconds}";

/// A program plus its arguments, written as one whitespace-separated line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| QuintetError::Configuration("command line is empty".to_string()))?;
        Ok(Self::new(program, words))
    }

    fn command(&self, seconds: Option<u64>) -> Command {
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            match seconds {
                Some(s) => cmd.arg(arg.replace(SECONDS_PLACEHOLDER, &s.to_string())),
                None => cmd.arg(arg),
            };
        }
        cmd
    }
}

impl TryFrom<String> for CommandLine {
    type Error = QuintetError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CommandLine> for String {
    fn from(value: CommandLine) -> Self {
        std::iter::once(value.program)
            .chain(value.args)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from(self.clone()))
    }
}

/// Default recorder for the host: `rec` (sox) on macOS, `arecord` elsewhere.
pub fn default_recorder_command() -> CommandLine {
    if cfg!(target_os = "macos") {
        CommandLine::new(
            "rec",
            ["-q", "-t", "wav", "-r", "16000", "-c", "1", "-", "trim", "0", SECONDS_PLACEHOLDER],
        )
    } else {
        CommandLine::new(
            "arecord",
            ["-q", "-f", "S16_LE", "-r", "16000", "-c", "1", "-t", "wav", "-d", SECONDS_PLACEHOLDER, "-"],
        )
    }
}

/// Default player that reads encoded audio from stdin.
pub fn default_player_command() -> CommandLine {
    CommandLine::new("ffplay", ["-nodisp", "-autoexit", "-loglevel", "quiet", "-"])
}

/// Records by running a program that writes WAV to stdout.
///
/// `{seconds}` in any argument is replaced with the requested duration.
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    command: CommandLine,
}

impl CommandRecorder {
    pub fn new(command: CommandLine) -> Self {
        Self { command }
    }
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new(default_recorder_command())
    }
}

#[async_trait]
impl Recorder for CommandRecorder {
    async fn record(&self, duration: Duration) -> Result<AudioClip> {
        let seconds = duration.as_secs().max(1);
        debug!(command = %self.command, seconds, "recording");
        let output = self
            .command
            .command(Some(seconds))
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| QuintetError::Configuration(format!("cannot run recorder '{}': {e}", self.command.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuintetError::Transcription(format!(
                "recorder exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(AudioClip::wav(output.stdout).with_duration(Duration::from_secs(seconds)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SystemVoice {
    Say,
    Espeak,
    Festival,
}

/// Speaks through the host's speech program.
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    voice: SystemVoice,
}

impl SystemSpeaker {
    /// Pick `say` on macOS, or `espeak` then `festival` on Linux.
    pub async fn detect() -> Result<Self> {
        if cfg!(target_os = "macos") {
            return Ok(Self { voice: SystemVoice::Say });
        }
        if !cfg!(target_os = "linux") {
            return Err(QuintetError::Configuration(format!(
                "no system speech program for {}",
                std::env::consts::OS
            )));
        }
        for (program, voice) in [("espeak", SystemVoice::Espeak), ("festival", SystemVoice::Festival)] {
            if is_on_path(program).await {
                return Ok(Self { voice });
            }
        }
        Err(QuintetError::Configuration(
            "system speech needs espeak or festival installed".to_string(),
        ))
    }
}

async fn is_on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[async_trait]
impl Speaker for SystemSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let status = match self.voice {
            SystemVoice::Say => Command::new("say").arg(text).status().await?,
            SystemVoice::Espeak => Command::new("espeak").arg(text).status().await?,
            SystemVoice::Festival => {
                let mut child = Command::new("festival")
                    .arg("--tts")
                    .stdin(Stdio::piped())
                    .spawn()?;
                pipe_stdin(&mut child, text.as_bytes()).await?;
                child.wait().await?
            }
        };
        if !status.success() {
            return Err(QuintetError::Speech(format!("{:?} exited with {status}", self.voice)));
        }
        Ok(())
    }
}

/// Synthesizes speech and pipes the audio into a player program.
pub struct PlaybackSpeaker {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: CommandLine,
    voice: String,
    format: AudioFormat,
}

impl PlaybackSpeaker {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, voice: impl Into<String>) -> Self {
        Self {
            synthesizer,
            player: default_player_command(),
            voice: voice.into(),
            format: AudioFormat::Mp3,
        }
    }

    pub fn with_player(mut self, player: CommandLine) -> Self {
        self.player = player;
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }
}

#[async_trait]
impl Speaker for PlaybackSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let mut request = SpeechRequest::new(text, self.voice.clone());
        request.format = self.format;
        let audio = self.synthesizer.synthesize(&request).await?;

        debug!(player = %self.player, bytes = audio.len(), "playing speech");
        let mut child = self
            .player
            .command(None)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| QuintetError::Configuration(format!("cannot run player '{}': {e}", self.player.program)))?;
        pipe_stdin(&mut child, &audio).await?;
        let status = child.wait().await?;
        if !status.success() {
            return Err(QuintetError::Speech(format!("player exited with {status}")));
        }
        Ok(())
    }
}

async fn pipe_stdin(child: &mut tokio::process::Child, bytes: &[u8]) -> Result<()> {
    let Some(mut stdin) = child.stdin.take() else {
        return Err(QuintetError::InvalidState("child stdin was not piped".to_string()));
    };
    stdin.write_all(bytes).await?;
    stdin.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_round_trips_through_strings() {
        let cmd = CommandLine::parse("arecord -d {seconds} -").unwrap();
        assert_eq!(cmd.program, "arecord");
        assert_eq!(cmd.args, vec!["-d", "{seconds}", "-"]);
        assert_eq!(cmd.to_string(), "arecord -d {seconds} -");
        assert!(CommandLine::parse("   ").is_err());
    }

    #[test]
    fn recorder_substitutes_duration() {
        let cmd = CommandLine::parse("rec trim 0 {seconds}").unwrap().command(Some(4));
        let args: Vec<_> = cmd.as_std().get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["trim", "0", "4"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_recorder_captures_stdout() {
        let recorder = CommandRecorder::new(CommandLine::new("printf", ["RIFF{seconds}"]));
        let clip = recorder.record(Duration::from_secs(2)).await.unwrap();
        assert_eq!(clip.bytes, b"RIFF2");
        assert_eq!(clip.mime_type, "audio/wav");
        assert_eq!(clip.duration, Some(Duration::from_secs(2)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_recorder_is_an_error() {
        let recorder = CommandRecorder::new(CommandLine::new("false", Vec::<String>::new()));
        assert!(recorder.record(Duration::from_secs(1)).await.is_err());
    }
}
