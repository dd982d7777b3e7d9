//! Command-line front end: argument parsing and wiring.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::AgentRoster;
use crate::audio::{
    CommandRecorder, MockRecorder, MockSpeaker, MockTranscriber, OpenAiSpeechSynthesizer,
    OpenAiWhisperTranscriber, PlaybackSpeaker, Recorder, Speaker, SystemSpeaker, Transcriber,
};
use crate::chat::{ChatEvent, ChatEventPayload, ChatEventSink, GroupChat};
use crate::config::{QuintetConfig, SpeakerKind};
use crate::error::{QuintetError, Result};
use crate::models::ProviderKey;
use crate::session::{ExchangeHandler, Orchestrator, SessionOutcome, TextSession, VoiceSession};
use crate::tools::builtin_registry;
use crate::util::text::ellipsize;

/// What the mock transcriber hears on every `--mock-audio` recording.
pub const MOCK_TRANSCRIPT: &str = "What is the weather in Guangzhou?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Text,
    Voice,
}

/// Five-agent assistant with web, weather and currency tools.
#[derive(Parser, Debug)]
#[command(name = "quintet", version, about = "Planner, executor, summarizer and reviewer answering together")]
pub struct Cli {
    /// Conversation mode
    #[arg(long, value_enum, default_value_t = Mode::Text)]
    pub mode: Mode,

    /// Speech-to-text model for voice mode (e.g. whisper-1)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Config file (defaults to the per-user config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum agent turns per request
    #[arg(long)]
    pub max_round: Option<u32>,

    /// Use the mock recorder, transcriber and speaker
    #[arg(long)]
    pub mock_audio: bool,

    /// Debug logging and per-turn output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay command-line values onto `config`.
    pub fn apply(&self, config: &mut QuintetConfig) {
        if let Some(model) = &self.model {
            config.voice.transcription_model = model.clone();
        }
        if let Some(max_round) = self.max_round {
            config.max_round = max_round;
        }
        if self.mock_audio {
            config.voice.speaker = SpeakerKind::Mock;
        }
    }
}

/// Print each appended message to stderr as it happens.
pub fn turn_printer() -> ChatEventSink {
    Arc::new(|event: &ChatEvent| match &event.payload {
        ChatEventPayload::MessageAppended { message } => {
            let who = message
                .author
                .map(|a| a.to_string())
                .unwrap_or_else(|| "system".to_string());
            if let Some(call) = &message.function_call {
                eprintln!("  [{who}] -> {}({})", call.name, call.arguments);
            } else {
                eprintln!("  [{who}] {}", ellipsize(message.content.trim(), 200));
            }
        }
        ChatEventPayload::FallbackUsed { agent, error } => {
            eprintln!("  [{agent}] failed ({error}); using fallback");
        }
        _ => {}
    })
}

/// Build tools, agents and the group chat from `config`.
pub fn build_orchestrator(config: &QuintetConfig, verbose: bool) -> Result<Orchestrator> {
    let enabled = config.tools.enabled_tools()?;
    let registry = Arc::new(builtin_registry(&enabled, config.tools.endpoints.clone())?);
    let roster = AgentRoster::from_config(config, registry)?;
    let mut chat = GroupChat::new(roster).with_max_round(config.max_round);
    if verbose {
        chat = chat.with_event_sink(turn_printer());
    }
    Ok(Orchestrator::new(chat))
}

fn openai_key(config: &QuintetConfig, purpose: &str) -> Result<String> {
    config.api_key(ProviderKey::OpenAi).ok_or_else(|| {
        QuintetError::Configuration(format!("{purpose} needs OPENAI_API_KEY"))
    })
}

fn openai_base_url(config: &QuintetConfig) -> String {
    config
        .base_url(ProviderKey::OpenAi)
        .or_else(|| ProviderKey::OpenAi.default_base_url().map(str::to_string))
        .unwrap_or_default()
}

/// Build the voice session's recorder, transcriber and speaker.
pub async fn build_voice_session(
    config: &QuintetConfig,
    handler: Arc<dyn ExchangeHandler>,
    mock_audio: bool,
) -> Result<VoiceSession> {
    let voice = &config.voice;
    let (recorder, transcriber): (Arc<dyn Recorder>, Arc<dyn Transcriber>) = if mock_audio {
        (
            Arc::new(MockRecorder::new()),
            Arc::new(MockTranscriber::repeating(MOCK_TRANSCRIPT)),
        )
    } else {
        let recorder = match &voice.recorder {
            Some(command) => CommandRecorder::new(command.clone()),
            None => CommandRecorder::default(),
        };
        let mut whisper = OpenAiWhisperTranscriber::new(openai_key(config, "transcription")?)
            .with_base_url(openai_base_url(config))
            .with_model(&voice.transcription_model)
            .with_retry_policy(config.retry_policy());
        if let Some(language) = &voice.language {
            whisper = whisper.with_language(language);
        }
        (Arc::new(recorder), Arc::new(whisper))
    };

    let speaker: Arc<dyn Speaker> = match voice.speaker {
        SpeakerKind::Mock => Arc::new(MockSpeaker::new()),
        SpeakerKind::System => Arc::new(SystemSpeaker::detect().await?),
        SpeakerKind::Openai => {
            let tts = OpenAiSpeechSynthesizer::new(openai_key(config, "speech output")?)
                .with_base_url(openai_base_url(config))
                .with_model(&voice.tts_model)
                .with_retry_policy(config.retry_policy());
            let mut speaker = PlaybackSpeaker::new(Arc::new(tts), &voice.voice);
            if let Some(player) = &voice.player {
                speaker = speaker.with_player(player.clone());
            }
            Arc::new(speaker)
        }
    };

    Ok(VoiceSession::new(handler, recorder, transcriber, speaker)
        .with_record_duration(voice.record_duration()))
}

/// Cancel `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            token.cancel();
        } else {
            warn!("cannot listen for Ctrl-C");
        }
    });
}

/// Process exit status for a finished [`run`]: 0 for any session end, 1 for
/// startup failures.
pub fn exit_code(result: &Result<SessionOutcome>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Report the outcome and exit without waiting on runtime shutdown.
///
/// A pending `tokio::io::stdin()` read lives on a blocking thread that
/// cannot be cancelled; dropping the runtime would wait for the next line.
pub fn exit_with(result: Result<SessionOutcome>) -> ! {
    if let Err(e) = &result {
        eprintln!("Error: {e}");
    }
    std::process::exit(exit_code(&result))
}

/// Load configuration and run the chosen session on stdin/stdout.
pub async fn run(cli: Cli) -> Result<SessionOutcome> {
    let mut config = QuintetConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let orchestrator: Arc<dyn ExchangeHandler> = Arc::new(build_orchestrator(&config, cli.verbose)?);
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    match cli.mode {
        Mode::Text => TextSession::new(orchestrator).run(stdin, stdout, cancel).await,
        Mode::Voice => {
            build_voice_session(&config, orchestrator, cli.mock_audio)
                .await?
                .run(stdin, stdout, cancel)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionEnd;
    use clap::Parser;

    #[test]
    fn defaults_to_text_mode() {
        let cli = Cli::try_parse_from(["quintet"]).unwrap();
        assert_eq!(cli.mode, Mode::Text);
        assert!(cli.model.is_none());
        assert!(!cli.mock_audio);
        assert!(!cli.verbose);
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "quintet",
            "--mode",
            "voice",
            "--model",
            "whisper-large",
            "--config",
            "/tmp/q.toml",
            "--max-round",
            "7",
            "--mock-audio",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Voice);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/q.toml")));

        let mut config = QuintetConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.voice.transcription_model, "whisper-large");
        assert_eq!(config.max_round, 7);
        assert_eq!(config.voice.speaker, SpeakerKind::Mock);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["quintet", "--mode", "video"]).is_err());
    }

    #[test]
    fn session_ends_exit_zero_and_startup_errors_exit_one() {
        for end in [SessionEnd::ExitCommand, SessionEnd::EndOfInput, SessionEnd::Interrupted] {
            assert_eq!(exit_code(&Ok(SessionOutcome { exchanges: 0, end })), 0);
        }
        let failed: Result<SessionOutcome> = Err(QuintetError::Configuration("no key".into()));
        assert_eq!(exit_code(&failed), 1);
    }

    struct Echo;

    #[async_trait::async_trait]
    impl ExchangeHandler for Echo {
        async fn handle(&self, user_text: &str) -> String {
            format!("You asked: {user_text}")
        }
    }

    #[tokio::test]
    async fn mock_audio_voice_session_completes_an_exchange() {
        let mut config = QuintetConfig::default();
        Cli::try_parse_from(["quintet", "--mode", "voice", "--mock-audio"])
            .unwrap()
            .apply(&mut config);

        let session = build_voice_session(&config, Arc::new(Echo), true).await.unwrap();
        let mut output = Vec::new();
        let outcome = session
            .run(&b"\n"[..], &mut output, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.exchanges, 1);
        assert_eq!(outcome.end, SessionEnd::EndOfInput);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains(&format!("Assistant: You asked: {MOCK_TRANSCRIPT}")), "{printed}");
    }

    #[test]
    fn orchestrator_needs_credentials() {
        let config = QuintetConfig::default();
        assert!(matches!(
            build_orchestrator(&config, false),
            Err(QuintetError::Configuration(_))
        ));
    }
}
