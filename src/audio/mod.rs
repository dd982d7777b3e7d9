//! Speech boundary: recording, transcription, and speech output.

pub mod mock;
pub mod openai;
mod openai_helpers;
pub mod recorder;
pub mod system;
pub mod transcription;
pub mod tts;
pub mod types;

pub use mock::{MockRecorder, MockSpeaker, MockTranscriber};
pub use openai::{OpenAiSpeechSynthesizer, OpenAiWhisperTranscriber};
pub use recorder::Recorder;
pub use system::{CommandLine, CommandRecorder, PlaybackSpeaker, SystemSpeaker};
pub use transcription::Transcriber;
pub use tts::{Speaker, SpeechSynthesizer};
pub use types::*;
