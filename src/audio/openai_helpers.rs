//! Request/response plumbing shared by the OpenAI audio clients.

use super::types::AudioFormat;

/// MIME type without parameters, or `None` when blank.
pub(super) fn essence(mime_type: &str) -> Option<&str> {
    let essence = mime_type.split(';').next().map(str::trim).unwrap_or_default();
    (!essence.is_empty()).then_some(essence)
}

/// File extension Whisper expects for an upload of `mime_type`.
pub(super) fn upload_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/mpeg" | "audio/mp3" | "audio/mpga" => Some("mp3"),
        "audio/mp4" | "audio/x-m4a" => Some("m4a"),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/webm" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}

/// `multipart/form-data` body for `/audio/transcriptions`.
pub(super) struct TranscriptionForm<'a> {
    pub boundary: &'a str,
    pub model: &'a str,
    pub language: Option<&'a str>,
    pub mime_type: &'a str,
    pub extension: &'a str,
    pub audio: &'a [u8],
}

impl TranscriptionForm<'_> {
    pub(super) fn encode(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.audio.len() + 512);
        self.text_part(&mut body, "model", self.model);
        self.text_part(&mut body, "response_format", "json");
        if let Some(lang) = self.language.map(str::trim).filter(|l| !l.is_empty()) {
            self.text_part(&mut body, "language", lang);
        }

        body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"speech.{}\"\r\n",
                self.extension
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.mime_type).as_bytes());
        body.extend_from_slice(self.audio);
        body.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());
        body
    }

    fn text_part(&self, body: &mut Vec<u8>, name: &str, value: &str) {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
    }
}

/// Whether a TTS response's content type fits the requested format.
pub(super) fn is_expected_audio(content_type: &str, format: AudioFormat) -> bool {
    let Some(mime) = essence(content_type) else {
        return false;
    };
    match format {
        AudioFormat::Mp3 => matches!(mime, "audio/mpeg" | "audio/mp3"),
        AudioFormat::Opus => matches!(mime, "audio/opus" | "audio/ogg" | "application/ogg"),
        AudioFormat::Aac => matches!(mime, "audio/aac" | "audio/mp4"),
        AudioFormat::Flac => matches!(mime, "audio/flac" | "audio/x-flac"),
        AudioFormat::Wav => matches!(mime, "audio/wav" | "audio/x-wav" | "audio/wave"),
    }
}

/// `error.message` from an OpenAI JSON error body.
pub(super) fn error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(essence("audio/wav; codecs=1"), Some("audio/wav"));
        assert_eq!(essence("  "), None);
    }

    #[test]
    fn form_contains_model_language_and_file() {
        let form = TranscriptionForm {
            boundary: "b",
            model: "whisper-1",
            language: Some(" zh "),
            mime_type: "audio/wav",
            extension: "wav",
            audio: b"RIFF",
        };
        let body = String::from_utf8(form.encode()).unwrap();
        assert!(body.contains("name=\"model\"\r\n\r\nwhisper-1\r\n"));
        assert!(body.contains("name=\"language\"\r\n\r\nzh\r\n"));
        assert!(body.contains("filename=\"speech.wav\""));
        assert!(body.ends_with("RIFF\r\n--b--\r\n"));
    }

    #[test]
    fn blank_language_is_omitted() {
        let form = TranscriptionForm {
            boundary: "b",
            model: "whisper-1",
            language: Some(""),
            mime_type: "audio/wav",
            extension: "wav",
            audio: b"",
        };
        let body = String::from_utf8(form.encode()).unwrap();
        assert!(!body.contains("language"));
    }

    #[test]
    fn matches_audio_content_types() {
        assert!(is_expected_audio("audio/mpeg", AudioFormat::Mp3));
        assert!(!is_expected_audio("audio/wav", AudioFormat::Mp3));
        assert!(!is_expected_audio("", AudioFormat::Wav));
    }

    #[test]
    fn reads_error_messages() {
        assert_eq!(
            error_message(r#"{"error":{"message":"bad voice"}}"#).as_deref(),
            Some("bad voice")
        );
        assert_eq!(error_message("nope"), None);
    }
}
