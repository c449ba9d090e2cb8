use crate::config::SynthesisConfig;
use crate::error::VoiceError;
use accueil_types::{SynthesisRequest, VoiceSettings};
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use serde::Serialize;
use std::time::Duration;

/// Maximum text accepted for one synthesis request (4 KiB). A phone reply is
/// one or two sentences; anything larger is not a reply.
pub const MAX_SYNTHESIS_TEXT_BYTES: usize = 4 * 1024;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct StreamBody<'a> {
    text: &'a str,
    voice_settings: VoiceSettings,
}

/// Audio produced by the synthesis service, not yet read.
///
/// The bytes are passed through exactly as the upstream sent them.
pub struct SynthesizedAudio {
    pub content_length: Option<u64>,
    stream: BoxStream<'static, Result<Bytes, VoiceError>>,
}

impl std::fmt::Debug for SynthesizedAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedAudio")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl SynthesizedAudio {
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, VoiceError>> {
        self.stream
    }

    /// Reads the whole stream into memory.
    pub async fn collect(self) -> Result<Vec<u8>, VoiceError> {
        let mut stream = self.stream;
        let mut audio = Vec::new();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }
        Ok(audio)
    }
}

/// Client for the external streaming synthesis service.
#[derive(Debug, Clone)]
pub struct SynthesisGateway {
    config: SynthesisConfig,
    client: reqwest::Client,
}

impl SynthesisGateway {
    pub fn new(config: SynthesisConfig) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Builds the request for `text` with the configured voice and settings.
    pub fn request_for(&self, text: &str) -> SynthesisRequest {
        SynthesisRequest::new(text, self.config.effective_voice_id())
            .with_settings(self.config.voice_settings)
    }

    fn stream_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream?optimize_streaming_latency={}",
            self.config.base_url.trim_end_matches('/'),
            voice_id,
            self.config.optimize_streaming_latency
        )
    }

    /// Starts synthesis of `text` and returns the upstream audio stream.
    ///
    /// Validation happens before any network call: empty or oversized text and
    /// a missing credential are reported without contacting the service.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }
        if text.len() > MAX_SYNTHESIS_TEXT_BYTES {
            return Err(VoiceError::TextTooLong {
                len: text.len(),
                limit: MAX_SYNTHESIS_TEXT_BYTES,
            });
        }
        if !self.is_configured() {
            return Err(VoiceError::MissingCredential);
        }

        let request = self.request_for(text);
        let started = std::time::Instant::now();

        let send = self
            .client
            .post(self.stream_url(&request.voice_id))
            .header("xi-api-key", self.config.api_key.trim())
            .header(reqwest::header::ACCEPT, AUDIO_CONTENT_TYPE)
            .json(&StreamBody {
                text: &request.text,
                voice_settings: request.settings,
            })
            .send();

        // Only the wait for response headers is bounded; the body streams
        // for as long as the upstream keeps sending.
        let limit = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(limit, send)
            .await
            .map_err(|_| VoiceError::Timeout(self.config.timeout_ms))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        if response.content_length() == Some(0) {
            return Err(VoiceError::MissingAudio);
        }

        tracing::debug!(
            voice_id = %request.voice_id,
            chars = request.text.chars().count(),
            latency_ms = started.elapsed().as_millis() as u64,
            "synthesis stream opened"
        );

        let content_length = response.content_length();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(VoiceError::from))
            .boxed();

        Ok(SynthesizedAudio {
            content_length,
            stream,
        })
    }
}
