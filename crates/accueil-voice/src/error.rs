use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("synthesis text is empty")]
    EmptyText,

    #[error("synthesis text exceeds maximum size: {len} bytes (limit: {limit} bytes)")]
    TextTooLong { len: usize, limit: usize },

    #[error("missing synthesis credential")]
    MissingCredential,

    #[error("synthesis upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("synthesis upstream returned no audio")]
    MissingAudio,

    #[error("synthesis upstream did not answer within {0} ms")]
    Timeout(u64),

    #[error("synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl VoiceError {
    /// Whether the failure came from the upstream synthesis service rather
    /// than from the request or local configuration. Unreachable or slow
    /// upstreams count.
    pub fn is_upstream(&self) -> bool {
        match self {
            Self::Upstream { .. } | Self::MissingAudio | Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
