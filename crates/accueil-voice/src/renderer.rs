use crate::gateway::MAX_SYNTHESIS_TEXT_BYTES;
use crate::twiml::{Say, Verb};
use accueil_types::{SpeechSettings, SpeechStrategy};

/// Path of the synthesis resource the provider fetches gateway audio from.
pub const SYNTHESIS_RESOURCE_PATH: &str = "/tts";

/// Which strategy actually voiced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedVia {
    Gateway,
    Provider,
    /// Gateway was configured but could not serve this reply: no public base
    /// URL was known, or the text exceeds what the resource accepts.
    ProviderFallback,
}

impl RenderedVia {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Provider => "provider",
            Self::ProviderFallback => "provider_fallback",
        }
    }
}

/// Turns text into the verb that speaks it to the caller.
///
/// Fixed script lines always use the provider voice. Generated replies follow
/// the configured [`SpeechStrategy`]: with `Gateway` they become a `Play` of
/// the synthesis resource, with `Provider` a `Say` in the configured locale.
#[derive(Debug, Clone)]
pub struct SpeechRenderer {
    settings: SpeechSettings,
    public_url: Option<String>,
}

impl SpeechRenderer {
    pub fn new(settings: SpeechSettings, public_url: Option<String>) -> Self {
        let public_url = public_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Self {
            settings,
            public_url,
        }
    }

    pub fn strategy(&self) -> SpeechStrategy {
        self.settings.strategy
    }

    pub fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    /// A provider-voiced line in the configured locale and voice.
    pub fn say(&self, text: impl Into<String>) -> Say {
        Say::new(text)
            .language(self.settings.language.clone())
            .voice(self.settings.voice.clone())
    }

    /// The verb for a generated reply.
    ///
    /// `request_base` is the base URL the current webhook was reached on; a
    /// configured public URL takes precedence over it.
    pub fn reply(&self, text: &str, request_base: Option<&str>) -> (Verb, RenderedVia) {
        match self.settings.strategy {
            SpeechStrategy::Provider => (Verb::Say(self.say(text)), RenderedVia::Provider),
            SpeechStrategy::Gateway if text.len() > MAX_SYNTHESIS_TEXT_BYTES => {
                tracing::warn!(
                    text_len = text.len(),
                    limit = MAX_SYNTHESIS_TEXT_BYTES,
                    "reply too long for synthesis resource, speaking it with provider voice"
                );
                (Verb::Say(self.say(text)), RenderedVia::ProviderFallback)
            }
            SpeechStrategy::Gateway => match self.base_url(request_base) {
                Some(base) => (
                    Verb::Play {
                        url: synthesis_url(base, text),
                    },
                    RenderedVia::Gateway,
                ),
                None => {
                    tracing::warn!(
                        "no public base URL for synthesis resource, speaking reply with provider voice"
                    );
                    (Verb::Say(self.say(text)), RenderedVia::ProviderFallback)
                }
            },
        }
    }

    fn base_url<'a>(&'a self, request_base: Option<&'a str>) -> Option<&'a str> {
        self.public_url.as_deref().or_else(|| {
            request_base
                .map(|base| base.trim_end_matches('/'))
                .filter(|base| !base.is_empty())
        })
    }
}

/// `{base}/tts?text=<form-encoded text>`.
pub fn synthesis_url(base: &str, text: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!(
        "{}{}?text={}",
        base.trim_end_matches('/'),
        SYNTHESIS_RESOURCE_PATH,
        encoded
    )
}
