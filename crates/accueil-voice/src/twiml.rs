//! Call-control document builder.
//!
//! Produces the provider's voice XML: a `<Response>` root holding an ordered
//! list of verbs. Only the verbs the assistant uses are modelled.
//!
//! ```
//! use accueil_voice::{Say, VoiceResponse};
//!
//! let xml = VoiceResponse::new()
//!     .say(Say::new("Bonjour").language("fr-FR"))
//!     .pause(1)
//!     .to_xml();
//! assert!(xml.contains("<Say language=\"fr-FR\">Bonjour</Say><Pause length=\"1\"/>"));
//! ```

use std::fmt::Write;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Provider-voiced text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub text: String,
    pub language: Option<String>,
    pub voice: Option<String>,
}

impl Say {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            voice: None,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

/// Speech capture with a post-back action. Nested prompts play while listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gather {
    pub input: String,
    pub language: Option<String>,
    pub speech_timeout: Option<String>,
    pub action: String,
    pub method: String,
    pub prompts: Vec<Say>,
}

impl Gather {
    /// Speech gather posting its result to `action`.
    pub fn speech(action: impl Into<String>) -> Self {
        Self {
            input: "speech".to_string(),
            language: None,
            speech_timeout: None,
            action: action.into(),
            method: "POST".to_string(),
            prompts: Vec::new(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn speech_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.speech_timeout = Some(timeout.into());
        self
    }

    pub fn prompt(mut self, say: Say) -> Self {
        self.prompts.push(say);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Gather(Gather),
    Say(Say),
    Play { url: String },
    Pause { length: u32 },
    Redirect { method: String, url: String },
    Dial { number: String },
}

impl Verb {
    /// Whether this verb keeps the call open waiting for caller input.
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Gather(_) | Self::Redirect { .. })
    }
}

/// An ordered call-control document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verb(mut self, verb: Verb) -> Self {
        self.verbs.push(verb);
        self
    }

    pub fn gather(self, gather: Gather) -> Self {
        self.verb(Verb::Gather(gather))
    }

    pub fn say(self, say: Say) -> Self {
        self.verb(Verb::Say(say))
    }

    pub fn play(self, url: impl Into<String>) -> Self {
        self.verb(Verb::Play { url: url.into() })
    }

    pub fn pause(self, length: u32) -> Self {
        self.verb(Verb::Pause { length })
    }

    /// Redirect with `POST`, as the provider expects for webhook URLs.
    pub fn redirect(self, url: impl Into<String>) -> Self {
        self.verb(Verb::Redirect {
            method: "POST".to_string(),
            url: url.into(),
        })
    }

    pub fn dial(self, number: impl Into<String>) -> Self {
        self.verb(Verb::Dial {
            number: number.into(),
        })
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Whether the document ends the call once playback completes.
    pub fn is_terminal(&self) -> bool {
        !self.verbs.iter().any(Verb::is_listening)
    }

    /// All text spoken through `Say`, including prompts nested in `Gather`.
    pub fn spoken_lines(&self) -> Vec<&str> {
        let mut lines = Vec::new();
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => lines.push(say.text.as_str()),
                Verb::Gather(gather) => {
                    lines.extend(gather.prompts.iter().map(|s| s.text.as_str()))
                }
                _ => {}
            }
        }
        lines
    }

    /// Renders the document as provider XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push_str("<Response>");
        for verb in &self.verbs {
            write_verb(&mut out, verb);
        }
        out.push_str("</Response>");
        out
    }
}

fn write_verb(out: &mut String, verb: &Verb) {
    match verb {
        Verb::Gather(gather) => {
            out.push_str("<Gather");
            write_attr(out, "input", &gather.input);
            if let Some(language) = &gather.language {
                write_attr(out, "language", language);
            }
            if let Some(timeout) = &gather.speech_timeout {
                write_attr(out, "speechTimeout", timeout);
            }
            write_attr(out, "action", &gather.action);
            write_attr(out, "method", &gather.method);
            if gather.prompts.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for say in &gather.prompts {
                    write_say(out, say);
                }
                out.push_str("</Gather>");
            }
        }
        Verb::Say(say) => write_say(out, say),
        Verb::Play { url } => {
            out.push_str("<Play>");
            out.push_str(&escape(url));
            out.push_str("</Play>");
        }
        Verb::Pause { length } => {
            let _ = write!(out, "<Pause length=\"{}\"/>", length);
        }
        Verb::Redirect { method, url } => {
            out.push_str("<Redirect");
            write_attr(out, "method", method);
            out.push('>');
            out.push_str(&escape(url));
            out.push_str("</Redirect>");
        }
        Verb::Dial { number } => {
            out.push_str("<Dial>");
            out.push_str(&escape(number));
            out.push_str("</Dial>");
        }
    }
}

fn write_say(out: &mut String, say: &Say) {
    out.push_str("<Say");
    if let Some(language) = &say.language {
        write_attr(out, "language", language);
    }
    if let Some(voice) = &say.voice {
        write_attr(out, "voice", voice);
    }
    out.push('>');
    out.push_str(&escape(&say.text));
    out.push_str("</Say>");
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, escape(value));
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_gather_with_nested_prompt_and_redirect() {
        let xml = VoiceResponse::new()
            .gather(
                Gather::speech("/ai")
                    .language("fr-FR")
                    .speech_timeout("auto")
                    .prompt(Say::new("Bonjour").language("fr-FR").voice("alice")),
            )
            .redirect("/voice")
            .to_xml();

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
             <Gather input=\"speech\" language=\"fr-FR\" speechTimeout=\"auto\" action=\"/ai\" method=\"POST\">\
             <Say language=\"fr-FR\" voice=\"alice\">Bonjour</Say></Gather>\
             <Redirect method=\"POST\">/voice</Redirect></Response>"
        );
    }

    #[test]
    fn escapes_text_and_urls() {
        let xml = VoiceResponse::new()
            .say(Say::new("Tarifs <50€> & \"bilan\""))
            .play("https://host/tts?text=a&voice=b")
            .to_xml();

        assert!(xml.contains("<Say>Tarifs &lt;50€&gt; &amp; &quot;bilan&quot;</Say>"));
        assert!(xml.contains("<Play>https://host/tts?text=a&amp;voice=b</Play>"));
    }

    #[test]
    fn terminal_only_without_listening_verbs() {
        let closing = VoiceResponse::new().say(Say::new("Au revoir")).pause(1);
        assert!(closing.is_terminal());

        let looping = VoiceResponse::new().say(Say::new("Pardon ?")).redirect("/voice");
        assert!(!looping.is_terminal());
    }

    #[test]
    fn spoken_lines_include_gather_prompts() {
        let doc = VoiceResponse::new()
            .gather(Gather::speech("/ai").prompt(Say::new("Bonjour")))
            .say(Say::new("Encore là ?"));
        assert_eq!(doc.spoken_lines(), vec!["Bonjour", "Encore là ?"]);
    }

    #[test]
    fn empty_gather_self_closes() {
        let xml = VoiceResponse::new().gather(Gather::speech("/ai")).to_xml();
        assert!(xml.contains("<Gather input=\"speech\" action=\"/ai\" method=\"POST\"/>"));
    }
}
