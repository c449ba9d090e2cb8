use accueil_types::UrgencyLexicon;

/// Flags utterances containing any urgency keyword.
#[derive(Debug, Clone)]
pub struct UrgencyClassifier {
    keywords: Vec<String>,
}

impl UrgencyClassifier {
    /// Blank keywords are dropped; a blank keyword would match everything.
    pub fn new(lexicon: &UrgencyLexicon) -> Self {
        let keywords = lexicon
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Case-insensitive substring match against the lexicon.
    pub fn classify(&self, utterance: &str) -> bool {
        self.matched(utterance).is_some()
    }

    /// The first keyword found in `utterance`, if any.
    pub fn matched(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }
}

impl Default for UrgencyClassifier {
    fn default() -> Self {
        Self::new(&UrgencyLexicon::default())
    }
}
